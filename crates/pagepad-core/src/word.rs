//! Word boundaries for word-wise cursor movement.
//!
//! Characters fall into three classes. Word runs are maximal runs of word
//! characters; symbol runs are runs of the *same* symbol repeated, so
//! `"::"` is one run but `"(["` is two.

/// Character class used for word movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    /// Unicode letter, digit or underscore.
    Word,
    Symbol,
}

pub fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else {
        CharClass::Symbol
    }
}

fn is_space(c: char) -> bool {
    classify(c) == CharClass::Whitespace
}

fn is_word(c: char) -> bool {
    classify(c) == CharClass::Word
}

/// Column reached by a forward word move from `col`.
///
/// From whitespace: skips the whitespace and the word that follows it.
/// From a word or symbol run: skips the run and any trailing whitespace.
/// Returns `col` unchanged when it is at or past the end of the line.
pub fn next_word_boundary(line: &str, col: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let n = chars.len();
    let mut j = col;
    if j >= n {
        return col;
    }
    match classify(chars[j]) {
        CharClass::Whitespace => {
            while j < n && is_space(chars[j]) {
                j += 1;
            }
            while j < n && is_word(chars[j]) {
                j += 1;
            }
            return j;
        }
        CharClass::Word => {
            while j < n && is_word(chars[j]) {
                j += 1;
            }
        }
        CharClass::Symbol => {
            let c = chars[j];
            while j < n && chars[j] == c {
                j += 1;
            }
        }
    }
    while j < n && is_space(chars[j]) {
        j += 1;
    }
    j
}

/// Column reached by a backward word move from `col`.
///
/// Skips whitespace before `col`, then the word run or identical-symbol run
/// ending there, landing on the first char of that run.
pub fn prev_word_boundary(line: &str, col: usize) -> usize {
    let chars: Vec<char> = line.chars().collect();
    let mut j = col.min(chars.len());
    while j > 0 && is_space(chars[j - 1]) {
        j -= 1;
    }
    if j == 0 {
        return 0;
    }
    let c = chars[j - 1];
    if is_word(c) {
        while j > 0 && is_word(chars[j - 1]) {
            j -= 1;
        }
    } else {
        while j > 0 && chars[j - 1] == c {
            j -= 1;
        }
    }
    j
}
