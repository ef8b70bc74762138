/// Parsing of `-c` command arguments into editor commands.
use anyhow::{bail, Context, Result};
use pagepad_core::{Command, Motion};

fn parse_motion(name: &str) -> Option<Motion> {
    Some(match name {
        "up" => Motion::Up,
        "down" => Motion::Down,
        "left" => Motion::Left,
        "right" => Motion::Right,
        "home" => Motion::LineStart,
        "end" => Motion::LineEnd,
        "word" => Motion::WordForward,
        "backword" => Motion::WordBackward,
        _ => return None,
    })
}

/// Expands `\n`, `\t` and `\\` in pasted or typed text.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parses one command such as `shift+right`, `type:abc` or `click:2,5`.
///
/// # Errors
///
/// Returns an error for unknown commands or malformed arguments.
pub fn parse_command(input: &str) -> Result<Command> {
    let input = input.trim();
    if let Some((name, arg)) = input.split_once(':') {
        return match name {
            "type" => Ok(Command::Type(unescape(arg))),
            "paste" => Ok(Command::Paste(unescape(arg))),
            "scroll" => {
                let delta = arg
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid scroll amount: {arg}"))?;
                Ok(Command::Scroll(delta))
            }
            "click" => {
                let (row, col) = arg
                    .split_once(',')
                    .with_context(|| format!("click expects ROW,COL, got: {arg}"))?;
                Ok(Command::Click {
                    row: row.trim().parse().context("invalid click row")?,
                    col: col.trim().parse().context("invalid click column")?,
                })
            }
            _ => bail!("unknown command: {name}"),
        };
    }

    match input {
        "enter" => return Ok(Command::Enter),
        "backspace" => return Ok(Command::Backspace),
        "tab" => return Ok(Command::Tab),
        "shift+tab" => return Ok(Command::ShiftTab),
        _ => {}
    }

    let (name, extend) = match input.strip_prefix("shift+") {
        Some(rest) => (rest, true),
        None => (input, false),
    };
    match parse_motion(name) {
        Some(motion) => Ok(Command::Move { motion, extend }),
        None => bail!("unknown command: {input}"),
    }
}
