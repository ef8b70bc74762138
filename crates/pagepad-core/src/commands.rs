/// Logical editor commands and their dispatch onto the selection.
use crate::editor::Editor;

/// Where a movement command takes the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    Left,
    Right,
    /// Smart home.
    LineStart,
    LineEnd,
    WordForward,
    WordBackward,
}

impl Motion {
    /// Line-boundary and word jumps, as opposed to single-step arrows.
    fn is_jump(self) -> bool {
        matches!(
            self,
            Self::LineStart | Self::LineEnd | Self::WordForward | Self::WordBackward
        )
    }
}

/// An input already decoded from whatever produced it (keys, a script).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Moves the head; `extend` grows the selection instead of collapsing it.
    Move { motion: Motion, extend: bool },
    /// Types text at the cursor, replacing any selection.
    Type(String),
    /// Pastes text, which may span several lines.
    Paste(String),
    Enter,
    Backspace,
    /// Indents the selection, or inserts one indentation of spaces.
    Tab,
    ShiftTab,
    Scroll(isize),
    Click { row: usize, col: usize },
}

impl Editor {
    /// Applies one command.
    pub fn execute(&mut self, command: Command) {
        tracing::trace!("execute {command:?}");
        match command {
            Command::Move { motion, extend } => self.apply_motion(motion, extend),
            Command::Type(text) => {
                self.selection.insert(&mut self.document, &mut self.viewport, &text);
            }
            Command::Paste(text) => self.paste(&text),
            Command::Enter => self.selection.new_line(&mut self.document, &mut self.viewport),
            Command::Backspace => self.selection.delete(&mut self.document, &mut self.viewport),
            Command::Tab => {
                if self.selection.is_selection() {
                    self.selection.indent(&mut self.document, self.indentation);
                } else {
                    let spaces = " ".repeat(self.indentation);
                    self.selection.insert(&mut self.document, &mut self.viewport, &spaces);
                }
            }
            Command::ShiftTab => {
                self.selection.unindent(&mut self.document, self.indentation);
            }
            Command::Scroll(delta) => {
                self.viewport.scroll(&self.document, delta);
                self.selection.clamp_to_viewport(&self.document, &self.viewport);
            }
            Command::Click { row, col } => {
                self.selection.click(&self.document, &self.viewport, row, col);
            }
        }
    }

    fn apply_motion(&mut self, motion: Motion, extend: bool) {
        let selecting = self.selection.is_selection();
        if motion.is_jump() {
            if !extend && selecting {
                self.selection.make_cursor();
            } else if extend && !selecting {
                self.selection.make_selection();
            }
        } else if !extend && selecting {
            // A plain arrow collapses onto the edge in its direction.
            let [first, second] = self.selection.ordered();
            let edge = match motion {
                Motion::Left | Motion::Up => first,
                _ => second,
            };
            self.selection.set_cursor(edge);
            self.viewport.scroll_to(&self.document, edge.row);
            match motion {
                Motion::Up => self.move_head(Motion::Up),
                Motion::Down => self.move_head(Motion::Down),
                _ => self.selection.max_col = edge.col,
            }
            return;
        } else if extend && !selecting {
            self.selection.make_selection();
        }
        self.move_head(motion);
    }

    fn move_head(&mut self, motion: Motion) {
        let (doc, view, sel) = (&self.document, &mut self.viewport, &mut self.selection);
        match motion {
            Motion::Up => sel.move_row(doc, view, -1),
            Motion::Down => sel.move_row(doc, view, 1),
            Motion::Left => sel.move_col(doc, view, -1),
            Motion::Right => sel.move_col(doc, view, 1),
            Motion::LineStart => sel.move_cursor_start_of_line(doc),
            Motion::LineEnd => sel.move_cursor_end_of_line(doc),
            Motion::WordForward => sel.move_word(doc, view),
            Motion::WordBackward => sel.move_back_word(doc, view),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::position::Position;
    use crate::selection::Caret;
    use crate::viewport::Viewport;

    fn editor(text: &str) -> Editor {
        Editor::new(Document::from(text), Viewport::new(5).unwrap()).unwrap()
    }

    fn mv(motion: Motion, extend: bool) -> Command {
        Command::Move { motion, extend }
    }

    #[test]
    fn test_shift_arrow_starts_selection() {
        let mut ed = editor("Hello");
        ed.execute(mv(Motion::Right, true));
        ed.execute(mv(Motion::Right, true));
        assert!(ed.selection().is_selection());
        assert_eq!(ed.copy().as_deref(), Some("Hel"));
    }

    #[test]
    fn test_plain_arrow_collapses_to_edge() {
        let mut ed = editor("Hello");
        ed.execute(mv(Motion::LineEnd, false));
        ed.execute(mv(Motion::Left, true));
        ed.execute(mv(Motion::Left, true));
        ed.execute(mv(Motion::Left, false));
        assert_eq!(ed.selection().caret(), Caret::Cursor(Position::new(0, 3)));

        ed.execute(mv(Motion::Right, true));
        ed.execute(mv(Motion::Right, false));
        assert_eq!(ed.selection().caret(), Caret::Cursor(Position::new(0, 4)));
    }

    #[test]
    fn test_plain_down_collapses_then_moves() {
        let mut ed = editor("abc\ndef\nghi");
        ed.execute(mv(Motion::Right, true));
        ed.execute(mv(Motion::Down, false));
        assert_eq!(ed.selection().caret(), Caret::Cursor(Position::new(1, 1)));
    }

    #[test]
    fn test_jump_without_shift_collapses() {
        let mut ed = editor("one two");
        ed.execute(mv(Motion::WordForward, true));
        assert!(ed.selection().is_selection());
        ed.execute(mv(Motion::LineEnd, false));
        assert_eq!(ed.selection().caret(), Caret::Cursor(Position::new(0, 7)));
    }

    #[test]
    fn test_tab_inserts_spaces_or_indents() {
        let mut ed = editor("a\nb");
        ed.execute(Command::Tab);
        assert_eq!(ed.document().lines().unwrap(), ["    a", "b"]);

        ed.execute(mv(Motion::Down, true));
        ed.execute(Command::Tab);
        assert_eq!(ed.document().lines().unwrap(), ["        a", "    b"]);
        ed.execute(Command::ShiftTab);
        assert_eq!(ed.document().lines().unwrap(), ["    a", "b"]);
    }

    #[test]
    fn test_type_enter_backspace() {
        let mut ed = editor("");
        ed.execute(Command::Type("hi".into()));
        ed.execute(Command::Enter);
        ed.execute(Command::Type("yo".into()));
        ed.execute(Command::Backspace);
        assert_eq!(ed.document().lines().unwrap(), ["hi", "y"]);
        assert_eq!(ed.selection().head(), Position::new(1, 1));
    }

    #[test]
    fn test_click_and_scroll() {
        let text: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let mut ed = editor(&text.join("\n"));
        ed.execute(Command::Scroll(3));
        assert_eq!(ed.viewport().start(), 3);
        assert_eq!(ed.selection().head(), Position::new(3, 0));
        ed.execute(Command::Click { row: 2, col: 9 });
        assert_eq!(ed.selection().caret(), Caret::Cursor(Position::new(5, 1)));
    }

    #[test]
    fn test_scroll_keeps_cursor_on_document() {
        let text: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        let mut ed = editor(&text.join("\n"));
        ed.execute(Command::Click { row: 4, col: 0 });
        ed.execute(Command::Scroll(9));
        assert_eq!(ed.viewport().start(), 9);
        ed.execute(Command::Type("X".into()));
        assert_eq!(ed.document().line(9).as_deref(), Some("Xline 9"));
        assert_eq!(ed.status().line, 10);
        assert_eq!(ed.status().line_count, 10);
    }

    #[test]
    fn test_collapse_reveals_offscreen_edge() {
        let text: Vec<String> = (0..10).map(|i| format!("line {i}")).collect();
        let mut ed = editor(&text.join("\n"));
        for _ in 0..7 {
            ed.execute(mv(Motion::Down, true));
        }
        assert_eq!(ed.viewport().start(), 3);
        ed.execute(mv(Motion::Left, false));
        assert_eq!(ed.selection().caret(), Caret::Cursor(Position::new(0, 0)));
        assert_eq!(ed.viewport().start(), 0);
    }
}
