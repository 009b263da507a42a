use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::unicode;

/// Editable text with a byte-offset cursor on a grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    /// Cursor starts at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        TextInput { text, cursor }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Apply a key. Returns false when the key is not a text-editing key.
    /// `multiline` lets Enter insert a newline and Up/Down move between lines.
    pub fn handle_key(&mut self, key: KeyEvent, multiline: bool) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                let start = self.line_start();
                self.text.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_left(),
            KeyCode::Char('a') if ctrl => self.cursor = self.line_start(),
            KeyCode::Char('e') if ctrl && multiline => self.cursor = self.line_end(),
            KeyCode::Char(c) if !ctrl => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
            }
            KeyCode::Enter if multiline => self.insert_str("\n"),
            KeyCode::Backspace if alt => self.delete_word_left(),
            KeyCode::Backspace => {
                if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
                    self.text.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
                    self.text.replace_range(self.cursor..next, "");
                }
            }
            KeyCode::Left if alt => {
                self.cursor = unicode::word_boundary_left(&self.text, self.cursor)
            }
            KeyCode::Right if alt => {
                self.cursor = unicode::word_boundary_right(&self.text, self.cursor)
            }
            KeyCode::Left => {
                if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = self.line_start(),
            KeyCode::End => self.cursor = self.line_end(),
            KeyCode::Up if multiline => self.move_line(-1),
            KeyCode::Down if multiline => self.move_line(1),
            _ => return false,
        }
        true
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self) -> usize {
        self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i)
    }

    fn delete_word_left(&mut self) {
        let start = unicode::word_boundary_left(&self.text, self.cursor);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    /// Move to the same display column on the previous/next line.
    fn move_line(&mut self, dir: isize) {
        let start = self.line_start();
        let col = unicode::byte_offset_to_display_col(&self.text[start..], self.cursor - start);
        let target_start = if dir < 0 {
            if start == 0 {
                return;
            }
            self.text[..start - 1].rfind('\n').map_or(0, |i| i + 1)
        } else {
            let end = self.line_end();
            if end == self.text.len() {
                return;
            }
            end + 1
        };
        let line_len = self.text[target_start..]
            .find('\n')
            .unwrap_or(self.text.len() - target_start);
        let line = &self.text[target_start..target_start + line_len];
        self.cursor = target_start + unicode::display_col_to_byte_offset(line, col);
    }

    /// `(line, display column)` of the cursor, for placing the terminal cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let start = self.line_start();
        (line, unicode::display_width(&self.text[start..self.cursor]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c)), false);
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = TextInput::default();
        type_str(&mut input, "héllo");
        input.handle_key(key(KeyCode::Backspace), false);
        assert_eq!(input.text, "héll");
        input.handle_key(key(KeyCode::Left), false);
        input.handle_key(key(KeyCode::Left), false);
        input.handle_key(key(KeyCode::Left), false);
        input.handle_key(key(KeyCode::Backspace), false);
        assert_eq!(input.text, "éll");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn enter_only_inserts_newline_when_multiline() {
        let mut input = TextInput::new("a");
        assert!(!input.handle_key(key(KeyCode::Enter), false));
        assert!(input.handle_key(key(KeyCode::Enter), true));
        assert_eq!(input.text, "a\n");
    }

    #[test]
    fn up_down_keep_column() {
        let mut input = TextInput::new("abcd\nxy\nlonger");
        input.handle_key(key(KeyCode::Up), true);
        // End of "longer" is column 6; "xy" only has 2.
        assert_eq!(input.cursor, "abcd\nxy".len());
        input.handle_key(key(KeyCode::Up), true);
        assert_eq!(input.cursor, 2);
        assert_eq!(input.cursor_position(), (0, 2));
        input.handle_key(key(KeyCode::Up), true);
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn ctrl_u_clears_to_line_start() {
        let mut input = TextInput::new("one\ntwo three");
        input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), true);
        assert_eq!(input.text, "one\n");
    }

    #[test]
    fn unhandled_keys_report_false() {
        let mut input = TextInput::default();
        assert!(!input.handle_key(key(KeyCode::Tab), false));
        assert!(!input.handle_key(key(KeyCode::Esc), false));
    }
}
