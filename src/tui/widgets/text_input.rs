//! Single-line text input with cursor management.
//!
//! Shared by the search bars, the upload path prompt, and anywhere else a
//! view needs freeform typing.

/// A text input buffer with a byte-offset cursor kept on char boundaries.
#[derive(Debug, Default)]
pub struct TextInput {
    content: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.next_boundary();
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = self.next_boundary();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Replace the whole content, cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.content = text.to_string();
        self.cursor = self.content.len();
    }

    /// Take the content out, resetting the buffer.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// True when empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.content.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_text() {
        let mut input = TextInput::new();
        for c in "beta".chars() {
            input.insert_char(c);
        }
        assert_eq!(input.text(), "beta");
    }

    #[test]
    fn test_backspace_multibyte() {
        let mut input = TextInput::new();
        input.insert_char('é');
        input.insert_char('x');
        input.backspace();
        input.backspace();
        assert_eq!(input.text(), "");
        input.backspace(); // empty buffer is a no-op
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_cursor_movement_and_delete() {
        let mut input = TextInput::new();
        input.set_text("abc");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "bc");
        input.move_right();
        input.delete();
        assert_eq!(input.text(), "b");
        input.move_end();
        input.move_left();
        input.delete();
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_take_resets() {
        let mut input = TextInput::new();
        input.set_text("query");
        assert_eq!(input.take(), "query");
        assert!(input.is_blank());
    }

    #[test]
    fn test_is_blank_trims() {
        let mut input = TextInput::new();
        input.insert_char(' ');
        assert!(input.is_blank());
        input.insert_char('q');
        assert!(!input.is_blank());
    }
}
