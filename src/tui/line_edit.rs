use crate::util::unicode;

/// Single-line text buffer with a byte-offset cursor that always sits on a
/// grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEdit {
    buffer: String,
    cursor: usize,
}

impl LineEdit {
    /// Buffer seeded with `text`, cursor at the end
    pub fn new(text: impl Into<String>) -> Self {
        let buffer = text.into();
        let cursor = buffer.len();
        LineEdit { buffer, cursor }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display column of the cursor
    pub fn cursor_col(&self) -> usize {
        unicode::byte_offset_to_display_col(&self.buffer, self.cursor)
    }

    pub fn into_text(self) -> String {
        self.buffer
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        let clean = s.replace(['\n', '\r'], " ");
        self.buffer.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    /// Delete the grapheme before the cursor
    pub fn backspace(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    /// Delete the grapheme under the cursor
    pub fn delete(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(self.cursor..next, "");
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_puts_cursor_at_end() {
        let edit = LineEdit::new("Задача");
        assert_eq!(edit.cursor(), "Задача".len());
        assert_eq!(edit.cursor_col(), 6);
    }

    #[test]
    fn insert_and_backspace_cyrillic() {
        let mut edit = LineEdit::new("");
        for c in "тз".chars() {
            edit.insert(c);
        }
        assert_eq!(edit.text(), "тз");
        edit.backspace();
        assert_eq!(edit.text(), "т");
        edit.backspace();
        edit.backspace();
        assert_eq!(edit.text(), "");
        assert_eq!(edit.cursor(), 0);
    }

    #[test]
    fn moves_by_grapheme() {
        let mut edit = LineEdit::new("e\u{0301}a");
        edit.home();
        edit.right();
        assert_eq!(edit.cursor(), 3);
        edit.delete();
        assert_eq!(edit.text(), "e\u{0301}");
        edit.left();
        assert_eq!(edit.cursor(), 0);
        edit.left();
        assert_eq!(edit.cursor(), 0);
    }

    #[test]
    fn insert_in_middle() {
        let mut edit = LineEdit::new("ac");
        edit.left();
        edit.insert('b');
        assert_eq!(edit.text(), "abc");
        edit.end();
        edit.insert_str("d\ne");
        assert_eq!(edit.text(), "abcd e");
    }
}
