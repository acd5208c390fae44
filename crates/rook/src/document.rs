//
// document.rs
//
// Rope-backed document with a revision counter for staleness detection
//

use ropey::Rope;

use crate::position::{Position, Range};

/// An editable document.
///
/// Columns are character offsets within a line. The revision counter bumps
/// on every mutation; scope snapshots record the revision they were built
/// against and must be discarded once it moves.
pub struct Document {
    contents: Rope,
    revision: u64,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            contents: Rope::from_str(text),
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }

    /// Number of rows. A trailing newline opens a final empty row.
    pub fn len_lines(&self) -> usize {
        self.contents.len_lines()
    }

    /// The content of one row, without its line terminator. Rows past the
    /// end of the document are empty.
    pub fn line(&self, row: u32) -> String {
        let row = row as usize;
        if row >= self.contents.len_lines() {
            return String::new();
        }
        let line = self.contents.line(row);
        let mut text = line.to_string();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        text
    }

    /// Length of one row in characters, excluding the line terminator.
    pub fn line_length(&self, row: u32) -> u32 {
        self.line(row).chars().count() as u32
    }

    /// The position just past the last character of the document.
    pub fn end_position(&self) -> Position {
        let last_row = self.contents.len_lines().saturating_sub(1) as u32;
        Position::new(last_row, self.line_length(last_row))
    }

    /// Extract the text between two positions.
    pub fn text_in_range(&self, range: Range) -> String {
        let start = self.char_index(range.start);
        let end = self.char_index(range.end).max(start);
        self.contents.slice(start..end).to_string()
    }

    /// Replace the text in `range` with `text`, bumping the revision.
    pub fn replace_range(&mut self, range: Range, text: &str) {
        let start = self.char_index(range.start);
        let end = self.char_index(range.end).max(start);
        self.contents.remove(start..end);
        self.contents.insert(start, text);
        self.revision += 1;
    }

    /// Convert a position to a char index, clamping to the document.
    fn char_index(&self, pos: Position) -> usize {
        let row = (pos.row as usize).min(self.contents.len_lines().saturating_sub(1));
        let line_start = self.contents.line_to_char(row);
        let line_len = self.line_length(row as u32) as usize;
        line_start + (pos.column as usize).min(line_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_strips_terminator() {
        let doc = Document::new("alpha\nbeta\r\ngamma");
        assert_eq!(doc.line(0), "alpha");
        assert_eq!(doc.line(1), "beta");
        assert_eq!(doc.line(2), "gamma");
        assert_eq!(doc.line(99), "");
    }

    #[test]
    fn test_line_length() {
        let doc = Document::new("ab\n\nxyz\n");
        assert_eq!(doc.line_length(0), 2);
        assert_eq!(doc.line_length(1), 0);
        assert_eq!(doc.line_length(2), 3);
    }

    #[test]
    fn test_end_position_with_trailing_newline() {
        let doc = Document::new("ab\ncd\n");
        assert_eq!(doc.end_position(), Position::new(2, 0));
    }

    #[test]
    fn test_end_position_without_trailing_newline() {
        let doc = Document::new("ab\ncd");
        assert_eq!(doc.end_position(), Position::new(1, 2));
    }

    #[test]
    fn test_text_in_range() {
        let doc = Document::new("one\ntwo\nthree\n");
        let range = Range::new(Position::new(1, 0), Position::new(2, 0));
        assert_eq!(doc.text_in_range(range), "two\n");
    }

    #[test]
    fn test_replace_range_bumps_revision() {
        let mut doc = Document::new("one\ntwo\nthree\n");
        assert_eq!(doc.revision(), 0);
        doc.replace_range(
            Range::new(Position::new(1, 0), Position::new(1, 3)),
            "TWO",
        );
        assert_eq!(doc.revision(), 1);
        assert_eq!(doc.line(1), "TWO");
    }
}
