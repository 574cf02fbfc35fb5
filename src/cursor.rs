use crate::token::Position;

/// Scan position over one template source.
///
/// Each tokenizer owns its cursor outright, so independent passes over
/// different files share nothing.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    offset: usize,
    line: usize,
    line_start: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            line_start: 0,
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    pub fn position(&self) -> Position {
        self.position_at(self.offset)
    }

    /// Position of an offset on the current line (or earlier on it).
    pub fn position_at(&self, offset: usize) -> Position {
        let column = self.src[self.line_start..offset].chars().count() + 1;
        Position {
            offset,
            line: self.line,
            column,
        }
    }

    /// Consume one character, keeping line accounting in step.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.offset;
        }
        Some(c)
    }

    /// Consume a literal known to be at the cursor.
    pub fn advance(&mut self, literal: &str) {
        for _ in literal.chars() {
            self.bump();
        }
    }

    /// Consume characters while `pred` holds; returns the consumed slice.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.offset;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.offset]
    }

    /// Consume spaces and tabs without crossing a newline.
    pub fn eat_blanks(&mut self) -> &'a str {
        self.eat_while(is_blank)
    }

    /// Move to `offset` (at or past the cursor), counting newlines on the way.
    pub fn jump_to(&mut self, offset: usize) {
        while self.offset < offset {
            if self.bump().is_none() {
                break;
            }
        }
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start..end]
    }
}

pub fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_tracks_lines() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.eat_while(|c| c != '\n');
        assert_eq!(cursor.position().column, 3);
        cursor.bump();
        let pos = cursor.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 3);
    }

    #[test]
    fn test_column_counts_chars_not_bytes() {
        let mut cursor = Cursor::new("éé x");
        cursor.eat_while(|c| c != 'x');
        let pos = cursor.position();
        assert_eq!(pos.offset, 5);
        assert_eq!(pos.column, 4);
    }

    #[test]
    fn test_eat_blanks_stops_at_newline() {
        let mut cursor = Cursor::new(" \t \nx");
        assert_eq!(cursor.eat_blanks(), " \t ");
        assert_eq!(cursor.peek(), Some('\n'));
    }

    #[test]
    fn test_jump_counts_newlines() {
        let mut cursor = Cursor::new("a\nb\nc");
        cursor.jump_to(4);
        assert_eq!(cursor.position().line, 3);
        assert_eq!(cursor.peek(), Some('c'));
    }
}
