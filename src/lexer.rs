//! Line-oriented tokenizer for template markup.
//!
//! A template is a sequence of tags, one per line:
//!
//! ```text
//! # comment
//! variable -name="greeting" << "hello" >>
//! template <<
//! {{greeting}}, world
//! >>
//! ```
//!
//! Tag names must start in column 0. A tag may carry `-name="value"`
//! attributes and one body between the open/close delimiters. A body whose
//! opening delimiter is followed only by blanks and a newline is multi-line
//! and runs until a line consisting of the closing delimiter (trailing
//! blanks allowed). Any other body is inline and ends at the first
//! occurrence of the closing delimiter.
//!
//! Scanning stops at the first error; the error token is the last token.

use std::collections::VecDeque;

use crate::config::Delimiters;
use crate::cursor::{Cursor, is_blank};
use crate::error::{LexError, LexErrorKind};
use crate::token::{Position, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    TagBody,
    AttributeName,
    AttributeAssign,
    AttributeValue,
    AfterBody,
    Done,
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    open: String,
    close: String,
    state: State,
    pending: VecDeque<Token<'a>>,
    terminal: Option<Token<'a>>,
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, delimiters: &Delimiters) -> Self {
        Self {
            cursor: Cursor::new(src),
            open: delimiters.open().to_owned(),
            close: delimiters.close().to_owned(),
            state: State::LineStart,
            pending: VecDeque::new(),
            terminal: None,
            exhausted: false,
        }
    }

    /// Next token of the stream. Once the terminal token (end of input or
    /// error) has been produced, it is returned again on every call.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                if token.is_terminal() {
                    self.terminal = Some(token.clone());
                }
                return token;
            }
            if let Some(token) = &self.terminal {
                return token.clone();
            }
            if let Err(err) = self.step() {
                self.pending.push_back(Token::error(err.kind, err.pos));
                self.state = State::Done;
            }
        }
    }

    fn step(&mut self) -> Result<(), LexError> {
        match self.state {
            State::LineStart => self.lex_line_start(),
            State::TagBody => self.lex_tag_body(),
            State::AttributeName => {
                self.lex_identifier("attribute name")?;
                self.state = State::AttributeAssign;
                Ok(())
            }
            State::AttributeAssign => self.lex_assign(),
            State::AttributeValue => self.lex_string(),
            State::AfterBody => self.lex_after_body(),
            State::Done => {
                self.finish();
                Ok(())
            }
        }
    }

    fn push(&mut self, kind: TokenKind, pos: Position) {
        let text = self.cursor.slice(pos.offset, self.cursor.offset());
        self.pending.push_back(Token::new(kind, text, pos));
    }

    fn finish(&mut self) {
        let pos = self.cursor.position();
        self.push(TokenKind::EndOfInput, pos);
        self.state = State::Done;
    }

    fn error(&self, kind: LexErrorKind) -> LexError {
        LexError {
            kind,
            pos: self.cursor.position(),
        }
    }

    /// Skips comments and blank lines, then scans a tag name.
    fn lex_line_start(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                None => {
                    self.finish();
                    return Ok(());
                }
                Some('#') => {
                    self.cursor.eat_while(|c| c != '\n');
                    self.cursor.bump();
                }
                Some('\n') => {
                    self.cursor.bump();
                }
                Some(c) if is_blank(c) => {
                    self.cursor.eat_blanks();
                    match self.cursor.peek() {
                        None => {}
                        Some('\n') => {
                            self.cursor.bump();
                        }
                        Some(c) => return Err(self.error(LexErrorKind::MisplacedTagStart(c))),
                    }
                }
                Some(_) => {
                    self.lex_identifier("tag name")?;
                    self.state = State::TagBody;
                    return Ok(());
                }
            }
        }
    }

    fn lex_identifier(&mut self, expected: &'static str) -> Result<(), LexError> {
        let pos = self.cursor.position();
        match self.cursor.peek() {
            None => return Err(self.error(LexErrorKind::UnexpectedEndOfInput(expected))),
            Some(c) if !is_word(c) => return Err(self.error(LexErrorKind::InvalidCharacter(c))),
            Some(_) => {}
        }

        let ident = self.cursor.eat_while(|c| is_word(c) || c == '-');
        if let Some(c) = self.cursor.peek() {
            if !self.is_identifier_end(c) {
                return Err(self.error(LexErrorKind::InvalidCharacterInIdentifier(c)));
            }
        }
        if ident.ends_with('-') {
            return Err(LexError {
                kind: LexErrorKind::TrailingDash,
                pos: self.cursor.position_at(self.cursor.offset() - 1),
            });
        }

        self.push(TokenKind::Identifier, pos);
        Ok(())
    }

    fn is_identifier_end(&self, c: char) -> bool {
        is_blank(c) || c == '\n' || c == '=' || self.cursor.starts_with(&self.open)
    }

    fn lex_tag_body(&mut self) -> Result<(), LexError> {
        let pos = self.cursor.position();
        match self.cursor.peek() {
            None => self.finish(),
            Some('\n') => {
                self.cursor.bump();
                self.push(TokenKind::Newline, pos);
                self.state = State::LineStart;
            }
            Some(_) if self.cursor.starts_with(&self.open) => return self.lex_body(),
            Some(c) if is_blank(c) => {
                self.cursor.eat_blanks();
                self.push(TokenKind::Space, pos);
            }
            Some('-') => {
                self.cursor.bump();
                self.push(TokenKind::AttributePrefix, pos);
                self.state = State::AttributeName;
            }
            Some(c) => return Err(self.error(LexErrorKind::InvalidCharacter(c))),
        }
        Ok(())
    }

    fn lex_assign(&mut self) -> Result<(), LexError> {
        let pos = self.cursor.position();
        match self.cursor.peek() {
            Some('=') => {
                self.cursor.bump();
                self.push(TokenKind::Assign, pos);
                self.state = State::AttributeValue;
                Ok(())
            }
            Some(c) => Err(self.error(LexErrorKind::ExpectedAssign(c))),
            None => Err(self.error(LexErrorKind::UnexpectedEndOfInput("'='"))),
        }
    }

    /// Quoted value; the first matching quote on the same line closes it.
    fn lex_string(&mut self) -> Result<(), LexError> {
        let pos = self.cursor.position();
        let quote = match self.cursor.peek() {
            Some(q @ ('"' | '\'')) => q,
            Some(c) => return Err(self.error(LexErrorKind::ExpectedQuote(c))),
            None => {
                return Err(self.error(LexErrorKind::UnexpectedEndOfInput("quoted string")));
            }
        };
        self.cursor.bump();

        let rest = self.cursor.rest();
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
        let Some(end) = line.find(quote) else {
            return Err(LexError {
                kind: LexErrorKind::UnterminatedString,
                pos,
            });
        };
        self.cursor.jump_to(self.cursor.offset() + end + quote.len_utf8());
        self.push(TokenKind::StringLiteral, pos);
        self.state = State::TagBody;
        Ok(())
    }

    fn lex_body(&mut self) -> Result<(), LexError> {
        let open_pos = self.cursor.position();
        self.cursor.advance(&self.open);
        self.push(TokenKind::BodyOpen, open_pos);

        let rest = self.cursor.rest();
        if rest.trim_start_matches([' ', '\t']).starts_with('\n') {
            self.lex_multiline_body(open_pos)
        } else {
            self.lex_inline_body(open_pos)
        }
    }

    fn lex_inline_body(&mut self, open_pos: Position) -> Result<(), LexError> {
        let text_pos = self.cursor.position();
        let Some(len) = self.cursor.rest().find(self.close.as_str()) else {
            return Err(LexError {
                kind: LexErrorKind::UnclosedBody(self.close.clone()),
                pos: open_pos,
            });
        };
        if len > 0 {
            self.cursor.jump_to(text_pos.offset + len);
            self.push(TokenKind::BodyText, text_pos);
        }
        self.lex_body_close();
        Ok(())
    }

    fn lex_multiline_body(&mut self, open_pos: Position) -> Result<(), LexError> {
        self.cursor.eat_blanks();
        let newline_pos = self.cursor.position();
        self.cursor.bump();
        self.push(TokenKind::Newline, newline_pos);

        let src = self.cursor.src();
        let text_pos = self.cursor.position();
        let mut line_start = text_pos.offset;
        loop {
            let line_end = src[line_start..]
                .find('\n')
                .map_or(src.len(), |i| line_start + i);
            let line = &src[line_start..line_end];
            if line.trim_end_matches([' ', '\t']) == self.close {
                if line_start > text_pos.offset {
                    self.cursor.jump_to(line_start - 1);
                    self.push(TokenKind::BodyText, text_pos);
                    let newline_pos = self.cursor.position();
                    self.cursor.bump();
                    self.push(TokenKind::Newline, newline_pos);
                }
                self.lex_body_close();
                return Ok(());
            }
            if line_end == src.len() {
                return Err(LexError {
                    kind: LexErrorKind::UnclosedBody(self.close.clone()),
                    pos: open_pos,
                });
            }
            line_start = line_end + 1;
        }
    }

    fn lex_body_close(&mut self) {
        let pos = self.cursor.position();
        self.cursor.advance(&self.close);
        self.push(TokenKind::BodyClose, pos);
        self.cursor.eat_blanks();
        self.state = State::AfterBody;
    }

    fn lex_after_body(&mut self) -> Result<(), LexError> {
        let pos = self.cursor.position();
        match self.cursor.peek() {
            None => self.finish(),
            Some('\n') => {
                self.cursor.bump();
                self.push(TokenKind::Newline, pos);
                self.state = State::LineStart;
            }
            Some(c) => return Err(self.error(LexErrorKind::InvalidCharacter(c))),
        }
        Ok(())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields every token up to and including the terminal one.
    fn next(&mut self) -> Option<Token<'a>> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        self.exhausted = token.is_terminal();
        Some(token)
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize a whole template in one go.
pub fn tokenize<'a>(src: &'a str, delimiters: &Delimiters) -> Vec<Token<'a>> {
    Lexer::new(src, delimiters).collect()
}
