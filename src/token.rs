use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::error::LexErrorKind;

/// Location of a token or error in the template source.
///
/// `offset` is a byte offset and `line` is 1-based; both are exact.
/// `column` counts characters from the start of the line (1-based) and
/// treats a tab as a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Terminal failure; the token text holds the rendered message.
    Error(LexErrorKind),
    EndOfInput,
    Space,
    Newline,
    Identifier,
    /// The `-` introducing an attribute.
    AttributePrefix,
    Assign,
    /// Quoted attribute value, quotes included.
    StringLiteral,
    BodyOpen,
    BodyClose,
    BodyText,
}

impl TokenKind {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TokenKind::Error(_) | TokenKind::EndOfInput)
    }

    /// Short human name, used in parser errors.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Error(_) => "error",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Space => "space",
            TokenKind::Newline => "newline",
            TokenKind::Identifier => "identifier",
            TokenKind::AttributePrefix => "'-'",
            TokenKind::Assign => "'='",
            TokenKind::StringLiteral => "string",
            TokenKind::BodyOpen => "opening delimiter",
            TokenKind::BodyClose => "closing delimiter",
            TokenKind::BodyText => "body",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: Cow<'a, str>,
    pub pos: Position,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, pos: Position) -> Self {
        Self {
            kind,
            text: Cow::Borrowed(text),
            pos,
        }
    }

    pub fn error(kind: LexErrorKind, pos: Position) -> Self {
        let text = Cow::Owned(kind.to_string());
        Self {
            kind: TokenKind::Error(kind),
            text,
            pos,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }
}
