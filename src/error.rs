use thiserror::Error;

use crate::token::{Position, TokenKind};

/// Boxed failure reported by an external evaluator or renderer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way the tokenizer can reject its input.
///
/// Characters are rendered as their code point followed by the quoted
/// character, e.g. `U+002A '*'`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid character {} '{}'", codepoint(.0), .0)]
    InvalidCharacter(char),

    #[error(
        "invalid character {} '{}' within tag identifier, space or newline expected",
        codepoint(.0),
        .0
    )]
    InvalidCharacterInIdentifier(char),

    #[error("invalid character U+002D '-' at the end of the identifier")]
    TrailingDash,

    #[error(
        "misplaced character {} '{}', tag identifier must start on the newline",
        codepoint(.0),
        .0
    )]
    MisplacedTagStart(char),

    #[error("invalid character {} '{}', '=' expected", codepoint(.0), .0)]
    ExpectedAssign(char),

    #[error("invalid character {} '{}', quoted string expected", codepoint(.0), .0)]
    ExpectedQuote(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unclosed body, closing delimiter '{0}' expected")]
    UnclosedBody(String),

    #[error("unexpected end of input, {0} expected")]
    UnexpectedEndOfInput(&'static str),
}

fn codepoint(c: &char) -> String {
    format!("U+{:04X}", *c as u32)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} ({pos})")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub pos: Position,
}

impl LexError {
    /// The bare diagnostic text, without position.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found}, {expected} expected ({pos})")]
    UnexpectedToken {
        found: TokenKind,
        expected: &'static str,
        pos: Position,
    },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(err) => err.pos,
            ParseError::UnexpectedToken { pos, .. } => *pos,
        }
    }
}

/// Failures while turning a template file into a blueprint.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to evaluate variable '{name}'")]
    Variable {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to evaluate {tag} script")]
    Script {
        tag: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("failed to render template body")]
    Render(#[source] BoxError),
}

pub type Result<T> = std::result::Result<T, ParseError>;
