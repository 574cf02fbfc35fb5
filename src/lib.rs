//! Front end of a project-scaffolding template engine.
//!
//! A template file is turned into a [`Markup`] document in three passes:
//! the [`lexer`] scans the text into tokens, the [`parser`] groups them
//! into [`Tag`]s and the [`assembler`] folds the tags into the document,
//! collecting non-fatal [`Diagnostic`]s on the way.

pub mod assembler;
pub mod ast;
pub mod config;
pub mod cursor;
pub mod document;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

use tracing::debug;

pub use assembler::{Assembly, Directive, assemble};
pub use ast::{Attribute, Body, Tag};
pub use config::Delimiters;
pub use document::{Diagnostic, Markup, Script};
pub use engine::{Blueprint, Engine, Evaluator, Renderer};
pub use error::{EngineError, LexError, LexErrorKind, ParseError};
pub use lexer::{Lexer, tokenize};
pub use parser::MarkupParser;
pub use token::{Position, Token, TokenKind};

/// Parse a template file with the default `<<` / `>>` delimiters.
pub fn parse(input: &str) -> Result<Assembly, ParseError> {
    parse_with(input, &Delimiters::default())
}

pub fn parse_with(input: &str, delimiters: &Delimiters) -> Result<Assembly, ParseError> {
    let tags = MarkupParser::parse_input(input, delimiters).inspect_err(|err| {
        let pos = err.position();
        debug!(line = pos.line, offset = pos.offset, "template markup rejected: {err}");
    })?;
    let assembly = assemble(&tags);
    debug!(
        tags = tags.len(),
        diagnostics = assembly.diagnostics.len(),
        "assembled template markup"
    );
    Ok(assembly)
}
