use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::Body;

/// Script text handed to the expression evaluator.
///
/// An inline body is a single expression; a multi-line body is a script
/// block whose last evaluated statement supplies the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "source", rename_all = "lowercase")]
pub enum Script {
    Expression(String),
    Block(String),
}

impl Script {
    pub fn source(&self) -> &str {
        match self {
            Script::Expression(source) | Script::Block(source) => source,
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Script::Expression(_))
    }
}

impl From<&Body> for Script {
    fn from(body: &Body) -> Self {
        if body.inline {
            Script::Expression(body.content.clone())
        } else {
            Script::Block(body.content.clone())
        }
    }
}

/// Everything one template file says about the file it generates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Markup {
    pub filename: Option<Script>,
    pub skip: Option<Script>,
    pub body: String,
    pub partials: HashMap<String, String>,
    pub variables: IndexMap<String, Script>,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a partial; returns true when an earlier one was replaced.
    pub fn set_partial(&mut self, name: String, content: String) -> bool {
        self.partials.insert(name, content).is_some()
    }

    /// Store a variable, keeping the position of an earlier definition.
    /// Returns true when an earlier one was replaced.
    pub fn set_variable(&mut self, name: String, script: Script) -> bool {
        self.variables.insert(name, script).is_some()
    }
}

/// Non-fatal condition found while assembling a [`Markup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    MissingName {
        tag: String,
        line: usize,
    },
    MissingBody {
        tag: String,
        name: Option<String>,
        line: usize,
    },
    PartialRedefined {
        name: String,
        line: usize,
    },
    VariableRedefined {
        name: String,
        line: usize,
    },
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::MissingName { line, .. }
            | Diagnostic::MissingBody { line, .. }
            | Diagnostic::PartialRedefined { line, .. }
            | Diagnostic::VariableRedefined { line, .. } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingName { tag, line } => write!(
                f,
                "line {line}: tag {tag:?} is missing \"name\" attribute, skipping"
            ),
            Diagnostic::MissingBody {
                tag,
                name: Some(name),
                line,
            } => write!(
                f,
                "line {line}: tag {tag:?} with name {name:?} is missing body, skipping"
            ),
            Diagnostic::MissingBody {
                tag,
                name: None,
                line,
            } => write!(f, "line {line}: tag {tag:?} is missing body, skipping"),
            Diagnostic::PartialRedefined { name, line } => write!(
                f,
                "line {line}: partial {name:?} is already defined, overwriting"
            ),
            Diagnostic::VariableRedefined { name, line } => write!(
                f,
                "line {line}: variable {name:?} is already defined, overwriting"
            ),
        }
    }
}
