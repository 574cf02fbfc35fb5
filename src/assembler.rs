use serde::Serialize;
use tracing::debug;

use crate::ast::{Body, Tag};
use crate::document::{Diagnostic, Markup, Script};

pub const TAG_FILENAME: &str = "filename";
pub const TAG_SKIP: &str = "skipif";
pub const TAG_TEMPLATE: &str = "template";
pub const TAG_PARTIAL: &str = "partial";
pub const TAG_VARIABLE: &str = "variable";
pub const ATTR_NAME: &str = "name";

/// A tag seen through the reserved tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive<'t> {
    Filename(Option<&'t Body>),
    Skip(Option<&'t Body>),
    Template(Option<&'t Body>),
    Partial {
        name: Option<&'t str>,
        body: Option<&'t Body>,
    },
    Variable {
        name: Option<&'t str>,
        body: Option<&'t Body>,
    },
    /// Any other tag name.
    Ignored,
}

impl<'t> Directive<'t> {
    pub fn classify(tag: &'t Tag) -> Self {
        let body = tag.body.as_ref();
        let name = || tag.attribute(ATTR_NAME).filter(|name| !name.is_empty());
        match tag.name.as_str() {
            TAG_FILENAME => Directive::Filename(body),
            TAG_SKIP => Directive::Skip(body),
            TAG_TEMPLATE => Directive::Template(body),
            TAG_PARTIAL => Directive::Partial { name: name(), body },
            TAG_VARIABLE => Directive::Variable { name: name(), body },
            _ => Directive::Ignored,
        }
    }
}

/// Result of folding a template's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assembly {
    pub markup: Markup,
    pub diagnostics: Vec<Diagnostic>,
}

/// Folds tags into a [`Markup`], later definitions winning.
#[derive(Debug, Default)]
pub struct Assembler {
    markup: Markup,
    diagnostics: Vec<Diagnostic>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, tag: &Tag) {
        match Directive::classify(tag) {
            Directive::Filename(body) => self.markup.filename = body.map(Script::from),
            Directive::Skip(body) => self.markup.skip = body.map(Script::from),
            Directive::Template(body) => {
                self.markup.body = body.map(|body| body.content.clone()).unwrap_or_default();
            }
            Directive::Partial { name, body } => {
                let Some((name, body)) = self.require_named(tag, name, body) else {
                    return;
                };
                if self
                    .markup
                    .set_partial(name.to_owned(), body.content.clone())
                {
                    self.report(Diagnostic::PartialRedefined {
                        name: name.to_owned(),
                        line: tag.line,
                    });
                }
            }
            Directive::Variable { name, body } => {
                let Some((name, body)) = self.require_named(tag, name, body) else {
                    return;
                };
                if self.markup.set_variable(name.to_owned(), Script::from(body)) {
                    self.report(Diagnostic::VariableRedefined {
                        name: name.to_owned(),
                        line: tag.line,
                    });
                }
            }
            Directive::Ignored => {}
        }
    }

    pub fn finish(self) -> Assembly {
        Assembly {
            markup: self.markup,
            diagnostics: self.diagnostics,
        }
    }

    fn require_named<'t>(
        &mut self,
        tag: &Tag,
        name: Option<&'t str>,
        body: Option<&'t Body>,
    ) -> Option<(&'t str, &'t Body)> {
        let Some(name) = name else {
            self.report(Diagnostic::MissingName {
                tag: tag.name.clone(),
                line: tag.line,
            });
            return None;
        };
        let Some(body) = body else {
            self.report(Diagnostic::MissingBody {
                tag: tag.name.clone(),
                name: Some(name.to_owned()),
                line: tag.line,
            });
            return None;
        };
        Some((name, body))
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        debug!(line = diagnostic.line(), "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Fold tags, in order, into one document.
pub fn assemble(tags: &[Tag]) -> Assembly {
    let mut assembler = Assembler::new();
    for tag in tags {
        assembler.apply(tag);
    }
    assembler.finish()
}
