use serde::Serialize;

/// One markup declaration: `name -attr="value" << body >>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    /// In source order; duplicates are kept.
    pub attributes: Vec<Attribute>,
    pub body: Option<Body>,
    pub line: usize,
}

impl Tag {
    /// Value of the last attribute called `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    /// Unquoted value.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Body {
    pub content: String,
    pub inline: bool,
}
