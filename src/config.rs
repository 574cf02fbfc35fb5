use serde::{Deserialize, Serialize};

pub const DEFAULT_OPEN: &str = "<<";
pub const DEFAULT_CLOSE: &str = ">>";

/// Open/close literals marking a tag body.
///
/// Either side left empty falls back to its default (`<<` / `>>`), so a
/// generator configuration only needs to name the delimiters it changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn open(&self) -> &str {
        if self.open.is_empty() {
            DEFAULT_OPEN
        } else {
            &self.open
        }
    }

    pub fn close(&self) -> &str {
        if self.close.is_empty() {
            DEFAULT_CLOSE
        } else {
            &self.close
        }
    }

    /// Copy with the defaults filled in.
    pub fn resolved(&self) -> Delimiters {
        Delimiters::new(self.open(), self.close())
    }
}
