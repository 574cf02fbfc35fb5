//! Boundary to the collaborators that give a [`Markup`] its meaning.
//!
//! Script evaluation and body rendering are supplied by the caller through
//! [`Evaluator`] and [`Renderer`]; this module only sequences them.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::assembler::{TAG_FILENAME, TAG_SKIP};
use crate::config::Delimiters;
use crate::document::{Diagnostic, Markup, Script};
use crate::error::{BoxError, EngineError};

/// File extension marking a file as a template.
pub const TEMPLATE_EXTENSION: &str = ".accio";

/// Values visible to scripts and to the renderer.
pub type Bindings = Map<String, Value>;

pub trait Evaluator {
    fn evaluate(&self, script: &Script, bindings: &Bindings) -> Result<Value, BoxError>;
}

pub trait Renderer {
    fn render(
        &self,
        body: &str,
        partials: &HashMap<String, String>,
        bindings: &Bindings,
    ) -> Result<String, BoxError>;
}

/// What to write for one template file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blueprint {
    /// Target path relative to the destination root, if the template names one.
    pub filename: Option<String>,
    pub skip: bool,
    pub body: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Engine<E, R> {
    delimiters: Delimiters,
    evaluator: E,
    renderer: R,
}

impl<E: Evaluator, R: Renderer> Engine<E, R> {
    pub fn new(evaluator: E, renderer: R) -> Self {
        Self {
            delimiters: Delimiters::default(),
            evaluator,
            renderer,
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Parse one template file and resolve it against `data`.
    pub fn blueprint(&self, input: &str, data: &Bindings) -> Result<Blueprint, EngineError> {
        let assembly = crate::parse_with(input, &self.delimiters)?;
        let mut blueprint = self.resolve(&assembly.markup, data)?;
        blueprint.diagnostics = assembly.diagnostics;
        Ok(blueprint)
    }

    /// Evaluate variables in order, then the skip condition, the filename
    /// and finally the body. A skipped template is not rendered.
    pub fn resolve(&self, markup: &Markup, data: &Bindings) -> Result<Blueprint, EngineError> {
        let mut bindings = data.clone();
        for (name, script) in &markup.variables {
            let value = self
                .evaluator
                .evaluate(script, &bindings)
                .map_err(|source| EngineError::Variable {
                    name: name.clone(),
                    source,
                })?;
            debug!(variable = %name, "bound template variable");
            bindings.insert(name.clone(), value);
        }

        if let Some(script) = &markup.skip {
            let value = self.evaluate_tag(TAG_SKIP, script, &bindings)?;
            if is_truthy(&value) {
                debug!("template skipped");
                return Ok(Blueprint {
                    skip: true,
                    ..Blueprint::default()
                });
            }
        }

        let filename = match &markup.filename {
            Some(script) => filename_of(self.evaluate_tag(TAG_FILENAME, script, &bindings)?),
            None => None,
        };

        let body = self
            .renderer
            .render(&markup.body, &markup.partials, &bindings)
            .map_err(EngineError::Render)?;

        Ok(Blueprint {
            filename,
            skip: false,
            body,
            diagnostics: Vec::new(),
        })
    }

    fn evaluate_tag(
        &self,
        tag: &'static str,
        script: &Script,
        bindings: &Bindings,
    ) -> Result<Value, EngineError> {
        self.evaluator
            .evaluate(script, bindings)
            .map_err(|source| EngineError::Script { tag, source })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn filename_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Join `relative` onto `root` without ever leaving `root`.
///
/// The path is cleaned lexically; `..` components that would climb above
/// the root are dropped, as are root and prefix components.
pub fn join_within_root(root: &Path, relative: &str) -> PathBuf {
    let mut parts = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    let mut path = root.to_path_buf();
    path.extend(parts);
    path
}

/// Output path of a template file: its path without the template extension.
/// `None` when the file is not a template.
pub fn template_target(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(TEMPLATE_EXTENSION)?;
    if stem.is_empty() {
        return None;
    }
    Some(path.with_file_name(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Looks scripts up in the bindings by their trimmed source, or parses
    /// them as JSON literals.
    struct LookupEvaluator;

    impl Evaluator for LookupEvaluator {
        fn evaluate(&self, script: &Script, bindings: &Bindings) -> Result<Value, BoxError> {
            let source = script.source().trim();
            if let Some(value) = bindings.get(source) {
                return Ok(value.clone());
            }
            Ok(serde_json::from_str(source)?)
        }
    }

    /// Replaces `{{key}}` with bound strings and `{{>name}}` with partials.
    struct NaiveRenderer;

    impl Renderer for NaiveRenderer {
        fn render(
            &self,
            body: &str,
            partials: &HashMap<String, String>,
            bindings: &Bindings,
        ) -> Result<String, BoxError> {
            let mut out = body.to_string();
            for (name, partial) in partials {
                out = out.replace(&format!("{{{{>{name}}}}}"), partial);
            }
            for (key, value) in bindings {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out = out.replace(&format!("{{{{{key}}}}}"), &text);
            }
            Ok(out)
        }
    }

    fn engine() -> Engine<LookupEvaluator, NaiveRenderer> {
        Engine::new(LookupEvaluator, NaiveRenderer)
    }

    #[test]
    fn test_blueprint_end_to_end() {
        let input = r#"
variable -name="greeting" << "Hello" >>
variable -name="alias" << greeting >>
partial -name="sig" << -- {{alias}} >>
filename << "src/main.rs" >>
template <<
{{greeting}}, {{who}}!
{{>sig}}
>>
"#;
        let mut data = Bindings::new();
        data.insert("who".to_string(), json!("world"));

        let blueprint = engine().blueprint(input, &data).unwrap();
        assert!(!blueprint.skip);
        assert_eq!(blueprint.filename.as_deref(), Some("src/main.rs"));
        assert_eq!(blueprint.body, "Hello, world!\n -- Hello ");
        assert!(blueprint.diagnostics.is_empty());
    }

    #[test]
    fn test_skip_short_circuits() {
        let input = "skipif << true >>\ntemplate << {{missing}} >>";
        let blueprint = engine().blueprint(input, &Bindings::new()).unwrap();
        assert!(blueprint.skip);
        assert!(blueprint.body.is_empty());
    }

    #[test]
    fn test_falsy_skip_renders() {
        let input = "skipif << \"\" >>\ntemplate <<x>>";
        let blueprint = engine().blueprint(input, &Bindings::new()).unwrap();
        assert!(!blueprint.skip);
        assert_eq!(blueprint.body, "x");
        assert_eq!(blueprint.filename, None);
    }

    #[test]
    fn test_variable_failure_names_variable() {
        let input = "variable -name=\"broken\" << not json >>";
        let err = engine().blueprint(input, &Bindings::new()).unwrap_err();
        assert!(matches!(err, EngineError::Variable { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_parse_failure_propagates() {
        let err = engine().blueprint(" filename", &Bindings::new()).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_diagnostics_carried() {
        let input = "partial << x >>\ntemplate <<y>>";
        let blueprint = engine().blueprint(input, &Bindings::new()).unwrap();
        assert_eq!(blueprint.diagnostics.len(), 1);
    }

    #[test]
    fn test_custom_delimiters() {
        let engine = engine().with_delimiters(Delimiters::new("{%", "%}"));
        let blueprint = engine.blueprint("template {% a << b %}", &Bindings::new()).unwrap();
        assert_eq!(blueprint.body, " a << b ");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!(2.5)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!({"a": 1})));
    }

    #[test]
    fn test_filename_of_non_string() {
        assert_eq!(filename_of(json!(42)), Some("42".to_string()));
        assert_eq!(filename_of(json!("")), None);
    }

    #[test]
    fn test_join_within_root() {
        let root = Path::new("/out");
        assert_eq!(join_within_root(root, "a/b.rs"), PathBuf::from("/out/a/b.rs"));
        assert_eq!(join_within_root(root, "../../etc/passwd"), PathBuf::from("/out/etc/passwd"));
        assert_eq!(join_within_root(root, "a/../../b"), PathBuf::from("/out/b"));
        assert_eq!(join_within_root(root, "/abs/x"), PathBuf::from("/out/abs/x"));
        assert_eq!(join_within_root(root, "./c/./d"), PathBuf::from("/out/c/d"));
    }

    #[test]
    fn test_template_target() {
        assert_eq!(
            template_target(Path::new("src/main.rs.accio")),
            Some(PathBuf::from("src/main.rs"))
        );
        assert_eq!(template_target(Path::new("src/main.rs")), None);
        assert_eq!(template_target(Path::new(".accio")), None);
    }
}
