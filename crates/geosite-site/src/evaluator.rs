//! Second-stage template evaluation.
//!
//! After placeholder substitution a page may still contain template-language
//! syntax (`{{ ... }}`, `{% ... %}`). Such pages are handed to a
//! [`TemplateEvaluator`] together with a context object.

use minijinja::Environment;

/// Error from a [`TemplateEvaluator`].
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// Context could not be serialized.
    #[error("Failed to build template context: {0}")]
    Context(#[from] serde_json::Error),
    /// Template failed to parse or render.
    #[error("Failed to evaluate template: {0}")]
    Template(String),
}

/// Renders template-language syntax with a context.
pub trait TemplateEvaluator: Send + Sync {
    /// Render `source` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluateError::Template`] if the source is not a valid
    /// template or rendering fails.
    fn evaluate(&self, source: &str, context: &serde_json::Value) -> Result<String, EvaluateError>;
}

/// [`TemplateEvaluator`] backed by `minijinja`.
///
/// Auto-escaping is off: values come from operator configuration and the geo
/// source, and templates are expected to emit them as-is.
pub struct JinjaEvaluator {
    env: Environment<'static>,
}

impl JinjaEvaluator {
    /// Create an evaluator with default settings.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
        Self { env }
    }
}

impl Default for JinjaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEvaluator for JinjaEvaluator {
    fn evaluate(&self, source: &str, context: &serde_json::Value) -> Result<String, EvaluateError> {
        self.env
            .render_str(source, context)
            .map_err(|e| EvaluateError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_renders_expressions_and_loops() {
        let evaluator = JinjaEvaluator::new();
        let context = json!({
            "city": "Austin",
            "links": {"Dallas": "https://d", "Houston": "https://h"},
        });

        let output = evaluator
            .evaluate(
                "{{ city }}:{% for name, url in links|items %} {{ name }}={{ url }}{% endfor %}\n",
                &context,
            )
            .unwrap();

        assert_eq!(output, "Austin: Dallas=https://d Houston=https://h\n");
    }

    #[test]
    fn test_does_not_escape() {
        let evaluator = JinjaEvaluator::new();

        let output = evaluator
            .evaluate("{{ html }}", &json!({"html": "<b>&</b>"}))
            .unwrap();

        assert_eq!(output, "<b>&</b>");
    }

    #[test]
    fn test_syntax_error() {
        let evaluator = JinjaEvaluator::new();

        let err = evaluator.evaluate("{% for %}", &json!({})).unwrap_err();

        assert!(matches!(err, EvaluateError::Template(_)));
    }

    #[test]
    fn test_missing_variable_renders_empty() {
        let evaluator = JinjaEvaluator::new();

        assert_eq!(evaluator.evaluate("[{{ nope }}]", &json!({})).unwrap(), "[]");
    }
}
