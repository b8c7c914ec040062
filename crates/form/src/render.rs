//! Expression rendering seam. Computed defaults in a schema are Jinja
//! expressions (`{{ cookiecutter.project_name | lower }}`); evaluating
//! them is delegated behind [`ExpressionRenderer`] so the engine core
//! stays independent of the template dialect.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;

/// A single expression evaluation failure.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RenderFailure {
    pub message: String,
}

/// Renders one expression string against a substitution context.
pub trait ExpressionRenderer: Send + Sync {
    fn render(&self, expression: &str, context: &Value) -> Result<String, RenderFailure>;
}

/// True when a default string carries a `{{ ... }}` expression marker and
/// therefore must be computed rather than edited.
pub fn has_expression(default: &str) -> bool {
    match default.find("{{") {
        Some(open) => default[open + 2..].contains("}}"),
        None => false,
    }
}

/// Jinja-dialect renderer backed by minijinja. Undefined names are strict
/// errors: a broken expression surfaces instead of rendering empty.
pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    pub fn new() -> JinjaRenderer {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        JinjaRenderer { env }
    }
}

impl Default for JinjaRenderer {
    fn default() -> Self {
        JinjaRenderer::new()
    }
}

impl ExpressionRenderer for JinjaRenderer {
    fn render(&self, expression: &str, context: &Value) -> Result<String, RenderFailure> {
        self.env
            .render_str(expression, context)
            .map_err(|e| RenderFailure {
                message: e.to_string(),
            })
    }
}
