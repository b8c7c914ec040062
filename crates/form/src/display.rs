//! Display value resolution for text fields.

use serde_json::Value;

use crate::error::FormError;
use crate::render::{has_expression, ExpressionRenderer};

/// What a text input should show and whether the user may edit it.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayValue {
    pub value: String,
    pub editable: bool,
}

/// Resolve what a text field displays.
///
/// A default carrying a `{{ ... }}` marker is a computed value: it is
/// rendered against the full live session (as `{"cookiecutter": ...}`)
/// and the field is read-only -- the user may not override it. Any other
/// default shows the live session value and stays editable. A render
/// failure is surfaced for the affected field, never swallowed.
pub fn resolve_display(
    name: &str,
    default: &str,
    live: &str,
    renderer: &dyn ExpressionRenderer,
    session_json: &Value,
) -> Result<DisplayValue, FormError> {
    if has_expression(default) {
        let context = serde_json::json!({ "cookiecutter": session_json });
        let value = renderer
            .render(default, &context)
            .map_err(|e| FormError::TemplateRender {
                field: name.to_owned(),
                message: e.message,
            })?;
        Ok(DisplayValue {
            value,
            editable: false,
        })
    } else {
        Ok(DisplayValue {
            value: live.to_owned(),
            editable: true,
        })
    }
}
