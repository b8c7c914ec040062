//! The resolved form view: what the display runtime renders after each
//! pass. Serializable so an HTTP front-end can consume it directly.

use serde::Serialize;

/// Widget primitive for one field.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    /// Single-line text input.
    Text {
        value: String,
        /// Placeholder shown while empty ("Required" for required fields).
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        /// The raw `{{ ... }}` expression for computed fields, shown so
        /// the user can see where the value comes from.
        #[serde(skip_serializing_if = "Option::is_none")]
        expression: Option<String>,
    },
    /// Single-choice radio.
    Choice {
        options: Vec<String>,
        selected: String,
    },
    /// Nested fields rendered as an indented block.
    Group { fields: Vec<Field> },
}

/// One visible form field, resolved against the live session.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Field {
    /// Dotted path into the session (`database.db.host`).
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// False for computed (expression-derived) values.
    pub editable: bool,
    pub widget: Widget,
    /// Per-field resolution error (a failed expression render); other
    /// fields are unaffected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The full resolved form for one render pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormView {
    /// Currently visible fields, in schema order.
    pub fields: Vec<Field>,
    /// The live parameter mapping (shown as the context sidebar).
    pub context: serde_json::Value,
}

/// `snake_case_name` -> `Snake Case Name`, for top-level field labels.
pub(crate) fn snake_case_to_title(name: &str) -> String {
    name.split('_')
        .filter(|t| !t.is_empty())
        .map(|t| {
            let mut chars = t.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_titles() {
        assert_eq!(snake_case_to_title("project_name"), "Project Name");
        assert_eq!(snake_case_to_title("license"), "License");
        assert_eq!(snake_case_to_title("a__b"), "A B");
    }

    #[test]
    fn widget_serializes_with_kind_tag() {
        let widget = Widget::Choice {
            options: vec!["MIT".into(), "Apache-2.0".into()],
            selected: "MIT".into(),
        };
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["kind"], "choice");
        assert_eq!(json["selected"], "MIT");
    }
}
