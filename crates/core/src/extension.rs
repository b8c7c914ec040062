//! The reserved `_viz_context` extension block: required-field marks,
//! conditional visibility rules, and per-parameter descriptions.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::{SchemaIssue, SchemaIssueKind};

/// Reserved top-level key carrying the extension block.
pub const EXTENSION_KEY: &str = "_viz_context";

/// A JSON primitive a conditional rule compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl TriggerValue {
    /// Accepts only primitives; objects, arrays and null are rejected by
    /// the extension shape check.
    pub fn from_json(value: &Value) -> Option<TriggerValue> {
        match value {
            Value::String(s) => Some(TriggerValue::Str(s.clone())),
            Value::Bool(b) => Some(TriggerValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(TriggerValue::Int(i))
                } else {
                    n.as_f64().map(TriggerValue::Float)
                }
            }
            _ => None,
        }
    }

    /// Compare against a live form value. Form values are strings (text
    /// inputs and chosen options), so non-string triggers match on their
    /// canonical display form.
    pub fn matches_str(&self, live: &str) -> bool {
        match self {
            TriggerValue::Str(s) => s == live,
            _ => self.to_string() == live,
        }
    }
}

impl std::fmt::Display for TriggerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriggerValue::Str(s) => f.write_str(s),
            TriggerValue::Int(i) => write!(f, "{}", i),
            TriggerValue::Float(x) => write!(f, "{}", x),
            TriggerValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// "When the controlling parameter equals `trigger_value`, ask for every
/// name in `dependents`."
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRule {
    pub trigger_value: TriggerValue,
    pub dependents: BTreeSet<String>,
}

/// Parsed extension block. Empty when the schema carries no `_viz_context`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaExtension {
    /// Parameters the user must fill in explicitly; their schema defaults
    /// are ignored at session seeding.
    pub required: BTreeSet<String>,
    /// Controlling-parameter name paired with its rule, in declaration order.
    pub conditions: Vec<(String, ConditionalRule)>,
    /// Parameter name to markdown description, in declaration order.
    pub descriptions: Vec<(String, String)>,
}

impl SchemaExtension {
    pub fn description(&self, name: &str) -> Option<&str> {
        self.descriptions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_str())
    }

    /// Parse the raw `_viz_context` value, accumulating shape problems.
    ///
    /// Returns the extension parsed as far as possible; callers must treat
    /// a non-empty `issues` as fatal for the whole schema.
    pub fn from_json(raw: &Value, issues: &mut Vec<SchemaIssue>) -> SchemaExtension {
        let mut ext = SchemaExtension::default();

        let Some(obj) = raw.as_object() else {
            issues.push(SchemaIssue::new(
                None,
                SchemaIssueKind::ExtensionShape,
                format!("\"{}\" must be a mapping", EXTENSION_KEY),
            ));
            return ext;
        };

        if let Some(required) = obj.get("is_required") {
            match required.as_array() {
                Some(entries) => {
                    for entry in entries {
                        match entry.as_str() {
                            Some(name) => {
                                ext.required.insert(name.to_owned());
                            }
                            None => issues.push(SchemaIssue::new(
                                None,
                                SchemaIssueKind::ExtensionShape,
                                "\"is_required\" entries must be parameter names",
                            )),
                        }
                    }
                }
                None => issues.push(SchemaIssue::new(
                    None,
                    SchemaIssueKind::ExtensionShape,
                    "\"is_required\" must be a sequence of parameter names",
                )),
            }
        }

        if let Some(conditions) = obj.get("if") {
            match conditions.as_object() {
                Some(entries) => {
                    for (controlling, rule) in entries {
                        if let Some(rule) = parse_rule(controlling, rule, issues) {
                            ext.conditions.push((controlling.clone(), rule));
                        }
                    }
                }
                None => issues.push(SchemaIssue::new(
                    None,
                    SchemaIssueKind::ExtensionShape,
                    "\"if\" must be a mapping of parameter name to condition",
                )),
            }
        }

        if let Some(descriptions) = obj.get("descriptions") {
            match descriptions.as_object() {
                Some(entries) => {
                    for (name, text) in entries {
                        match text.as_str() {
                            Some(text) => ext.descriptions.push((name.clone(), text.to_owned())),
                            None => issues.push(SchemaIssue::new(
                                Some(name),
                                SchemaIssueKind::ExtensionShape,
                                format!("description for \"{}\" must be a string", name),
                            )),
                        }
                    }
                }
                None => issues.push(SchemaIssue::new(
                    None,
                    SchemaIssueKind::ExtensionShape,
                    "\"descriptions\" must be a mapping of parameter name to string",
                )),
            }
        }

        ext
    }
}

fn parse_rule(
    controlling: &str,
    raw: &Value,
    issues: &mut Vec<SchemaIssue>,
) -> Option<ConditionalRule> {
    let Some(obj) = raw.as_object() else {
        issues.push(SchemaIssue::new(
            Some(controlling),
            SchemaIssueKind::ExtensionShape,
            format!("\"if\" clause for \"{}\" must be a mapping", controlling),
        ));
        return None;
    };

    let trigger_value = match obj.get("is") {
        Some(raw_trigger) => match TriggerValue::from_json(raw_trigger) {
            Some(t) => Some(t),
            None => {
                issues.push(SchemaIssue::new(
                    Some(controlling),
                    SchemaIssueKind::ExtensionShape,
                    format!(
                        "invalid type for \"is\" of \"if\" clause \"{}\": must be a string, number or bool",
                        controlling
                    ),
                ));
                None
            }
        },
        None => {
            issues.push(SchemaIssue::new(
                Some(controlling),
                SchemaIssueKind::ExtensionShape,
                format!("\"if\" clause for \"{}\" is missing \"is\"", controlling),
            ));
            None
        }
    };

    let mut dependents = BTreeSet::new();
    match obj.get("ask_for") {
        Some(Value::Array(entries)) => {
            for entry in entries {
                match entry.as_str() {
                    Some(name) => {
                        dependents.insert(name.to_owned());
                    }
                    None => issues.push(SchemaIssue::new(
                        Some(controlling),
                        SchemaIssueKind::ExtensionShape,
                        format!(
                            "\"ask_for\" entries for \"{}\" must be parameter names",
                            controlling
                        ),
                    )),
                }
            }
        }
        Some(_) | None => {
            issues.push(SchemaIssue::new(
                Some(controlling),
                SchemaIssueKind::ExtensionShape,
                format!(
                    "\"if\" clause for \"{}\" needs \"ask_for\" as a sequence of parameter names",
                    controlling
                ),
            ));
            return None;
        }
    }

    trigger_value.map(|trigger_value| ConditionalRule {
        trigger_value,
        dependents,
    })
}
