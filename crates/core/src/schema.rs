//! The validated in-memory schema: ordered parameter definitions plus the
//! optional extension block.

use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::error::{SchemaError, SchemaIssue, SchemaIssueKind};
use crate::extension::{SchemaExtension, EXTENSION_KEY};
use crate::validate;

/// One template parameter, resolved to a closed variant at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterDefinition {
    /// Free text with a literal default (which may be a `{{ ... }}`
    /// expression rendered by the form layer).
    Text(String),
    /// Fixed choice set; the first option is the default. Never empty.
    Choice(Vec<String>),
    /// Nested parameters, at most two levels deep.
    Group(Vec<(String, ParameterDefinition)>),
}

impl ParameterDefinition {
    pub fn is_choice(&self) -> bool {
        matches!(self, ParameterDefinition::Choice(_))
    }
}

/// Immutable parsed schema. Construction runs every consistency check; a
/// `Schema` value is always internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    parameters: Vec<(String, ParameterDefinition)>,
    extension: SchemaExtension,
}

impl Schema {
    /// Parse and validate a raw `cookiecutter.json` document.
    ///
    /// The reserved `_viz_context` key is extracted into the extension
    /// block; its absence yields an empty extension. Every violation is
    /// collected before the schema is rejected, so `SchemaError::Invalid`
    /// carries the full list.
    pub fn from_json_value(mut raw: Value) -> Result<Schema, SchemaError> {
        let Some(entries) = raw.as_object_mut() else {
            return Err(SchemaError::Invalid {
                issues: vec![SchemaIssue::new(
                    None,
                    SchemaIssueKind::InvalidParameter,
                    "schema top level must be a mapping of parameter names to definitions",
                )],
            });
        };

        let mut issues = Vec::new();

        let extension = match entries.shift_remove(EXTENSION_KEY) {
            Some(block) => SchemaExtension::from_json(&block, &mut issues),
            None => SchemaExtension::default(),
        };

        let mut parameters = Vec::with_capacity(entries.len());
        for (name, value) in entries.iter() {
            if let Some(def) = parse_definition(name, value, 0, &mut issues) {
                parameters.push((name.clone(), def));
            }
        }

        issues.extend(validate::check_consistency(&parameters, &extension));

        if issues.is_empty() {
            Ok(Schema {
                parameters,
                extension,
            })
        } else {
            Err(SchemaError::Invalid { issues })
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Schema, SchemaError> {
        Schema::from_json_value(serde_json::from_str(raw)?)
    }

    /// Load from an open reader (the template's `cookiecutter.json`).
    pub fn load(reader: impl Read) -> Result<Schema, SchemaError> {
        Schema::from_json_value(serde_json::from_reader(reader)?)
    }

    pub fn from_file(path: &Path) -> Result<Schema, SchemaError> {
        Schema::load(std::fs::File::open(path)?)
    }

    /// Declared parameters in schema order. Order drives form field order.
    pub fn parameters(&self) -> &[(String, ParameterDefinition)] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.extension.required.contains(name)
    }

    pub fn extension(&self) -> &SchemaExtension {
        &self.extension
    }
}

/// Resolve a raw JSON parameter value into its variant.
///
/// `depth` is 0 for top-level parameters. Nesting past two mapping levels
/// and non-string/sequence/mapping values are collected as issues; the
/// definition is dropped from the parse but validation continues.
fn parse_definition(
    name: &str,
    raw: &Value,
    depth: usize,
    issues: &mut Vec<SchemaIssue>,
) -> Option<ParameterDefinition> {
    match raw {
        Value::String(default) => Some(ParameterDefinition::Text(default.clone())),
        Value::Array(options) => parse_choice(name, options, issues),
        Value::Object(entries) => {
            if depth >= 2 {
                issues.push(SchemaIssue::new(
                    Some(name),
                    SchemaIssueKind::InvalidParameter,
                    format!("mapping \"{}\" can only have 1 or 2 depth levels", name),
                ));
                return None;
            }
            if depth == 0 && entries.len() != 1 {
                issues.push(SchemaIssue::new(
                    Some(name),
                    SchemaIssueKind::InvalidParameter,
                    format!(
                        "mapping \"{}\" must have a single item defining the nested schema",
                        name
                    ),
                ));
                return None;
            }
            let mut nested = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                if let Some(def) = parse_definition(key, value, depth + 1, issues) {
                    nested.push((key.clone(), def));
                }
            }
            Some(ParameterDefinition::Group(nested))
        }
        _ => {
            issues.push(SchemaIssue::new(
                Some(name),
                SchemaIssueKind::InvalidParameter,
                format!(
                    "parameter \"{}\" must be a string, a sequence of options or a mapping",
                    name
                ),
            ));
            None
        }
    }
}

fn parse_choice(
    name: &str,
    options: &[Value],
    issues: &mut Vec<SchemaIssue>,
) -> Option<ParameterDefinition> {
    if options.is_empty() {
        issues.push(SchemaIssue::new(
            Some(name),
            SchemaIssueKind::InvalidParameter,
            format!("choice parameter \"{}\" needs at least one option", name),
        ));
        return None;
    }

    let mut parsed = Vec::with_capacity(options.len());
    for option in options {
        match option.as_str() {
            Some(option) => parsed.push(option.to_owned()),
            None => {
                issues.push(SchemaIssue::new(
                    Some(name),
                    SchemaIssueKind::InvalidParameter,
                    format!("options of choice parameter \"{}\" must be strings", name),
                ));
                return None;
            }
        }
    }
    Some(ParameterDefinition::Choice(parsed))
}
