//! Consistency pass: cross-checks the extension block against the declared
//! parameters. Collects every violation instead of stopping at the first.

use crate::error::{SchemaIssue, SchemaIssueKind};
use crate::extension::SchemaExtension;
use crate::schema::ParameterDefinition;

pub(crate) fn check_consistency(
    parameters: &[(String, ParameterDefinition)],
    extension: &SchemaExtension,
) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    let declared = |name: &str| parameters.iter().any(|(n, _)| n == name);

    for required in &extension.required {
        match parameters.iter().find(|(n, _)| n == required) {
            None => issues.push(SchemaIssue::new(
                Some(required),
                SchemaIssueKind::UnknownParameter,
                format!(
                    "invalid required parameter \"{}\": it is not declared in the schema",
                    required
                ),
            )),
            Some((_, def)) if def.is_choice() => issues.push(SchemaIssue::new(
                Some(required),
                SchemaIssueKind::RequiredChoice,
                format!(
                    "choice parameter \"{}\" cannot be in \"is_required\"",
                    required
                ),
            )),
            Some(_) => {}
        }
    }

    for (described, _) in &extension.descriptions {
        if !declared(described) {
            issues.push(SchemaIssue::new(
                Some(described),
                SchemaIssueKind::UnknownParameter,
                format!(
                    "invalid parameter \"{}\" in \"descriptions\": it is not declared in the schema",
                    described
                ),
            ));
        }
    }

    for (controlling, rule) in &extension.conditions {
        if !declared(controlling) {
            issues.push(SchemaIssue::new(
                Some(controlling),
                SchemaIssueKind::UnknownParameter,
                format!(
                    "invalid \"if\" clause \"{}\": it is not declared in the schema",
                    controlling
                ),
            ));
        }
        for dependent in &rule.dependents {
            if !declared(dependent) {
                issues.push(SchemaIssue::new(
                    Some(dependent),
                    SchemaIssueKind::UnknownParameter,
                    format!(
                        "invalid \"ask_for\" parameter \"{}\": it is not declared in the schema",
                        dependent
                    ),
                ));
            }
        }
    }

    issues
}
