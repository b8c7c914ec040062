//! Default value computation: seeds the session when a template is first
//! loaded.

use proof_core::{ParameterDefinition, Schema};

use crate::session::{SessionState, SessionValue};

/// Compute the schema's own defaults: a text parameter's literal default,
/// a choice's first option, groups recursively. Pure function of the
/// schema; yields exactly the declared key set.
pub fn compute_defaults(schema: &Schema) -> SessionState {
    SessionState::new(
        schema
            .parameters()
            .iter()
            .map(|(name, def)| (name.clone(), default_for(def)))
            .collect(),
    )
}

/// Compute the initial session: schema defaults, except that required
/// text parameters are seeded with the empty placeholder so the user has
/// to fill them in explicitly. Groups always keep their nested shape and
/// are seeded leaf by leaf.
pub fn seed_session(schema: &Schema) -> SessionState {
    SessionState::new(
        schema
            .parameters()
            .iter()
            .map(|(name, def)| (name.clone(), seeded_for(schema, name, def)))
            .collect(),
    )
}

fn seeded_for(schema: &Schema, name: &str, def: &ParameterDefinition) -> SessionValue {
    match def {
        ParameterDefinition::Text(default) => {
            if schema.is_required(name) {
                SessionValue::Text(String::new())
            } else {
                SessionValue::Text(default.clone())
            }
        }
        // Required choices are rejected at schema load, so a choice
        // always starts on its default.
        ParameterDefinition::Choice(options) => SessionValue::Choice(options[0].clone()),
        ParameterDefinition::Group(entries) => SessionValue::Group(
            entries
                .iter()
                .map(|(key, def)| (key.clone(), seeded_for(schema, key, def)))
                .collect(),
        ),
    }
}

fn default_for(def: &ParameterDefinition) -> SessionValue {
    match def {
        ParameterDefinition::Text(default) => SessionValue::Text(default.clone()),
        // Choice sets are never empty; the schema rejects empty option lists.
        ParameterDefinition::Choice(options) => SessionValue::Choice(options[0].clone()),
        ParameterDefinition::Group(entries) => SessionValue::Group(
            entries
                .iter()
                .map(|(name, def)| (name.clone(), default_for(def)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proof_core::Schema;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_json_value(json!({
            "project_name": "My Project",
            "license": ["MIT", "Apache-2.0"],
            "database": { "db": { "engine": ["postgres", "sqlite"], "host": "localhost" } },
            "_viz_context": { "is_required": ["project_name"] }
        }))
        .unwrap()
    }

    #[test]
    fn defaults_cover_exactly_the_declared_key_set() {
        let schema = schema();
        let defaults = compute_defaults(&schema);
        let names: Vec<&str> = defaults.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["project_name", "license", "database"]);
        assert_eq!(
            defaults.get_path("database.db.engine").and_then(|v| v.as_str()),
            Some("postgres")
        );
        assert_eq!(
            defaults.get_path("database.db.host").and_then(|v| v.as_str()),
            Some("localhost")
        );
    }

    #[test]
    fn choice_defaults_to_first_option() {
        let defaults = compute_defaults(&schema());
        assert_eq!(
            defaults.get("license").and_then(|v| v.as_str()),
            Some("MIT")
        );
    }

    #[test]
    fn required_parameters_are_empty_seeded() {
        let session = seed_session(&schema());
        assert_eq!(
            session.get("project_name").and_then(|v| v.as_str()),
            Some("")
        );
        // Non-required parameters keep their schema defaults.
        assert_eq!(session.get("license").and_then(|v| v.as_str()), Some("MIT"));
    }

    #[test]
    fn required_group_keeps_its_nested_shape() {
        let schema = Schema::from_json_value(json!({
            "database": { "db": { "engine": ["postgres", "sqlite"], "host": "localhost" } },
            "_viz_context": { "is_required": ["database"] }
        }))
        .unwrap();

        let session = seed_session(&schema);
        assert!(matches!(
            session.get("database"),
            Some(SessionValue::Group(_))
        ));
        // Leaves inside the group keep their own defaults; the required
        // marker never flattens the group into a placeholder.
        assert_eq!(
            session.get_path("database.db.engine").and_then(|v| v.as_str()),
            Some("postgres")
        );
        assert_eq!(
            session.get_path("database.db.host").and_then(|v| v.as_str()),
            Some("localhost")
        );
    }
}
