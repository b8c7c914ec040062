//! The form engine: one schema + one session, resolved into a view after
//! every user edit.
//!
//! This struct is the explicit session handle the rest of the system
//! passes around -- schema and defaults are resolved once when it is
//! built and live here for the whole interaction, instead of hiding in
//! process-wide caches.

use std::path::PathBuf;

use proof_core::{ParameterDefinition, Schema};
use serde_json::Value;

use crate::bake::{BakeRequest, BakeTarget, GenerationEngine};
use crate::defaults::seed_session;
use crate::display::resolve_display;
use crate::error::FormError;
use crate::render::{has_expression, ExpressionRenderer, JinjaRenderer};
use crate::session::{SessionState, SessionValue};
use crate::view::{snake_case_to_title, Field, FormView, Widget};
use crate::visibility::should_ask;

pub struct FormEngine {
    schema: Schema,
    session: SessionState,
    renderer: Box<dyn ExpressionRenderer>,
}

impl FormEngine {
    /// Build an engine with the default Jinja renderer. Seeds the session
    /// from the schema defaults, required parameters empty.
    pub fn new(schema: Schema) -> FormEngine {
        FormEngine::with_renderer(schema, Box::new(JinjaRenderer::new()))
    }

    pub fn with_renderer(schema: Schema, renderer: Box<dyn ExpressionRenderer>) -> FormEngine {
        let session = seed_session(&schema);
        FormEngine {
            schema,
            session,
            renderer,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Apply one user edit and run the full re-resolution pass.
    ///
    /// `path` is the dotted field name from the view. The write is
    /// validated against the parameter definition first: choices must be
    /// a declared option and computed (expression-default) fields are
    /// read-only. Returns the refreshed view -- visibility is recomputed
    /// for every field, since the edited value may control dependents.
    pub fn set_value(&mut self, path: &str, raw: &str) -> Result<FormView, FormError> {
        let definition =
            self.definition_at(path)
                .ok_or_else(|| FormError::UnknownParameter {
                    name: path.to_owned(),
                })?;

        let value = match definition {
            ParameterDefinition::Text(default) => {
                if has_expression(default) {
                    return Err(FormError::InvalidValue {
                        name: path.to_owned(),
                        message: "the value is computed from an expression and cannot be edited"
                            .to_owned(),
                    });
                }
                SessionValue::Text(raw.to_owned())
            }
            ParameterDefinition::Choice(options) => {
                if !options.iter().any(|o| o == raw) {
                    return Err(FormError::InvalidValue {
                        name: path.to_owned(),
                        message: format!("\"{}\" is not one of the declared options", raw),
                    });
                }
                SessionValue::Choice(raw.to_owned())
            }
            ParameterDefinition::Group(_) => {
                return Err(FormError::InvalidValue {
                    name: path.to_owned(),
                    message: "a parameter group has no direct value".to_owned(),
                });
            }
        };

        // The session shape is fixed at seeding, so a declared path
        // always has a slot. A failed write would silently drop the
        // edit, so it is surfaced instead of ignored.
        if !self.session.set_path(path, value) {
            return Err(FormError::UnknownParameter {
                name: path.to_owned(),
            });
        }
        Ok(self.view())
    }

    /// Resolve the current view: visible fields in schema order with
    /// their display values. A failed expression render is attached to
    /// its field; it never hides the rest of the form.
    pub fn view(&self) -> FormView {
        let session_json = self.session.to_json();
        let mut fields = Vec::new();

        for (name, definition) in self.schema.parameters() {
            // Names come straight from the schema, so should_ask cannot
            // report an unknown parameter here.
            let visible = should_ask(&self.schema, &self.session, name).unwrap_or(true);
            if !visible {
                continue;
            }
            fields.push(self.build_field(name, name, definition, true, &session_json));
        }

        FormView {
            fields,
            context: session_json,
        }
    }

    fn build_field(
        &self,
        name: &str,
        path: &str,
        definition: &ParameterDefinition,
        top_level: bool,
        session_json: &Value,
    ) -> Field {
        let label = if top_level {
            snake_case_to_title(name)
        } else {
            name.to_owned()
        };
        let description = if top_level {
            self.schema.extension().description(name).map(str::to_owned)
        } else {
            None
        };
        let required = top_level && self.schema.is_required(name);
        let live = self
            .session
            .get_path(path)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_owned();

        match definition {
            ParameterDefinition::Text(default) => {
                let computed = has_expression(default);
                let (value, editable, error) = match resolve_display(
                    path,
                    default,
                    &live,
                    self.renderer.as_ref(),
                    session_json,
                ) {
                    Ok(display) => (display.value, display.editable, None),
                    Err(e) => (live, false, Some(e.to_string())),
                };
                Field {
                    name: path.to_owned(),
                    label,
                    description,
                    required,
                    editable,
                    widget: Widget::Text {
                        value,
                        placeholder: required.then(|| "Required".to_owned()),
                        expression: computed.then(|| default.clone()),
                    },
                    error,
                }
            }
            ParameterDefinition::Choice(options) => Field {
                name: path.to_owned(),
                label,
                description,
                required,
                editable: true,
                widget: Widget::Choice {
                    options: options.clone(),
                    selected: live,
                },
                error: None,
            },
            ParameterDefinition::Group(entries) => {
                let nested = entries
                    .iter()
                    .map(|(key, def)| {
                        let child_path = format!("{}.{}", path, key);
                        self.build_field(key, &child_path, def, false, session_json)
                    })
                    .collect();
                Field {
                    name: path.to_owned(),
                    label,
                    description,
                    required,
                    editable: true,
                    widget: Widget::Group { fields: nested },
                    error: None,
                }
            }
        }
    }

    /// Required parameters whose live value is still the empty
    /// placeholder. Non-empty result blocks bake.
    ///
    /// A required parameter with an expression default cannot be edited
    /// directly; it counts as filled once its expression renders to a
    /// non-empty value. Groups carry their own leaf values and are never
    /// reported here.
    pub fn validate_complete(&self) -> Vec<String> {
        let session_json = self.session.to_json();
        self.schema
            .extension()
            .required
            .iter()
            .filter(|name| self.is_still_missing(name, &session_json))
            .cloned()
            .collect()
    }

    fn is_still_missing(&self, name: &str, session_json: &Value) -> bool {
        if let Some(ParameterDefinition::Text(default)) = self.schema.get(name) {
            if has_expression(default) {
                return match self
                    .renderer
                    .render(default, &serde_json::json!({ "cookiecutter": session_json }))
                {
                    Ok(rendered) => rendered.is_empty(),
                    Err(_) => true,
                };
            }
        }
        self.session
            .get(name)
            .and_then(|v| v.as_str())
            .is_some_and(|v| v.is_empty())
    }

    /// The finalized parameter mapping: the live session with every
    /// computed field resolved to its rendered value.
    pub fn final_context(&self) -> Result<Value, FormError> {
        let session_json = self.session.to_json();
        let mut context = session_json.clone();
        for (name, definition) in self.schema.parameters() {
            self.resolve_computed(name, definition, &session_json, &mut context)?;
        }
        Ok(context)
    }

    fn resolve_computed(
        &self,
        path: &str,
        definition: &ParameterDefinition,
        session_json: &Value,
        context: &mut Value,
    ) -> Result<(), FormError> {
        match definition {
            ParameterDefinition::Text(default) if has_expression(default) => {
                let rendered = self
                    .renderer
                    .render(
                        default,
                        &serde_json::json!({ "cookiecutter": session_json }),
                    )
                    .map_err(|e| FormError::TemplateRender {
                        field: path.to_owned(),
                        message: e.message,
                    })?;
                set_json_path(context, path, Value::String(rendered));
                Ok(())
            }
            ParameterDefinition::Group(entries) => {
                for (key, def) in entries {
                    let child_path = format!("{}.{}", path, key);
                    self.resolve_computed(&child_path, def, session_json, context)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Bake the project. Refuses while required parameters are missing;
    /// a generation engine failure is reported and leaves the form usable
    /// for another attempt.
    pub fn bake(
        &self,
        generator: &dyn GenerationEngine,
        target: BakeTarget,
    ) -> Result<PathBuf, FormError> {
        let missing = self.validate_complete();
        if !missing.is_empty() {
            return Err(FormError::Validation { missing });
        }

        let request = BakeRequest {
            target,
            context: self.final_context()?,
        };
        generator
            .bake(&request)
            .map_err(|e| FormError::Bake { message: e.message })
    }

    fn definition_at(&self, path: &str) -> Option<&ParameterDefinition> {
        let mut segments = path.split('.');
        let mut current = self.schema.get(segments.next()?)?;
        for segment in segments {
            let ParameterDefinition::Group(entries) = current else {
                return None;
            };
            current = entries.iter().find(|(n, _)| n == segment).map(|(_, d)| d)?;
        }
        Some(current)
    }
}

fn set_json_path(root: &mut Value, path: &str, value: Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Some(map) = current.as_object_mut() else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_owned(), value);
            return;
        }
        let Some(next) = map.get_mut(segment) else {
            return;
        };
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::BakeFailure;
    use proof_core::Schema;
    use serde_json::json;
    use std::sync::Mutex;

    fn schema() -> Schema {
        Schema::from_json_value(json!({
            "project_name": "My Project",
            "project_slug": "{{ cookiecutter.project_name | lower | replace(' ', '-') }}",
            "license": ["MIT", "Apache-2.0"],
            "attribution_text": "",
            "_viz_context": {
                "is_required": ["project_name"],
                "if": { "license": { "is": "MIT", "ask_for": ["attribution_text"] } }
            }
        }))
        .unwrap()
    }

    fn field_names(view: &FormView) -> Vec<&str> {
        view.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Generation engine stub that records the request it was handed.
    #[derive(Default)]
    struct RecordingEngine {
        requests: Mutex<Vec<BakeRequest>>,
        fail_with: Option<String>,
    }

    impl GenerationEngine for RecordingEngine {
        fn bake(&self, request: &BakeRequest) -> Result<PathBuf, BakeFailure> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.fail_with {
                Some(message) => Err(BakeFailure::new(message.clone())),
                None => Ok(PathBuf::from("/tmp/generated")),
            }
        }
    }

    #[test]
    fn edit_recomputes_visibility_in_the_same_pass() {
        let mut engine = FormEngine::new(schema());

        // MIT is the default, so the attribution field starts visible.
        assert!(field_names(&engine.view()).contains(&"attribution_text"));

        let view = engine.set_value("license", "Apache-2.0").unwrap();
        assert!(!field_names(&view).contains(&"attribution_text"));

        let view = engine.set_value("license", "MIT").unwrap();
        assert!(field_names(&view).contains(&"attribution_text"));
    }

    #[test]
    fn computed_field_tracks_its_controlling_value() {
        let mut engine = FormEngine::new(schema());
        let view = engine.set_value("project_name", "Space Parrot").unwrap();

        let slug = view
            .fields
            .iter()
            .find(|f| f.name == "project_slug")
            .unwrap();
        assert!(!slug.editable);
        let Widget::Text { value, expression, .. } = &slug.widget else {
            panic!("expected a text widget");
        };
        assert_eq!(value, "space-parrot");
        assert!(expression.is_some());
    }

    #[test]
    fn computed_fields_reject_direct_edits() {
        let mut engine = FormEngine::new(schema());
        assert!(matches!(
            engine.set_value("project_slug", "override"),
            Err(FormError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_field_and_bad_option_are_rejected() {
        let mut engine = FormEngine::new(schema());
        assert!(matches!(
            engine.set_value("no_such_param", "x"),
            Err(FormError::UnknownParameter { .. })
        ));
        assert!(matches!(
            engine.set_value("license", "GPL-3.0"),
            Err(FormError::InvalidValue { .. })
        ));
    }

    #[test]
    fn required_field_shows_placeholder_and_blocks_bake() {
        let engine = FormEngine::new(schema());
        let view = engine.view();
        let name_field = view
            .fields
            .iter()
            .find(|f| f.name == "project_name")
            .unwrap();
        assert!(name_field.required);
        let Widget::Text { value, placeholder, .. } = &name_field.widget else {
            panic!("expected a text widget");
        };
        assert_eq!(value, "");
        assert_eq!(placeholder.as_deref(), Some("Required"));

        assert_eq!(engine.validate_complete(), vec!["project_name"]);

        let generator = RecordingEngine::default();
        let err = engine.bake(&generator, BakeTarget::default()).unwrap_err();
        assert!(matches!(err, FormError::Validation { ref missing } if missing == &["project_name"]));
        // The engine was never invoked.
        assert!(generator.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn complete_form_bakes_with_the_resolved_context() {
        let mut engine = FormEngine::new(schema());
        engine.set_value("project_name", "Space Parrot").unwrap();
        assert!(engine.validate_complete().is_empty());

        let generator = RecordingEngine::default();
        let generated = engine
            .bake(
                &generator,
                BakeTarget {
                    template: "gh:someone/template".into(),
                    ..BakeTarget::default()
                },
            )
            .unwrap();
        assert_eq!(generated, PathBuf::from("/tmp/generated"));

        let requests = generator.requests.lock().unwrap();
        let context = &requests[0].context;
        assert_eq!(context["project_name"], "Space Parrot");
        // Computed fields are resolved, not passed as raw expressions.
        assert_eq!(context["project_slug"], "space-parrot");
        assert_eq!(context["license"], "MIT");
    }

    #[test]
    fn bake_failure_is_reported_and_recoverable() {
        let mut engine = FormEngine::new(schema());
        engine.set_value("project_name", "Demo").unwrap();

        let generator = RecordingEngine {
            fail_with: Some("output directory already exists".into()),
            ..RecordingEngine::default()
        };
        let err = engine.bake(&generator, BakeTarget::default()).unwrap_err();
        assert!(matches!(err, FormError::Bake { ref message } if message.contains("already exists")));

        // The form is still usable afterwards.
        assert!(engine.set_value("project_name", "Demo Two").is_ok());
    }

    #[test]
    fn broken_expression_surfaces_on_its_field_only() {
        let schema = Schema::from_json_value(json!({
            "project_name": "Demo",
            "bad_slug": "{{ cookiecutter.missing | lower }}"
        }))
        .unwrap();
        let engine = FormEngine::new(schema);
        let view = engine.view();

        let bad = view.fields.iter().find(|f| f.name == "bad_slug").unwrap();
        assert!(bad.error.is_some());
        assert!(!bad.editable);

        let good = view
            .fields
            .iter()
            .find(|f| f.name == "project_name")
            .unwrap();
        assert!(good.error.is_none());
    }

    #[test]
    fn required_group_edits_stick_and_bake_stays_reachable() {
        let schema = Schema::from_json_value(json!({
            "database": { "db": { "engine": ["postgres", "sqlite"], "host": "localhost" } },
            "_viz_context": { "is_required": ["database"] }
        }))
        .unwrap();
        let mut engine = FormEngine::new(schema);

        // The group keeps its shape and its leaves carry defaults, so
        // nothing is reported missing.
        assert!(engine.validate_complete().is_empty());

        let view = engine
            .set_value("database.db.host", "db.prod.internal")
            .unwrap();
        assert_eq!(view.context["database"]["db"]["host"], "db.prod.internal");

        let generator = RecordingEngine::default();
        engine.bake(&generator, BakeTarget::default()).unwrap();
        let requests = generator.requests.lock().unwrap();
        assert_eq!(
            requests[0].context["database"]["db"]["host"],
            "db.prod.internal"
        );
    }

    #[test]
    fn required_computed_field_counts_once_it_renders_non_empty() {
        let schema = Schema::from_json_value(json!({
            "project_name": "",
            "project_slug": "{{ cookiecutter.project_name | lower | replace(' ', '-') }}",
            "_viz_context": { "is_required": ["project_name", "project_slug"] }
        }))
        .unwrap();
        let mut engine = FormEngine::new(schema);

        // The slug renders empty while its controlling value is unset.
        assert_eq!(
            engine.validate_complete(),
            vec!["project_name", "project_slug"]
        );

        engine.set_value("project_name", "Space Parrot").unwrap();
        assert!(engine.validate_complete().is_empty());

        let generator = RecordingEngine::default();
        engine.bake(&generator, BakeTarget::default()).unwrap();
        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].context["project_slug"], "space-parrot");
    }

    #[test]
    fn nested_group_fields_carry_dotted_paths() {
        let schema = Schema::from_json_value(json!({
            "database": { "db": { "engine": ["postgres", "sqlite"], "host": "localhost" } }
        }))
        .unwrap();
        let mut engine = FormEngine::new(schema);
        let view = engine.view();

        let Widget::Group { fields } = &view.fields[0].widget else {
            panic!("expected a group widget");
        };
        let Widget::Group { fields: leaves } = &fields[0].widget else {
            panic!("expected a nested group widget");
        };
        assert_eq!(leaves[0].name, "database.db.engine");

        let view = engine.set_value("database.db.host", "db.internal").unwrap();
        assert_eq!(view.context["database"]["db"]["host"], "db.internal");
    }
}
