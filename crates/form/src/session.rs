//! Mutable per-interaction state: the live values the user is editing.
//!
//! One `SessionState` exists per form-filling interaction, exclusively
//! owned by the [`FormEngine`](crate::FormEngine) and mutated only in
//! response to user input events. Nested group values are addressed with
//! dotted paths (`database.db.host`).

use serde_json::Value;

/// A live form value. Mirrors the shape of the parameter definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue {
    /// Current content of a text input.
    Text(String),
    /// Currently selected option of a choice.
    Choice(String),
    /// Nested group values, in schema order.
    Group(Vec<(String, SessionValue)>),
}

impl SessionValue {
    /// The primitive string form, `None` for groups.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SessionValue::Text(s) | SessionValue::Choice(s) => Some(s),
            SessionValue::Group(_) => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            SessionValue::Text(s) | SessionValue::Choice(s) => Value::String(s.clone()),
            SessionValue::Group(entries) => {
                let mut map = serde_json::Map::new();
                for (name, value) in entries {
                    map.insert(name.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

/// Ordered name-to-value map for one interaction. Not persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    values: Vec<(String, SessionValue)>,
}

impl SessionState {
    pub fn new(values: Vec<(String, SessionValue)>) -> SessionState {
        SessionState { values }
    }

    /// Top-level entries in schema order.
    pub fn entries(&self) -> &[(String, SessionValue)] {
        &self.values
    }

    /// Look up a top-level value.
    pub fn get(&self, name: &str) -> Option<&SessionValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Look up a value by dotted path, descending through groups.
    pub fn get_path(&self, path: &str) -> Option<&SessionValue> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            let SessionValue::Group(entries) = current else {
                return None;
            };
            current = entries.iter().find(|(n, _)| n == segment).map(|(_, v)| v)?;
        }
        Some(current)
    }

    /// Replace the value at a dotted path. Returns false when the path
    /// does not exist; the shape of the session never changes after
    /// seeding.
    pub fn set_path(&mut self, path: &str, value: SessionValue) -> bool {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return false;
        };
        let Some(slot) = self
            .values
            .iter_mut()
            .find(|(n, _)| n == first)
            .map(|(_, v)| v)
        else {
            return false;
        };

        let mut current = slot;
        for segment in segments {
            let SessionValue::Group(entries) = current else {
                return false;
            };
            let Some(next) = entries
                .iter_mut()
                .find(|(n, _)| n == segment)
                .map(|(_, v)| v)
            else {
                return false;
            };
            current = next;
        }
        *current = value;
        true
    }

    /// Flatten into the JSON mapping handed to expression rendering and
    /// to the generation engine. Groups pass through as nested mappings.
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.values {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}
