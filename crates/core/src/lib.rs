//! proof-core: the schema model behind the `proof` form tool.
//!
//! Parses a cookiecutter template's `cookiecutter.json` -- a flat or nested
//! parameter mapping plus the optional reserved `_viz_context` extension
//! block -- into an immutable, validated [`Schema`]. Inconsistent schemas
//! are rejected at load time with one [`SchemaIssue`] per offending field,
//! so the caller can show every problem at once.
//!
//! # Public API
//!
//! - [`Schema::load`] / [`Schema::from_json_str`] / [`Schema::from_file`]
//! - [`ParameterDefinition`] -- closed variant set: text, choice, group
//! - [`SchemaExtension`] -- required marks, conditional rules, descriptions
//! - [`SchemaError`] / [`SchemaIssue`]

pub mod error;
pub mod extension;
pub mod schema;
pub mod validate;

pub use error::{SchemaError, SchemaIssue, SchemaIssueKind};
pub use extension::{ConditionalRule, SchemaExtension, TriggerValue, EXTENSION_KEY};
pub use schema::{ParameterDefinition, Schema};
