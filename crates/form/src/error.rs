//! Form engine errors. All of these are scoped to one interaction and
//! recoverable: the form stays usable after any of them.

/// All errors the form resolution engine can report.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A lookup referenced a parameter the schema does not declare.
    #[error("invalid parameter \"{name}\": it is not declared in the schema")]
    UnknownParameter { name: String },

    /// A value was rejected before being written to the session.
    #[error("invalid value for \"{name}\": {message}")]
    InvalidValue { name: String, message: String },

    /// A computed-default expression failed to evaluate. Scoped to one
    /// field; other fields are unaffected.
    #[error("expression for \"{field}\" failed to render: {message}")]
    TemplateRender { field: String, message: String },

    /// Required parameters are still empty; blocks bake only.
    #[error("missing required parameters: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// The generation engine failed. The user may adjust and retry.
    #[error("error baking project: {message}")]
    Bake { message: String },
}
