//! Schema load errors. A schema is rejected as a whole; `Invalid` carries
//! every consistency violation found so the caller can present the full
//! list rather than the first failure.

use serde::Serialize;

/// Classification of a single schema problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaIssueKind {
    /// The `_viz_context` block does not have the expected shape.
    ExtensionShape,
    /// The extension references a parameter that is not declared.
    UnknownParameter,
    /// A choice parameter was marked required.
    RequiredChoice,
    /// A parameter definition has an unsupported value type or nesting.
    InvalidParameter,
}

/// One schema problem, tied to the offending parameter where there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    /// Name of the offending parameter, when the problem is parameter-scoped.
    pub parameter: Option<String>,
    pub kind: SchemaIssueKind,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(
        parameter: Option<&str>,
        kind: SchemaIssueKind,
        message: impl Into<String>,
    ) -> Self {
        SchemaIssue {
            parameter: parameter.map(str::to_owned),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// All errors that can come out of loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("error reading schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in schema: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema parsed but is inconsistent. One issue per offending field.
    #[error("invalid schema:\n{}", join_issues(.issues))]
    Invalid { issues: Vec<SchemaIssue> },
}

impl SchemaError {
    /// The collected issues, empty for `Io`/`Json` errors.
    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            SchemaError::Invalid { issues } => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}
