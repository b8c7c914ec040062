//! Generation engine seam: the external collaborator that turns a
//! template plus a finalized parameter mapping into a generated project
//! tree.

use std::path::PathBuf;

use serde_json::Value;

/// Where and how to bake; everything except the parameter mapping.
#[derive(Debug, Clone, Default)]
pub struct BakeTarget {
    /// Template location: local path or remote repository reference.
    pub template: String,
    /// Branch, tag or commit to check out for remote templates.
    pub checkout: Option<String>,
    /// Subfolder holding the schema for multi-template repositories.
    pub directory: Option<String>,
    /// Where the generated project lands; engine default when `None`.
    pub output_dir: Option<PathBuf>,
    pub overwrite_if_exists: bool,
    /// User config file passed through to the engine.
    pub config_file: Option<PathBuf>,
}

/// A fully prepared bake: the target plus the flattened, validated
/// parameter mapping (nested groups as nested mappings).
#[derive(Debug, Clone)]
pub struct BakeRequest {
    pub target: BakeTarget,
    pub context: Value,
}

/// Failure reported by the generation engine: destination exists, invalid
/// template, network failure resolving the repository. Never fatal to the
/// process.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct BakeFailure {
    pub message: String,
}

impl BakeFailure {
    pub fn new(message: impl Into<String>) -> BakeFailure {
        BakeFailure {
            message: message.into(),
        }
    }
}

/// External generation engine contract. Implementations run to completion
/// synchronously; the calling layer owns any waiting indicator.
pub trait GenerationEngine: Send + Sync {
    /// Generate the project, returning the path of the generated tree.
    fn bake(&self, request: &BakeRequest) -> Result<PathBuf, BakeFailure>;
}
