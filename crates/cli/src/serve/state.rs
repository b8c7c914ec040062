//! Server state: one form engine for one form-filling interaction.

use proof_form::{BakeTarget, FormEngine};
use tokio::sync::RwLock;

use crate::baker::CookiecutterProcess;

/// Shared across request handlers. The engine itself is single-threaded;
/// the lock serializes render passes so each user edit sees a consistent
/// session.
pub(crate) struct AppState {
    pub engine: RwLock<FormEngine>,
    pub generator: CookiecutterProcess,
    pub target: BakeTarget,
    /// Template display name for the page title.
    pub template_name: String,
}
