//! proof-form: the form resolution engine.
//!
//! Takes a validated [`proof_core::Schema`] plus the mutable per-interaction
//! [`SessionState`] and answers the questions a form front-end asks:
//! which parameters are currently visible, what each field should display
//! (including read-only expression-computed defaults), whether the form is
//! complete, and finally hands the flattened parameter mapping to the
//! external generation engine.
//!
//! The engine is single-threaded and event-driven: every
//! [`FormEngine::set_value`] runs one full re-resolution pass and returns
//! the refreshed [`FormView`]. One pass always converges because conditions
//! reference raw parameter values only, never derived visibility.

pub mod bake;
pub mod defaults;
pub mod display;
pub mod engine;
pub mod error;
pub mod render;
pub mod session;
pub mod view;
pub mod visibility;

pub use bake::{BakeFailure, BakeRequest, BakeTarget, GenerationEngine};
pub use defaults::{compute_defaults, seed_session};
pub use display::{resolve_display, DisplayValue};
pub use engine::FormEngine;
pub use error::FormError;
pub use render::{ExpressionRenderer, JinjaRenderer, RenderFailure};
pub use session::{SessionState, SessionValue};
pub use view::{Field, FormView, Widget};
pub use visibility::should_ask;
