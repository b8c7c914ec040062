//! Conditional visibility: which parameters the form currently asks for.

use proof_core::Schema;

use crate::error::FormError;
use crate::session::SessionState;

/// Decide whether the form should ask for `name` given the live session.
///
/// Policy, in order:
/// 1. An undeclared name is a programming/config error.
/// 2. Required parameters are always asked for.
/// 3. Every conditional rule listing `name` as a dependent is evaluated;
///    the field is visible if ANY rule's controlling parameter currently
///    equals its trigger value (union of matches, not first match).
/// 4. A name no rule mentions is visible -- hiding is strictly opt-in.
///
/// Pure read of the session; calling it twice with an unchanged session
/// yields the same answer.
pub fn should_ask(schema: &Schema, session: &SessionState, name: &str) -> Result<bool, FormError> {
    if schema.get(name).is_none() {
        return Err(FormError::UnknownParameter {
            name: name.to_owned(),
        });
    }

    if schema.is_required(name) {
        return Ok(true);
    }

    let mut gated = false;
    for (controlling, rule) in &schema.extension().conditions {
        if !rule.dependents.contains(name) {
            continue;
        }
        gated = true;
        let live = session.get(controlling).and_then(|v| v.as_str());
        if live.is_some_and(|live| rule.trigger_value.matches_str(live)) {
            return Ok(true);
        }
    }

    Ok(!gated)
}
