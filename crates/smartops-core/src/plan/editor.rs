//! Parameter editor.
//!
//! Applies a single field edit to a plan and returns the edited copy. The
//! caller's plan is never touched, so any other holder of the previous value
//! keeps seeing the previous value.

use super::model::{ActionPlan, ParamValue};
use crate::error::PlanEditError;

/// Keys that are list-typed even when the proposed value arrived as a scalar.
pub const LIST_FIELDS: &[&str] = &["attendees", "recipients", "cc", "bcc"];

/// Splits comma-separated text and trims every piece. Empty pieces are kept
/// so the stored list mirrors what was typed.
///
/// Idempotent: joining the result with `", "` and normalizing again yields the
/// same list.
pub fn normalize_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).map(str::to_string).collect()
}

fn is_list_field(key: &str, current: &ParamValue) -> bool {
    current.is_list() || LIST_FIELDS.contains(&key)
}

/// Returns a copy of `plan` with one field replaced by `raw_value`.
///
/// `nested` selects the reserved nested bag instead of the top-level one.
/// List-typed fields are normalized with [`normalize_list`]; every other field
/// stores the raw text verbatim. No other validation happens here.
///
/// # Errors
///
/// Contract violations only: an out-of-range `index`, a `key` that is not
/// already present in the target bag, or `nested` on an action without a
/// nested bag.
pub fn update(
    plan: &ActionPlan,
    index: usize,
    key: &str,
    raw_value: &str,
    nested: bool,
) -> Result<ActionPlan, PlanEditError> {
    let mut edited = plan.clone();
    let len = edited.len();
    let action = edited
        .actions_mut()
        .get_mut(index)
        .ok_or(PlanEditError::IndexOutOfRange { index, len })?;

    let bag = action
        .parameters
        .bag_mut(nested)
        .ok_or(PlanEditError::NoNestedBag)?;

    let slot = bag.get_mut(key).ok_or_else(|| PlanEditError::KeyNotFound {
        key: key.to_string(),
    })?;

    *slot = if is_list_field(key, slot) {
        ParamValue::List(normalize_list(raw_value))
    } else {
        ParamValue::Scalar(raw_value.to_string())
    };

    tracing::debug!(index, key, nested, "plan parameter updated");
    Ok(edited)
}
