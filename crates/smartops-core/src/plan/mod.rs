//! Action plan domain module.
//!
//! # Module Structure
//!
//! - `model`: `Action`, `ActionPlan`, `ParameterBag` and its value types
//! - `editor`: the parameter editor (`update`) and list normalization
//! - `preflight`: advisory checks shown during review
//! - `state`: the plan lifecycle (`PlanState`)

pub mod editor;
mod model;
pub mod preflight;
mod state;

pub use editor::{normalize_list, update};
pub use model::{
    Action, ActionPlan, FlatBag, NESTED_BAG_KEY, ParamValue, ParameterBag, ToolKind,
};
pub use preflight::{PreflightFinding, preflight};
pub use state::PlanState;
