//! Domain layer of the SmartOps operations console.
//!
//! Natural-language commands come back from the NLU service as an
//! [`ActionPlan`](plan::ActionPlan). The operator reviews and edits it, then
//! approves it for sequential execution. This crate holds the data model and
//! the pure state machine; I/O lives in the other workspace crates.

pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod operation;
pub mod plan;
pub mod speech;

// Re-export common error type
pub use error::{PlanEditError, Result, SmartOpsError};
