//! Operation service trait.
//!
//! Defines the interface to the remote operations API.

use super::model::{
    AnalyzeRequest, AnalyzeResponse, ExecutionRequest, ExecutionResponse, OperationLogEntry,
};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract client for the operations API.
///
/// This trait decouples the console from the transport (HTTP in production,
/// in-memory doubles in tests).
///
/// # Implementation Notes
///
/// - Transport failures and non-2xx answers are `Err`.
/// - `execute_confirmed` returns `Ok` for any 2xx answer, including error
///   statuses and bodies that could not be parsed; those are represented by
///   [`ExecutionResponse::Failed`] and [`ExecutionResponse::Malformed`].
#[async_trait]
pub trait OperationService: Send + Sync {
    /// Sends a command with its exchange history to the NLU service.
    ///
    /// # Returns
    ///
    /// - `Ok(AnalyzeResponse)`: assistant message and candidate actions
    /// - `Err(_)`: transport failure
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse>;

    /// Executes one approved action.
    async fn execute_confirmed(&self, request: &ExecutionRequest) -> Result<ExecutionResponse>;

    /// Lists the audit log, in the order the store returns it.
    async fn history(&self) -> Result<Vec<OperationLogEntry>>;

    /// Deletes one audit log entry.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: entry deleted
    /// - `Err(_)`: transport failure or the store refused
    async fn delete(&self, id: i64) -> Result<()>;
}
