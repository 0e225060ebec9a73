//! Operation service boundary.
//!
//! - `model`: request/response types of the operations API and the
//!   `OperationLogEntry` audit record
//! - `service`: the `OperationService` trait implemented by transports
//! - `history`: the client-side `OperationHistoryCache` and plan reloading

mod history;
mod model;
mod service;

pub use history::{OperationHistoryCache, load_for_edit};
pub use model::{
    AnalyzeRequest, AnalyzeResponse, ExecutionRequest, ExecutionResponse, ExecutionResponseDto,
    OperationLogEntry,
};
pub use service::OperationService;
