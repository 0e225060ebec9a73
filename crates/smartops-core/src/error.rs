//! Error types for the SmartOps console.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract violations raised by the parameter editor.
///
/// These indicate a caller bug (a stale index, a field that is not in the bag),
/// never a user-facing runtime condition. The plan is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanEditError {
    #[error("action index {index} out of range (plan has {len} actions)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("parameter '{key}' not found")]
    KeyNotFound { key: String },

    #[error("action has no nested parameter bag")]
    NoNestedBag,
}

/// A shared error type for the entire SmartOps workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SmartOpsError {
    /// Network unreachable, connection reset, timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Stored operation data could not be turned back into an action plan.
    #[error("Could not parse stored operation data: {0}")]
    Deserialization(String),

    /// Parameter editor contract violation
    #[error("Plan edit rejected: {0}")]
    PlanEdit(#[from] PlanEditError),

    /// The requested transition is not valid in the current console state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Another operation is still in flight.
    #[error("Another operation is in progress")]
    Busy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Text-to-speech or speech-to-text failure
    #[error("Speech error: {0}")]
    Speech(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SmartOpsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::Http {
            status,
            detail: detail.into(),
        }
    }

    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn speech(message: impl Into<String>) -> Self {
        Self::Speech(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for failures of the link to the operations service
    /// (unreachable host or a non-2xx answer).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http { .. })
    }

    pub fn is_deserialization(&self) -> bool {
        matches!(self, Self::Deserialization(_))
    }

    pub fn is_plan_edit(&self) -> bool {
        matches!(self, Self::PlanEdit(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SmartOpsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SmartOpsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SmartOpsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SmartOpsError>`.
pub type Result<T> = std::result::Result<T, SmartOpsError>;
