//! Filesystem-facing plumbing: where files live, how configuration is loaded
//! and how logging is set up.

pub mod config_service;
pub mod logging;
pub mod paths;

pub use config_service::{ConfigOverrides, ConfigService};
pub use logging::{LoggingGuard, init_logging};
pub use paths::{PathError, SmartOpsPaths};
