//! Adapters between the console and the outside world: the operations HTTP
//! API and external speech commands.

pub mod http_operation_service;
pub mod speech_command;

pub use http_operation_service::HttpOperationService;
pub use speech_command::{CommandSpeechInput, CommandSpeechOutput};
