//! Conversation domain module.
//!
//! - `message`: `Message`, `MessageRole`, `ResultCard`
//! - `log`: the append-only `ConversationLog` and the sanitized exchange
//!   history sent to the NLU service

mod log;
mod message;

pub use log::{ConversationLog, ExchangeMessage};
pub use message::{Message, MessageRole, ResultCard, UNSPECIFIED_TARGET};
