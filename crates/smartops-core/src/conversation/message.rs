//! Conversation message types.

use serde::{Deserialize, Serialize};

/// Target shown on a scheduled card when the nested bag names nobody.
pub const UNSPECIFIED_TARGET: &str = "unspecified target";

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed (or dictated) by the operator.
    User,
    /// Message from the assistant, including execution results.
    #[serde(alias = "bot", alias = "system")]
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Typed, renderable summary of one executed action.
///
/// Built only by the plan executor and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultCard {
    /// A meeting was booked; details come from the service's execution result.
    MeetingSuccess {
        details: String,
        join_link: Option<String>,
    },
    /// An email went out; values echo the request that was approved.
    EmailSuccess { recipient: String, subject: String },
    /// The operation was deferred to `execution_time`.
    Scheduled {
        operation_type: String,
        execution_time: String,
        target: String,
    },
}

/// A single message in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_card: Option<ResultCard>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            result_card: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            result_card: None,
        }
    }

    pub fn with_card(mut self, card: ResultCard) -> Self {
        self.result_card = Some(card);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_bot_role_reads_as_assistant() {
        let message: Message =
            serde_json::from_value(json!({ "role": "bot", "content": "Standing by." })).unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert!(message.result_card.is_none());
    }

    #[test]
    fn test_card_is_tagged() {
        let message = Message::assistant("Email sent").with_card(ResultCard::EmailSuccess {
            recipient: "Alice".to_string(),
            subject: "Launch".to_string(),
        });
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["result_card"]["type"], "email_success");
        assert_eq!(value["role"], "assistant");
    }
}
