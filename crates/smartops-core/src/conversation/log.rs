use super::message::Message;
use serde::{Deserialize, Serialize};

/// One `{role, content}` pair of the exchange history sent with a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeMessage {
    pub role: String,
    pub content: String,
}

/// Ordered, append-only log of the conversation.
///
/// `append` is the only mutator besides `replace_all`, which is reserved for
/// loading a saved conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that opens with an assistant greeting.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let mut log = Self::new();
        log.append(Message::assistant(greeting));
        log
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// History for the NLU service, oldest first.
    ///
    /// Messages with blank content are skipped and roles are reduced to
    /// `"user"` / `"assistant"`. `limit` keeps only the most recent entries.
    pub fn sanitized_history(&self, limit: Option<usize>) -> Vec<ExchangeMessage> {
        let sanitized: Vec<ExchangeMessage> = self
            .messages
            .iter()
            .filter(|message| !message.content.trim().is_empty())
            .map(|message| ExchangeMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            })
            .collect();

        match limit {
            Some(limit) if sanitized.len() > limit => sanitized[sanitized.len() - limit..].to_vec(),
            _ => sanitized,
        }
    }
}
