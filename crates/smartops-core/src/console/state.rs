use crate::conversation::ConversationLog;
use crate::operation::OperationHistoryCache;
use crate::plan::PlanState;
use serde::{Deserialize, Serialize};

/// What the console is waiting on. New submissions are refused while set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusyState {
    Analyzing { command: String },
    Executing { total: usize },
}

/// The single source of truth for the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleState {
    pub(crate) conversation: ConversationLog,
    pub(crate) plan: PlanState,
    pub(crate) history: OperationHistoryCache,
    pub(crate) busy: Option<BusyState>,
    pub(crate) voice_enabled: bool,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self {
            conversation: ConversationLog::with_greeting(greeting),
            ..Self::default()
        }
    }

    /// Starts with voice output on or off.
    pub fn with_voice(mut self, enabled: bool) -> Self {
        self.voice_enabled = enabled;
        self
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn plan(&self) -> &PlanState {
        &self.plan
    }

    pub fn history(&self) -> &OperationHistoryCache {
        &self.history
    }

    pub fn busy(&self) -> Option<&BusyState> {
        self.busy.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }
}
