use crate::conversation::{Message, ResultCard};
use crate::operation::{AnalyzeResponse, OperationLogEntry};

/// Settled, successful outcome of one dispatched action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A typed result card plus its one-line summary.
    Card { summary: String, card: ResultCard },
    /// Generic success without a card.
    Acknowledged { tool: String, message: String },
}

impl ActionOutcome {
    /// The assistant message this outcome adds to the conversation.
    pub fn to_message(&self) -> Message {
        match self {
            Self::Card { summary, card } => Message::assistant(summary.clone()).with_card(card.clone()),
            Self::Acknowledged { message, .. } => Message::assistant(message.clone()),
        }
    }

    pub fn card(&self) -> Option<&ResultCard> {
        match self {
            Self::Card { card, .. } => Some(card),
            Self::Acknowledged { .. } => None,
        }
    }
}

/// Everything that can happen to the console.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    /// A command was submitted and is about to be analyzed.
    AnalyzeStarted { command: String },
    AnalyzeSucceeded {
        command: String,
        response: AnalyzeResponse,
    },
    /// Transport failure while analyzing; nothing else changes.
    AnalyzeFailed { error: String },
    ParameterEdited {
        index: usize,
        key: String,
        value: String,
        nested: bool,
    },
    PlanCancelled,
    /// Human confirmation; also the retry path for a failed run.
    PlanApproved,
    ActionSettled { index: usize, outcome: ActionOutcome },
    /// A failed action: the run stops and the plan stays for retry.
    ExecutionAborted {
        index: usize,
        tool: String,
        reason: String,
    },
    ExecutionCompleted,
    HistoryRefreshed { entries: Vec<OperationLogEntry> },
    HistoryRefreshFailed { error: String },
    /// Optimistic local removal, before the store confirms.
    HistoryEntryRemoved { id: i64 },
    HistoryEntryDeleted { id: i64 },
    HistoryDeleteFailed { id: i64, error: String },
    /// Reload a cached entry's stored actions for re-editing.
    PlanReloaded { entry_id: i64 },
    VoiceToggled,
}
