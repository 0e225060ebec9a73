//! Client-side mirror of the operations audit log.

use super::model::OperationLogEntry;
use crate::error::{Result, SmartOpsError};
use crate::plan::{Action, ActionPlan};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read-through cache of the audit log.
///
/// Refreshes replace it wholesale ("last refresh wins"). Removal is local and
/// immediate; reconciling with the store is the next refresh's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationHistoryCache {
    entries: Vec<OperationLogEntry>,
}

impl OperationHistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, entries: Vec<OperationLogEntry>) {
        self.entries = entries;
    }

    /// Drops the entry with `id`, returning it if it was cached.
    pub fn remove(&mut self, id: i64) -> Option<OperationLogEntry> {
        let position = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(position))
    }

    pub fn find(&self, id: i64) -> Option<&OperationLogEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[OperationLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredActions {
    Bare(Vec<Action>),
    Wrapped { actions: Vec<Action> },
}

/// Turns an entry's stored action data back into an editable plan.
///
/// `response_data` may hold the JSON inline or as a JSON-encoded string, and
/// the actions may be a bare array or wrapped in `{"actions": [...]}`.
///
/// # Errors
///
/// [`SmartOpsError::Deserialization`] when the data is not an action set or
/// the set is empty.
pub fn load_for_edit(entry: &OperationLogEntry) -> Result<ActionPlan> {
    let decoded = match &entry.response_data {
        Value::String(text) => serde_json::from_str::<Value>(text).map_err(|err| {
            SmartOpsError::deserialization(format!("entry {}: {err}", entry.id))
        })?,
        other => other.clone(),
    };

    let actions = match serde_json::from_value::<StoredActions>(decoded) {
        Ok(StoredActions::Bare(actions)) | Ok(StoredActions::Wrapped { actions }) => actions,
        Err(err) => {
            return Err(SmartOpsError::deserialization(format!(
                "entry {} holds no action set: {err}",
                entry.id
            )));
        }
    };

    if actions.is_empty() {
        return Err(SmartOpsError::deserialization(format!(
            "entry {} holds an empty action set",
            entry.id
        )));
    }
    Ok(ActionPlan::new(actions))
}
