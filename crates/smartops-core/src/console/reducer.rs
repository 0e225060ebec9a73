use super::effect::{ConsoleEffect, Notice};
use super::event::ConsoleEvent;
use super::state::{BusyState, ConsoleState};
use crate::conversation::Message;
use crate::error::{Result, SmartOpsError};
use crate::operation::load_for_edit;
use crate::plan::PlanState;
use crate::speech::Announcement;

/// Result of applying one event: the next state and what to do about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: ConsoleState,
    pub effects: Vec<ConsoleEffect>,
}

impl Transition {
    fn new(state: ConsoleState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn announce(mut self, announcement: Announcement) -> Self {
        self.effects.push(ConsoleEffect::Announce(announcement));
        self
    }

    fn speak(mut self, text: impl Into<String>) -> Self {
        self.effects.push(ConsoleEffect::Speak(text.into()));
        self
    }

    fn notify(mut self, notice: Notice) -> Self {
        self.effects.push(ConsoleEffect::Notify(notice));
        self
    }
}

fn ensure_idle(state: &ConsoleState) -> Result<()> {
    if state.is_busy() {
        Err(SmartOpsError::Busy)
    } else {
        Ok(())
    }
}

fn ensure_executing(state: &ConsoleState) -> Result<()> {
    match (&state.busy, &state.plan) {
        (Some(BusyState::Executing { .. }), PlanState::Approved { .. }) => Ok(()),
        _ => Err(SmartOpsError::invalid_state("no plan is executing")),
    }
}

/// Applies `event` to `state`.
///
/// Pure: `state` is not modified and no I/O happens. Errors mean the event is
/// not allowed right now (busy, wrong plan state, bad edit); the caller keeps
/// the previous state.
pub fn reduce(state: &ConsoleState, event: ConsoleEvent) -> Result<Transition> {
    let mut next = state.clone();

    let transition = match event {
        ConsoleEvent::AnalyzeStarted { command } => {
            ensure_idle(state)?;
            next.busy = Some(BusyState::Analyzing { command });
            Transition::new(next).announce(Announcement::Analyzing)
        }
        ConsoleEvent::AnalyzeSucceeded { command, response } => {
            next.busy = None;
            next.conversation.append(Message::user(command));
            next.conversation
                .append(Message::assistant(response.assistant_message.clone()));

            if response.has_actions() {
                next.plan = next.plan.propose(response.plan());
                Transition::new(next).announce(Announcement::PlanReady)
            } else {
                Transition::new(next).speak(response.assistant_message)
            }
        }
        ConsoleEvent::AnalyzeFailed { error } => {
            next.busy = None;
            Transition::new(next)
                .announce(Announcement::LinkFailure)
                .notify(Notice::error(format!("Connection error: {error}")))
        }
        ConsoleEvent::ParameterEdited {
            index,
            key,
            value,
            nested,
        } => {
            ensure_idle(state)?;
            next.plan = state.plan.edit(index, &key, &value, nested)?;
            Transition::new(next)
        }
        ConsoleEvent::PlanCancelled => {
            ensure_idle(state)?;
            next.plan = state.plan.cancel()?;
            Transition::new(next).notify(Notice::info("Plan discarded"))
        }
        ConsoleEvent::PlanApproved => {
            ensure_idle(state)?;
            next.plan = state.plan.approve()?;
            let total = next.plan.plan().map_or(0, |plan| plan.len());
            next.busy = Some(BusyState::Executing { total });
            Transition::new(next).announce(Announcement::Dispatching)
        }
        ConsoleEvent::ActionSettled { index: _, outcome } => {
            ensure_executing(state)?;
            next.conversation.append(outcome.to_message());
            Transition::new(next)
        }
        ConsoleEvent::ExecutionAborted {
            index,
            tool,
            reason,
        } => {
            ensure_executing(state)?;
            next.busy = None;
            Transition::new(next)
                .announce(Announcement::ExecutionError)
                .notify(Notice::error(format!(
                    "Action {} ({tool}) failed: {reason}. Plan kept for retry.",
                    index + 1
                )))
        }
        ConsoleEvent::ExecutionCompleted => {
            ensure_executing(state)?;
            let total = state.plan.plan().map_or(0, |plan| plan.len());
            next.plan = state.plan.consume()?;
            next.busy = None;
            Transition::new(next)
                .announce(Announcement::MissionAccomplished)
                .notify(Notice::success(format!("Plan executed ({total} actions)")))
        }
        ConsoleEvent::HistoryRefreshed { entries } => {
            next.history.replace_all(entries);
            Transition::new(next)
        }
        ConsoleEvent::HistoryRefreshFailed { error } => Transition::new(next)
            .notify(Notice::warning(format!("History unavailable: {error}"))),
        ConsoleEvent::HistoryEntryRemoved { id } => {
            next.history.remove(id);
            Transition::new(next)
        }
        ConsoleEvent::HistoryEntryDeleted { id } => Transition::new(next)
            .announce(Announcement::RecordPurged)
            .notify(Notice::success(format!("Log {id} deleted"))),
        ConsoleEvent::HistoryDeleteFailed { id, error } => Transition::new(next)
            .notify(Notice::error(format!("Delete of log {id} failed: {error}"))),
        ConsoleEvent::PlanReloaded { entry_id } => {
            ensure_idle(state)?;
            let entry = state.history.find(entry_id).ok_or_else(|| {
                SmartOpsError::invalid_state(format!("no history entry {entry_id}"))
            })?;
            match load_for_edit(entry) {
                Ok(plan) => {
                    next.plan = PlanState::Proposed { plan };
                    Transition::new(next)
                        .announce(Announcement::ReloadingPlan)
                        .notify(Notice::success("Ready for edit"))
                }
                Err(err) => Transition::new(next)
                    .notify(Notice::error(format!("Could not parse log data: {err}"))),
            }
        }
        ConsoleEvent::VoiceToggled => {
            next.voice_enabled = !state.voice_enabled;
            if next.voice_enabled {
                Transition::new(next)
                    .announce(Announcement::VoiceActive)
                    .notify(Notice::info("Vocal system online"))
            } else {
                Transition::new(next).notify(Notice::info("Vocal system offline"))
            }
        }
    };

    Ok(transition)
}
