//! Console use case.
//!
//! `ConsoleUseCase` owns the [`ConsoleState`] and is the only place that
//! changes it. Every user action becomes one or more [`ConsoleEvent`]s that
//! go through [`reduce`]; the returned effects are then performed here
//! (speech) or handed back to the front end (notices).

use smartops_core::config::DEFAULT_HISTORY_LIMIT;
use smartops_core::console::{ConsoleEffect, ConsoleEvent, ConsoleState, Notice, reduce};
use smartops_core::operation::{AnalyzeRequest, OperationService};
use smartops_core::plan::{PreflightFinding, preflight};
use smartops_core::speech::{SilentSpeech, SpeechInput, SpeechOutput};
use smartops_core::{Result, SmartOpsError};
use smartops_execution::{PlanExecutor, SettledAction};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};

/// Coordinates the operations service, the plan executor and speech around
/// one console state.
///
/// The state lock is never held across a network call, so history refreshes
/// and deletes stay possible while an analyze or a run is in flight. The busy
/// flag in the state is what keeps a second submission out.
pub struct ConsoleUseCase {
    service: Arc<dyn OperationService>,
    executor: PlanExecutor,
    speech_out: Arc<dyn SpeechOutput>,
    speech_in: Arc<dyn SpeechInput>,
    state: RwLock<ConsoleState>,
    history_limit: usize,
}

impl ConsoleUseCase {
    /// Creates a text-only console over `service`.
    pub fn new(service: Arc<dyn OperationService>) -> Self {
        Self {
            executor: PlanExecutor::new(service.clone()),
            service,
            speech_out: Arc::new(SilentSpeech),
            speech_in: Arc::new(SilentSpeech),
            state: RwLock::new(ConsoleState::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_speech(
        mut self,
        speech_out: Arc<dyn SpeechOutput>,
        speech_in: Arc<dyn SpeechInput>,
    ) -> Self {
        self.speech_out = speech_out;
        self.speech_in = speech_in;
        self
    }

    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn with_state(mut self, state: ConsoleState) -> Self {
        self.state = RwLock::new(state);
        self
    }

    /// A copy of the current state for rendering.
    pub async fn snapshot(&self) -> ConsoleState {
        self.state.read().await.clone()
    }

    /// Submits a free-text command to the NLU service.
    ///
    /// Blank commands are ignored.
    ///
    /// # Returns
    ///
    /// - `Ok(notices)`: the command was handled; transport failures are
    ///   reported as notices and leave log and plan as they were
    /// - `Err(SmartOpsError::Busy)`: another operation is still in flight
    pub async fn submit_command(&self, command: &str) -> Result<Vec<Notice>> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(Vec::new());
        }

        let (history, effects, voice) = {
            let mut state = self.state.write().await;
            let history = state
                .conversation()
                .sanitized_history(Some(self.history_limit));
            let transition = reduce(
                &state,
                ConsoleEvent::AnalyzeStarted {
                    command: command.to_string(),
                },
            )?;
            *state = transition.state;
            (history, transition.effects, state.voice_enabled())
        };
        let mut notices = self.collect(effects, voice).await;

        let request = AnalyzeRequest {
            command: command.to_string(),
            history,
        };
        let event = match self.service.analyze(&request).await {
            Ok(response) => ConsoleEvent::AnalyzeSucceeded {
                command: command.to_string(),
                response,
            },
            Err(err) => {
                tracing::warn!("analyze failed: {err}");
                ConsoleEvent::AnalyzeFailed {
                    error: err.to_string(),
                }
            }
        };
        let succeeded = matches!(event, ConsoleEvent::AnalyzeSucceeded { .. });
        notices.extend(self.apply(event).await?);

        if succeeded {
            notices.extend(self.refresh_history().await);
        }
        Ok(notices)
    }

    /// Changes one parameter of the proposed plan.
    pub async fn edit_parameter(
        &self,
        index: usize,
        key: &str,
        value: &str,
        nested: bool,
    ) -> Result<Vec<Notice>> {
        self.apply(ConsoleEvent::ParameterEdited {
            index,
            key: key.to_string(),
            value: value.to_string(),
            nested,
        })
        .await
    }

    /// Discards the plan without any network call.
    pub async fn cancel_plan(&self) -> Result<Vec<Notice>> {
        self.apply(ConsoleEvent::PlanCancelled).await
    }

    /// Approves the plan and executes it from the first action.
    ///
    /// Also the retry path after a failed run: the kept plan is dispatched
    /// again from the start.
    pub async fn approve_plan(&self) -> Result<Vec<Notice>> {
        let (plan, effects, voice) = {
            let mut state = self.state.write().await;
            let transition = reduce(&state, ConsoleEvent::PlanApproved)?;
            *state = transition.state;
            let plan = state
                .plan()
                .plan()
                .cloned()
                .ok_or_else(|| SmartOpsError::internal("approved state without a plan"))?;
            (plan, transition.effects, state.voice_enabled())
        };
        let mut notices = self.collect(effects, voice).await;

        tracing::info!(actions = plan.len(), "plan approved");
        let (progress, settled) = mpsc::unbounded_channel();
        let (report, settled_notices) = tokio::join!(
            self.executor.execute_with_progress(&plan, progress),
            self.apply_settled(settled)
        );
        notices.extend(settled_notices);
        notices.extend(self.apply_logged(report.final_event()).await);

        if report.is_completed() {
            notices.extend(self.refresh_history().await);
        }
        Ok(notices)
    }

    /// Re-dispatches a plan whose last run failed.
    pub async fn retry_plan(&self) -> Result<Vec<Notice>> {
        {
            let state = self.state.read().await;
            if !state.plan().is_approved() {
                return Err(SmartOpsError::invalid_state("no failed run to retry"));
            }
        }
        self.approve_plan().await
    }

    /// Findings of the advisory checks on the current plan.
    pub async fn preflight(&self) -> Vec<PreflightFinding> {
        let state = self.state.read().await;
        state.plan().plan().map(preflight).unwrap_or_default()
    }

    /// Replaces the history cache from the store.
    ///
    /// Failures become a warning notice; the cache keeps its old content.
    pub async fn refresh_history(&self) -> Vec<Notice> {
        let event = match self.service.history().await {
            Ok(entries) => ConsoleEvent::HistoryRefreshed { entries },
            Err(err) => {
                tracing::warn!("history refresh failed: {err}");
                ConsoleEvent::HistoryRefreshFailed {
                    error: err.to_string(),
                }
            }
        };
        self.apply_logged(event).await
    }

    /// Removes an entry from the cache immediately, then deletes it in the
    /// store. A failed delete is reported but the entry is not put back; the
    /// next refresh shows what the store really holds.
    pub async fn delete_history_entry(&self, id: i64) -> Vec<Notice> {
        let mut notices = self
            .apply_logged(ConsoleEvent::HistoryEntryRemoved { id })
            .await;

        let event = match self.service.delete(id).await {
            Ok(()) => ConsoleEvent::HistoryEntryDeleted { id },
            Err(err) => {
                tracing::warn!(id, "delete failed: {err}");
                ConsoleEvent::HistoryDeleteFailed {
                    id,
                    error: err.to_string(),
                }
            }
        };
        notices.extend(self.apply_logged(event).await);
        notices
    }

    /// Loads the stored actions of history entry `id` as a new proposed plan.
    ///
    /// Unreadable stored data is reported as a notice and changes nothing.
    pub async fn load_for_edit(&self, id: i64) -> Result<Vec<Notice>> {
        self.apply(ConsoleEvent::PlanReloaded { entry_id: id }).await
    }

    pub async fn toggle_voice(&self) -> Result<Vec<Notice>> {
        self.apply(ConsoleEvent::VoiceToggled).await
    }

    /// Transcribes one utterance. `None` when nothing usable was heard or
    /// the speech backend failed.
    pub async fn listen(&self) -> Option<String> {
        match self.speech_in.transcribe().await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("speech input failed: {err}");
                None
            }
        }
    }

    /// Folds each settled action into the conversation as it arrives, while
    /// the rest of the plan is still running.
    async fn apply_settled(&self, mut settled: mpsc::UnboundedReceiver<SettledAction>) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(action) = settled.recv().await {
            notices.extend(self.apply_logged(action.to_event()).await);
        }
        notices
    }

    /// Runs `event` through the reducer and performs its effects.
    async fn apply(&self, event: ConsoleEvent) -> Result<Vec<Notice>> {
        let (effects, voice) = {
            let mut state = self.state.write().await;
            let transition = reduce(&state, event)?;
            *state = transition.state;
            (transition.effects, state.voice_enabled())
        };
        Ok(self.collect(effects, voice).await)
    }

    /// Like [`apply`](Self::apply) for events that are always valid in
    /// practice; a rejection is logged instead of returned.
    async fn apply_logged(&self, event: ConsoleEvent) -> Vec<Notice> {
        match self.apply(event).await {
            Ok(notices) => notices,
            Err(err) => {
                tracing::error!("console event rejected: {err}");
                vec![Notice::error(err.to_string())]
            }
        }
    }

    /// Speaks what needs speaking and returns the notices.
    async fn collect(&self, effects: Vec<ConsoleEffect>, voice: bool) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                ConsoleEffect::Notify(notice) => notices.push(notice),
                ConsoleEffect::Announce(announcement) => {
                    if voice {
                        self.speak(announcement.text()).await;
                    }
                }
                ConsoleEffect::Speak(text) => {
                    if voice && !text.trim().is_empty() {
                        self.speak(&text).await;
                    }
                }
            }
        }
        notices
    }

    async fn speak(&self, text: &str) {
        if let Err(err) = self.speech_out.speak(text).await {
            tracing::warn!("speech output failed: {err}");
        }
    }
}
