//! Sequential dispatch of approved action plans.
//!
//! [`PlanExecutor`] sends each action of a plan to the operations service in
//! order and projects every response onto an [`ActionOutcome`]. Progress is
//! logged under [`DISPATCH_TARGET`] inside one `dispatch` span per action, so
//! front ends can follow a run through [`tracing_layer::DispatchEventLayer`].

mod interpret;
pub mod tracing_layer;

pub use interpret::{interpret, scheduled_target};

use smartops_core::console::{ActionOutcome, ConsoleEvent};
use smartops_core::operation::{ExecutionRequest, OperationService};
use smartops_core::plan::ActionPlan;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

/// Tracing target of everything the executor logs about a run.
pub const DISPATCH_TARGET: &str = "smartops::dispatch";

/// One action that went through successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledAction {
    pub index: usize,
    pub outcome: ActionOutcome,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Action `index` failed; nothing after it was dispatched.
    Aborted {
        index: usize,
        tool: String,
        reason: String,
    },
}

/// Result of one pass over a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub run_id: String,
    pub settled: Vec<SettledAction>,
    pub outcome: RunOutcome,
}

impl ExecutionReport {
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }

    /// Console events describing the run, in dispatch order.
    pub fn events(&self) -> Vec<ConsoleEvent> {
        let mut events: Vec<ConsoleEvent> =
            self.settled.iter().map(SettledAction::to_event).collect();
        events.push(self.final_event());
        events
    }

    /// `ExecutionCompleted` or `ExecutionAborted`.
    pub fn final_event(&self) -> ConsoleEvent {
        match &self.outcome {
            RunOutcome::Completed => ConsoleEvent::ExecutionCompleted,
            RunOutcome::Aborted {
                index,
                tool,
                reason,
            } => ConsoleEvent::ExecutionAborted {
                index: *index,
                tool: tool.clone(),
                reason: reason.clone(),
            },
        }
    }
}

impl SettledAction {
    pub fn to_event(&self) -> ConsoleEvent {
        ConsoleEvent::ActionSettled {
            index: self.index,
            outcome: self.outcome.clone(),
        }
    }
}

/// Dispatches approved plans, one action at a time.
///
/// The executor keeps no per-action progress between runs: executing the
/// same plan again starts over from the first action.
pub struct PlanExecutor {
    service: Arc<dyn OperationService>,
}

impl PlanExecutor {
    pub fn new(service: Arc<dyn OperationService>) -> Self {
        Self { service }
    }

    /// Executes `plan` in order.
    ///
    /// Action `i + 1` is not sent before the response to action `i` has been
    /// received. The first failed action (error status, unreadable response
    /// or transport failure) stops the run.
    ///
    /// # Returns
    ///
    /// An [`ExecutionReport`] listing every settled action and how the run
    /// ended. Failures are part of the report, not an `Err`.
    pub async fn execute(&self, plan: &ActionPlan) -> ExecutionReport {
        self.run(plan, None).await
    }

    /// Like [`execute`](Self::execute), and also sends every settled action on
    /// `progress` the moment its response has been interpreted, before the
    /// next action is dispatched. The sender is dropped when the run ends.
    pub async fn execute_with_progress(
        &self,
        plan: &ActionPlan,
        progress: mpsc::UnboundedSender<SettledAction>,
    ) -> ExecutionReport {
        self.run(plan, Some(progress)).await
    }

    async fn run(
        &self,
        plan: &ActionPlan,
        progress: Option<mpsc::UnboundedSender<SettledAction>>,
    ) -> ExecutionReport {
        let run_id = Uuid::new_v4().to_string();
        let total = plan.len();
        let mut settled = Vec::with_capacity(total);

        tracing::info!(target: DISPATCH_TARGET, run_id = %run_id, total, "run started");

        for (index, action) in plan.iter().enumerate() {
            let span = tracing::info_span!(
                target: DISPATCH_TARGET,
                "dispatch",
                run_id = %run_id,
                index,
                tool = %action.tool
            );

            let result = async {
                tracing::info!(target: DISPATCH_TARGET, "in flight ({}/{})", index + 1, total);
                let request = ExecutionRequest::from(action);
                let outcome = match self.service.execute_confirmed(&request).await {
                    Ok(response) => interpret(action, &response),
                    Err(err) => Err(err.to_string()),
                };
                match &outcome {
                    Ok(_) => tracing::info!(target: DISPATCH_TARGET, "action settled"),
                    Err(reason) => {
                        tracing::warn!(target: DISPATCH_TARGET, reason = %reason, "action failed")
                    }
                }
                outcome
            }
            .instrument(span)
            .await;

            match result {
                Ok(outcome) => {
                    let action = SettledAction { index, outcome };
                    if let Some(progress) = &progress {
                        if progress.send(action.clone()).is_err() {
                            tracing::debug!(target: DISPATCH_TARGET, index, "progress receiver gone");
                        }
                    }
                    settled.push(action);
                }
                Err(reason) => {
                    tracing::warn!(
                        target: DISPATCH_TARGET,
                        run_id = %run_id,
                        index,
                        "run aborted; {} action(s) not dispatched",
                        total - index - 1
                    );
                    return ExecutionReport {
                        run_id,
                        settled,
                        outcome: RunOutcome::Aborted {
                            index,
                            tool: action.tool.clone(),
                            reason,
                        },
                    };
                }
            }
        }

        tracing::info!(target: DISPATCH_TARGET, run_id = %run_id, total, "run completed");
        ExecutionReport {
            run_id,
            settled,
            outcome: RunOutcome::Completed,
        }
    }
}
