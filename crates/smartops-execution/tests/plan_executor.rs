use async_trait::async_trait;
use smartops_core::conversation::ResultCard;
use smartops_core::operation::{
    AnalyzeRequest, AnalyzeResponse, ExecutionRequest, ExecutionResponse, OperationLogEntry,
    OperationService,
};
use smartops_core::plan::{Action, ActionPlan, ParamValue, ParameterBag};
use smartops_core::{Result, SmartOpsError};
use smartops_core::console::ConsoleEvent;
use smartops_execution::{PlanExecutor, RunOutcome};
use tokio::sync::mpsc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Replies with canned bodies per tool and records the call order.
#[derive(Default)]
struct RecordingService {
    calls: Mutex<Vec<String>>,
    replies: HashMap<String, Reply>,
}

#[derive(Clone)]
enum Reply {
    Body(&'static str),
    Unreachable,
}

impl RecordingService {
    fn reply(mut self, tool: &str, reply: Reply) -> Self {
        self.replies.insert(tool.to_string(), reply);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OperationService for RecordingService {
    async fn analyze(&self, _request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        unreachable!("executor never analyzes")
    }

    async fn execute_confirmed(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("request:{}", request.intent));
        tokio::task::yield_now().await;
        self.calls
            .lock()
            .unwrap()
            .push(format!("response:{}", request.intent));

        match self.replies.get(&request.intent).cloned() {
            Some(Reply::Body(body)) => Ok(ExecutionResponse::from_body(body)),
            Some(Reply::Unreachable) => Err(SmartOpsError::transport("connection refused")),
            None => Ok(ExecutionResponse::from_body(r#"{"status":"success"}"#)),
        }
    }

    async fn history(&self) -> Result<Vec<OperationLogEntry>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: i64) -> Result<()> {
        Ok(())
    }
}

fn action(tool: &str) -> Action {
    Action::new(tool, ParameterBag::new())
}

fn three_step_plan() -> ActionPlan {
    ActionPlan::new(vec![
        Action::new(
            "send_email",
            ParameterBag::new()
                .with("recipient", ParamValue::scalar("Alice"))
                .with("subject", ParamValue::scalar("Launch")),
        ),
        action("notify_team"),
        action("schedule_meeting"),
    ])
}

#[tokio::test]
async fn test_actions_are_dispatched_strictly_in_order() {
    let service = Arc::new(RecordingService::default());
    let executor = PlanExecutor::new(service.clone());

    let report = executor.execute(&three_step_plan()).await;

    assert!(report.is_completed());
    assert_eq!(
        service.calls(),
        vec![
            "request:send_email",
            "response:send_email",
            "request:notify_team",
            "response:notify_team",
            "request:schedule_meeting",
            "response:schedule_meeting",
        ]
    );
    assert_eq!(
        report.settled.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn test_failure_stops_later_dispatches() {
    let service = Arc::new(
        RecordingService::default()
            .reply("notify_team", Reply::Body(r#"{"status":"error","detail":"team not found"}"#)),
    );
    let executor = PlanExecutor::new(service.clone());

    let report = executor.execute(&three_step_plan()).await;

    assert_eq!(
        report.outcome,
        RunOutcome::Aborted {
            index: 1,
            tool: "notify_team".to_string(),
            reason: "error: team not found".to_string(),
        }
    );
    assert_eq!(report.settled.len(), 1);
    assert!(!service.calls().iter().any(|call| call.ends_with("schedule_meeting")));

    let events = report.events();
    assert!(matches!(events[0], ConsoleEvent::ActionSettled { index: 0, .. }));
    assert!(matches!(events[1], ConsoleEvent::ExecutionAborted { index: 1, .. }));
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_transport_failure_aborts_the_run() {
    let service = Arc::new(RecordingService::default().reply("send_email", Reply::Unreachable));
    let executor = PlanExecutor::new(service.clone());

    let report = executor.execute(&three_step_plan()).await;

    assert!(matches!(report.outcome, RunOutcome::Aborted { index: 0, .. }));
    assert!(report.settled.is_empty());
    assert_eq!(service.calls().len(), 2);
}

#[tokio::test]
async fn test_retry_starts_over_from_the_first_action() {
    let service = Arc::new(
        RecordingService::default().reply("schedule_meeting", Reply::Body("<html>oops</html>")),
    );
    let executor = PlanExecutor::new(service.clone());
    let plan = three_step_plan();

    executor.execute(&plan).await;
    let report = executor.execute(&plan).await;

    assert!(matches!(report.outcome, RunOutcome::Aborted { index: 2, .. }));
    let calls = service.calls();
    assert_eq!(calls.len(), 12);
    assert_eq!(calls[6], "request:send_email");
}

#[tokio::test]
async fn test_completed_run_produces_cards_then_completion() {
    let service = Arc::new(RecordingService::default());
    let executor = PlanExecutor::new(service);
    let plan = ActionPlan::new(vec![Action::new(
        "send_email",
        ParameterBag::new()
            .with("recipient", ParamValue::scalar("Alice"))
            .with("subject", ParamValue::scalar("Launch")),
    )]);

    let events = executor.execute(&plan).await.events();

    match &events[0] {
        ConsoleEvent::ActionSettled { outcome, .. } => assert_eq!(
            outcome.card(),
            Some(&ResultCard::EmailSuccess {
                recipient: "Alice".to_string(),
                subject: "Launch".to_string(),
            })
        ),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(events[1], ConsoleEvent::ExecutionCompleted);
}

#[tokio::test]
async fn test_progress_streams_settled_actions() {
    let service = Arc::new(
        RecordingService::default()
            .reply("schedule_meeting", Reply::Body(r#"{"status":"error","detail":"room taken"}"#)),
    );
    let executor = PlanExecutor::new(service.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let plan = three_step_plan();

    let (report, seen) = tokio::join!(executor.execute_with_progress(&plan, tx), async {
        let mut seen = Vec::new();
        while let Some(settled) = rx.recv().await {
            seen.push(settled);
        }
        seen
    });

    // the channel closes with the run; only successful actions are reported
    assert!(matches!(report.outcome, RunOutcome::Aborted { index: 2, .. }));
    assert_eq!(seen, report.settled);
    assert_eq!(seen.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1]);
}
