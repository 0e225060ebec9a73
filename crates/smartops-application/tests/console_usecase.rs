use async_trait::async_trait;
use serde_json::json;
use smartops_application::ConsoleUseCase;
use smartops_core::console::{ConsoleState, NoticeLevel};
use smartops_core::conversation::ResultCard;
use smartops_core::operation::{
    AnalyzeRequest, AnalyzeResponse, ExecutionRequest, ExecutionResponse, OperationLogEntry,
    OperationService,
};
use smartops_core::plan::Action;
use smartops_core::speech::{SpeechInput, SpeechOutput};
use smartops_core::{Result, SmartOpsError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted in-memory operations service.
#[derive(Default)]
struct FakeService {
    analyze_replies: Mutex<VecDeque<Result<AnalyzeResponse>>>,
    execute_bodies: Mutex<VecDeque<&'static str>>,
    history: Mutex<Vec<OperationLogEntry>>,
    analyze_requests: Mutex<Vec<AnalyzeRequest>>,
    executed: Mutex<Vec<String>>,
    history_calls: Mutex<usize>,
    deleted: Mutex<Vec<i64>>,
    delete_started: Notify,
    delete_gate: Option<Arc<Notify>>,
    /// Holds calls for one tool until the gate opens.
    execute_started: Notify,
    execute_gate: Option<(&'static str, Arc<Notify>)>,
}

impl FakeService {
    fn analyze_reply(self, reply: Result<AnalyzeResponse>) -> Self {
        self.analyze_replies.lock().unwrap().push_back(reply);
        self
    }

    fn execute_body(self, body: &'static str) -> Self {
        self.execute_bodies.lock().unwrap().push_back(body);
        self
    }

    fn with_history(self, entries: Vec<OperationLogEntry>) -> Self {
        *self.history.lock().unwrap() = entries;
        self
    }

    fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn history_calls(&self) -> usize {
        *self.history_calls.lock().unwrap()
    }
}

#[async_trait]
impl OperationService for FakeService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        self.analyze_requests.lock().unwrap().push(request.clone());
        self.analyze_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AnalyzeResponse::default()))
    }

    async fn execute_confirmed(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        self.executed.lock().unwrap().push(request.intent.clone());
        if let Some((tool, gate)) = &self.execute_gate {
            if request.intent == *tool {
                self.execute_started.notify_one();
                gate.notified().await;
            }
        }
        let body = self
            .execute_bodies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(r#"{"status":"success"}"#);
        Ok(ExecutionResponse::from_body(body))
    }

    async fn history(&self) -> Result<Vec<OperationLogEntry>> {
        *self.history_calls.lock().unwrap() += 1;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.delete_started.notify_one();
        if let Some(gate) = &self.delete_gate {
            gate.notified().await;
        }
        self.deleted.lock().unwrap().push(id);
        Err(SmartOpsError::http(500, "store unavailable"))
    }
}

#[derive(Default)]
struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[async_trait]
impl SpeechInput for RecordingSpeech {
    async fn transcribe(&self) -> Result<String> {
        Err(SmartOpsError::speech("no microphone"))
    }
}

fn analyze_response(message: &str, actions: serde_json::Value) -> Result<AnalyzeResponse> {
    Ok(AnalyzeResponse {
        assistant_message: message.to_string(),
        actions: Some(serde_json::from_value::<Vec<Action>>(actions).unwrap()),
    })
}

fn log_entry(id: i64, response_data: serde_json::Value) -> OperationLogEntry {
    OperationLogEntry {
        id,
        intent: "send_email".to_string(),
        command: "email Alice".to_string(),
        status: Some("success".to_string()),
        response_data,
        created_at: None,
    }
}

#[tokio::test]
async fn test_scenario_email_to_alice() {
    let service = Arc::new(
        FakeService::default()
            .analyze_reply(analyze_response(
                "I will email Alice.",
                json!([{ "tool": "send_email", "parameters": { "recipient": "Alice", "subject": "Launch" } }]),
            ))
            .execute_body(r#"{"status":"success","message":"Email successfully sent to Alice"}"#),
    );
    let console = ConsoleUseCase::new(service.clone());

    console.submit_command("email Alice about launch").await.unwrap();
    assert!(console.snapshot().await.plan().is_proposed());

    let notices = console.approve_plan().await.unwrap();

    let state = console.snapshot().await;
    assert!(state.plan().is_empty());
    assert!(!state.is_busy());
    let card = state.conversation().last().and_then(|m| m.result_card.clone());
    assert_eq!(
        card,
        Some(ResultCard::EmailSuccess {
            recipient: "Alice".to_string(),
            subject: "Launch".to_string(),
        })
    );
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Success));
}

#[tokio::test]
async fn test_scenario_first_of_two_fails() {
    let service = Arc::new(
        FakeService::default()
            .analyze_reply(analyze_response(
                "Two steps.",
                json!([
                    { "tool": "notify_team", "parameters": { "team_name": "DevOps" } },
                    { "tool": "send_email", "parameters": { "recipient": "Bob" } }
                ]),
            ))
            .execute_body(r#"{"status":"error","detail":"team not found"}"#),
    );
    let console = ConsoleUseCase::new(service.clone());
    console.submit_command("notify devops then email bob").await.unwrap();
    let log_len = console.snapshot().await.conversation().len();
    let history_calls = service.history_calls();

    let notices = console.approve_plan().await.unwrap();

    assert_eq!(service.executed(), vec!["notify_team"]);
    let state = console.snapshot().await;
    assert!(state.plan().is_approved());
    assert_eq!(state.plan().plan().map(|p| p.len()), Some(2));
    assert!(!state.is_busy());
    assert_eq!(state.conversation().len(), log_len);
    assert_eq!(service.history_calls(), history_calls);
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));

    // retry starts over from the first action
    console.retry_plan().await.unwrap();
    assert_eq!(service.executed(), vec!["notify_team", "notify_team", "send_email"]);
    assert!(console.snapshot().await.plan().is_empty());
}

#[tokio::test]
async fn test_scenario_optimistic_delete() {
    let gate = Arc::new(Notify::new());
    let service = Arc::new(FakeService {
        delete_gate: Some(gate.clone()),
        ..FakeService::default()
    }
    .with_history(vec![log_entry(5, json!([])), log_entry(7, json!([]))]));
    let console = ConsoleUseCase::new(service.clone());
    console.refresh_history().await;

    let (notices, ()) = tokio::join!(console.delete_history_entry(7), async {
        service.delete_started.notified().await;
        let state = console.snapshot().await;
        assert!(state.history().find(7).is_none());
        assert!(service.deleted.lock().unwrap().is_empty());
        gate.notify_one();
    });

    // the store refused, the entry stays gone until the next refresh
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));
    assert!(console.snapshot().await.history().find(7).is_none());
    console.refresh_history().await;
    assert!(console.snapshot().await.history().find(7).is_some());
}

#[tokio::test]
async fn test_cards_reach_the_log_while_the_run_continues() {
    let gate = Arc::new(Notify::new());
    let service = Arc::new(
        FakeService {
            execute_gate: Some(("notify_team", gate.clone())),
            ..FakeService::default()
        }
        .analyze_reply(analyze_response(
            "Two steps.",
            json!([
                { "tool": "send_email", "parameters": { "recipient": "Alice", "subject": "Launch" } },
                { "tool": "notify_team", "parameters": { "team_name": "DevOps" } }
            ]),
        ))
        .execute_body(r#"{"status":"success"}"#),
    );
    let console = ConsoleUseCase::new(service.clone());
    console.submit_command("email alice then notify devops").await.unwrap();
    let before = console.snapshot().await.conversation().len();

    let (result, ()) = tokio::join!(console.approve_plan(), async {
        service.execute_started.notified().await;
        // the second call is held; the first card must already be visible
        let card = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            loop {
                let state = console.snapshot().await;
                if let Some(card) = state.conversation().last().and_then(|m| m.result_card.clone()) {
                    assert_eq!(state.conversation().len(), before + 1);
                    assert!(state.is_busy());
                    break card;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("first card not applied while the run was still going");
        assert_eq!(
            card,
            ResultCard::EmailSuccess {
                recipient: "Alice".to_string(),
                subject: "Launch".to_string(),
            }
        );
        gate.notify_one();
    });

    result.unwrap();
    let state = console.snapshot().await;
    assert_eq!(state.conversation().len(), before + 2);
    assert!(state.plan().is_empty());
}

#[tokio::test]
async fn test_full_success_refetches_history() {
    let service = Arc::new(FakeService::default().analyze_reply(analyze_response(
        "Notifying.",
        json!([{ "tool": "notify_team", "parameters": { "team_name": "DevOps" } }]),
    )));
    let console = ConsoleUseCase::new(service.clone());
    console.submit_command("notify devops").await.unwrap();
    let before = service.history_calls();

    console.approve_plan().await.unwrap();

    assert_eq!(service.history_calls(), before + 1);
}

#[tokio::test]
async fn test_analyze_failure_keeps_previous_state() {
    let service = Arc::new(
        FakeService::default().analyze_reply(Err(SmartOpsError::transport("connection refused"))),
    );
    let console = ConsoleUseCase::new(service.clone())
        .with_state(ConsoleState::with_greeting("SmartOps online."));

    let notices = console.submit_command("email Alice").await.unwrap();

    let state = console.snapshot().await;
    assert_eq!(state.conversation().len(), 1);
    assert!(state.plan().is_empty());
    assert!(!state.is_busy());
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(service.history_calls(), 0);
}

#[tokio::test]
async fn test_edits_reach_the_execution_request() {
    let service = Arc::new(FakeService::default().analyze_reply(analyze_response(
        "Meeting drafted.",
        json!([{
            "tool": "schedule_meeting",
            "parameters": { "title": "Sync", "attendees": ["a@example.com"], "start_time": "2026-03-02T10:00:00" }
        }]),
    )));
    let console = ConsoleUseCase::new(service.clone());
    console.submit_command("set up a sync").await.unwrap();

    console
        .edit_parameter(0, "attendees", " a@example.com,b@example.com ", false)
        .await
        .unwrap();
    let err = console.edit_parameter(3, "title", "x", false).await.unwrap_err();
    assert!(err.is_plan_edit());

    let state = console.snapshot().await;
    let attendees = state.plan().plan().unwrap().get(0).unwrap().parameters.get("attendees").cloned();
    assert_eq!(
        attendees.and_then(|v| v.as_list().map(<[String]>::to_vec)),
        Some(vec!["a@example.com".to_string(), "b@example.com".to_string()])
    );
}

#[tokio::test]
async fn test_history_sent_with_analyze_is_sanitized_and_limited() {
    let service = Arc::new(FakeService::default());
    let console = ConsoleUseCase::new(service.clone()).with_history_limit(2);

    for command in ["one", "two", "three", "four"] {
        console.submit_command(command).await.unwrap();
    }

    // the fake answers with empty assistant messages, which are dropped
    let requests = service.analyze_requests.lock().unwrap().clone();
    assert!(requests[0].history.is_empty());
    let last: Vec<_> = requests[3]
        .history
        .iter()
        .map(|m| (m.role.as_str(), m.content.as_str()))
        .collect();
    assert_eq!(last, vec![("user", "two"), ("user", "three")]);
}

#[tokio::test]
async fn test_reload_for_edit() {
    let stored = json!([{ "tool": "send_email", "parameters": { "recipient": "Alice" } }]);
    let service = Arc::new(FakeService::default().with_history(vec![
        log_entry(1, serde_json::Value::String(stored.to_string())),
        log_entry(2, serde_json::Value::String("{broken".to_string())),
    ]));
    let console = ConsoleUseCase::new(service);
    console.refresh_history().await;

    let notices = console.load_for_edit(2).await.unwrap();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(console.snapshot().await.plan().is_empty());

    console.load_for_edit(1).await.unwrap();
    assert!(console.snapshot().await.plan().is_proposed());

    assert!(console.load_for_edit(42).await.is_err());
}

#[tokio::test]
async fn test_voice_reads_announcements_and_degrades_silently() {
    let speech = Arc::new(RecordingSpeech::default());
    let service = Arc::new(FakeService::default().analyze_reply(Ok(AnalyzeResponse {
        assistant_message: "Standing by.".to_string(),
        actions: None,
    })));
    let console = ConsoleUseCase::new(service).with_speech(speech.clone(), speech.clone());

    console.submit_command("status?").await.unwrap();
    assert!(speech.spoken.lock().unwrap().is_empty());

    console.toggle_voice().await.unwrap();
    console.submit_command("status?").await.unwrap();

    assert_eq!(
        speech.spoken.lock().unwrap().clone(),
        vec!["Vocal system active.", "Analyzing request."]
    );
    assert_eq!(console.listen().await, None);
}
