//! Projection of one execution response onto a console outcome.

use serde_json::Value;
use smartops_core::conversation::{ResultCard, UNSPECIFIED_TARGET};
use smartops_core::console::ActionOutcome;
use smartops_core::operation::ExecutionResponse;
use smartops_core::plan::{Action, ParamValue, ToolKind};

/// The scalar, or the first list entry. `None` only for an empty list.
fn present_text(value: &ParamValue) -> Option<String> {
    match value {
        ParamValue::Scalar(text) => Some(text.clone()),
        ParamValue::List(items) => items.first().cloned(),
    }
}

fn first_text(value: &ParamValue) -> Option<String> {
    present_text(value).filter(|text| !text.trim().is_empty())
}

fn param_text(action: &Action, key: &str) -> String {
    action
        .parameters
        .get(key)
        .map(ParamValue::display_text)
        .unwrap_or_default()
}

/// Who a scheduled operation is aimed at: the nested `recipient` whenever it
/// is present (even blank), else the first nested attendee, else
/// [`UNSPECIFIED_TARGET`].
pub fn scheduled_target(action: &Action) -> String {
    let params = &action.parameters;
    params
        .get_nested("recipient")
        .and_then(present_text)
        .or_else(|| params.get_nested("attendees").and_then(present_text))
        .unwrap_or_else(|| UNSPECIFIED_TARGET.to_string())
}

fn scheduled_outcome(action: &Action) -> ActionOutcome {
    let operation_type = action
        .parameters
        .get("operation_type")
        .and_then(first_text)
        .unwrap_or_else(|| action.tool.clone());
    let execution_time = param_text(action, "execution_time");
    let target = scheduled_target(action);

    ActionOutcome::Card {
        summary: format!("{operation_type} scheduled for {execution_time} ({target})"),
        card: ResultCard::Scheduled {
            operation_type,
            execution_time,
            target,
        },
    }
}

fn email_outcome(action: &Action) -> ActionOutcome {
    let recipient = param_text(action, "recipient");
    let subject = param_text(action, "subject");
    ActionOutcome::Card {
        summary: format!("Email sent to {recipient}"),
        card: ResultCard::EmailSuccess { recipient, subject },
    }
}

fn result_text(result: Option<&Value>, keys: &[&str]) -> Option<String> {
    let result = result?;
    keys.iter()
        .find_map(|key| result.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn meeting_outcome(execution_result: Option<&Value>) -> ActionOutcome {
    let details = result_text(execution_result, &["details", "message"])
        .unwrap_or_else(|| "Meeting scheduled".to_string());
    let join_link = result_text(execution_result, &["meeting_link", "join_link"]);
    ActionOutcome::Card {
        summary: details.clone(),
        card: ResultCard::MeetingSuccess { details, join_link },
    }
}

/// Interprets `response` for `action`. First matching rule wins:
///
/// 1. status `scheduled` → [`ResultCard::Scheduled`] built from the request
/// 2. `send_email` + success → [`ResultCard::EmailSuccess`] built from the request
/// 3. `schedule_meeting` + success → [`ResultCard::MeetingSuccess`] built from
///    the service's execution result
/// 4. any other success → plain acknowledgement
/// 5. anything else → `Err(reason)`; the run must stop
pub fn interpret(action: &Action, response: &ExecutionResponse) -> Result<ActionOutcome, String> {
    match (response, action.tool_kind()) {
        (ExecutionResponse::Scheduled { .. }, _) => Ok(scheduled_outcome(action)),
        (ExecutionResponse::Success { .. }, Some(ToolKind::SendEmail)) => Ok(email_outcome(action)),
        (
            ExecutionResponse::Success {
                execution_result, ..
            },
            Some(ToolKind::ScheduleMeeting),
        ) => Ok(meeting_outcome(execution_result.as_ref())),
        (ExecutionResponse::Success { message, .. }, _) => Ok(ActionOutcome::Acknowledged {
            tool: action.tool.clone(),
            message: message
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| format!("Operation {} completed successfully.", action.tool)),
        }),
        (ExecutionResponse::Failed { status, detail }, _) => Err(format!("{status}: {detail}")),
        (ExecutionResponse::Malformed { reason }, _) => Err(reason.clone()),
    }
}
