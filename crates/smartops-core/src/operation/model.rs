//! Wire types of the operations API.

use crate::conversation::ExchangeMessage;
use crate::plan::{Action, ActionPlan, ParameterBag};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /operations/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub command: String,
    pub history: Vec<ExchangeMessage>,
}

/// Answer of `POST /operations/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub assistant_message: String,
    /// Candidate actions; absent, `null` and `[]` all mean "nothing to do".
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
}

impl AnalyzeResponse {
    pub fn plan(&self) -> ActionPlan {
        ActionPlan::new(self.actions.clone().unwrap_or_default())
    }

    pub fn has_actions(&self) -> bool {
        self.actions.as_ref().is_some_and(|actions| !actions.is_empty())
    }
}

/// Body of `POST /operations/execute-confirmed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The action's tool identifier.
    pub intent: String,
    pub data: ParameterBag,
}

impl From<&Action> for ExecutionRequest {
    fn from(action: &Action) -> Self {
        Self {
            intent: action.tool.clone(),
            data: action.parameters.clone(),
        }
    }
}

/// Raw answer of `POST /operations/execute-confirmed`, as sent by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponseDto {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub execution_result: Option<Value>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Interpreted answer of one execution call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResponse {
    Success {
        message: Option<String>,
        execution_result: Option<Value>,
    },
    Scheduled {
        message: Option<String>,
    },
    /// The service reported a status other than success/scheduled.
    Failed { status: String, detail: String },
    /// The body could not be understood at all.
    Malformed { reason: String },
}

impl ExecutionResponse {
    /// Interprets a response body. Never fails: garbage becomes `Malformed`.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ExecutionResponseDto>(body) {
            Ok(dto) => dto.into(),
            Err(err) => Self::Malformed {
                reason: format!("unreadable execution response: {err}"),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Scheduled { .. })
    }
}

impl From<ExecutionResponseDto> for ExecutionResponse {
    fn from(dto: ExecutionResponseDto) -> Self {
        let Some(status) = dto.status else {
            return Self::Malformed {
                reason: "execution response has no status".to_string(),
            };
        };

        match status.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success {
                message: dto.message,
                execution_result: dto.execution_result,
            },
            "scheduled" => Self::Scheduled {
                message: dto.message,
            },
            _ => Self::Failed {
                detail: dto
                    .detail
                    .or(dto.message)
                    .unwrap_or_else(|| format!("service reported status '{status}'")),
                status,
            },
        }
    }
}

/// One record of the server-side audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationLogEntry {
    pub id: i64,
    #[serde(default)]
    pub intent: String,
    /// The command text as typed.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Serialized action set or result, as stored by the server.
    #[serde(default)]
    pub response_data: Value,
    #[serde(default, alias = "timestamp")]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyze_response_without_actions() {
        let response: AnalyzeResponse =
            serde_json::from_value(json!({ "assistant_message": "Which team?", "actions": null }))
                .unwrap();
        assert!(!response.has_actions());
        assert!(response.plan().is_empty());

        let response: AnalyzeResponse =
            serde_json::from_value(json!({ "assistant_message": "Hi" })).unwrap();
        assert!(response.actions.is_none());
    }

    #[test]
    fn test_execution_request_from_action() {
        let action: Action = serde_json::from_value(json!({
            "tool": "notify_team",
            "parameters": { "team_name": "DevOps", "message": "Deploy" }
        }))
        .unwrap();
        let request = ExecutionRequest::from(&action);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "intent": "notify_team",
                "data": { "team_name": "DevOps", "message": "Deploy" }
            })
        );
    }

    #[test]
    fn test_execution_response_interpretation() {
        assert_eq!(
            ExecutionResponse::from_body(r#"{"status":"scheduled","message":"queued"}"#),
            ExecutionResponse::Scheduled {
                message: Some("queued".to_string())
            }
        );
        assert!(matches!(
            ExecutionResponse::from_body(
                r#"{"status":"success","execution_result":{"meeting_link":"x"}}"#
            ),
            ExecutionResponse::Success {
                execution_result: Some(_),
                ..
            }
        ));
        assert_eq!(
            ExecutionResponse::from_body(r#"{"status":"error","detail":"SMTP down"}"#),
            ExecutionResponse::Failed {
                status: "error".to_string(),
                detail: "SMTP down".to_string()
            }
        );
        assert!(matches!(
            ExecutionResponse::from_body("<html>"),
            ExecutionResponse::Malformed { .. }
        ));
        assert!(matches!(
            ExecutionResponse::from_body(r#"{"message":"ok"}"#),
            ExecutionResponse::Malformed { .. }
        ));
    }

    #[test]
    fn test_log_entry_accepts_minimal_record() {
        let entry: OperationLogEntry = serde_json::from_value(json!({
            "id": 7,
            "command": "email Alice",
            "timestamp": "2026-02-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.id, 7);
        assert_eq!(entry.created_at.as_deref(), Some("2026-02-01T10:00:00Z"));
        assert!(entry.response_data.is_null());
    }
}
