//! Advisory checks shown while a plan is under review.
//!
//! Findings never block approval; the execution service remains the authority
//! on what is valid. They exist so the operator notices an obvious typo before
//! dispatching a side effect.

use super::model::{Action, ActionPlan, ToolKind};
use chrono::{DateTime, NaiveDateTime, Timelike};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Recipient domains that are always flagged.
pub const BLOCKED_DOMAINS: &[&str] = &["temporary-mail.com", "spam.org"];

/// First hour (inclusive) of the operational window.
pub const OPERATIONAL_START_HOUR: u32 = 8;
/// Last hour (exclusive) of the operational window.
pub const OPERATIONAL_END_HOUR: u32 = 18;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// One advisory finding for an action in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightFinding {
    pub action_index: usize,
    pub message: String,
}

/// Runs every check against every action.
pub fn preflight(plan: &ActionPlan) -> Vec<PreflightFinding> {
    plan.iter()
        .enumerate()
        .flat_map(|(index, action)| {
            check_action(action)
                .into_iter()
                .map(move |message| PreflightFinding {
                    action_index: index,
                    message,
                })
        })
        .collect()
}

fn check_action(action: &Action) -> Vec<String> {
    match action.tool_kind() {
        Some(ToolKind::SendEmail) => check_email(action),
        Some(ToolKind::ScheduleMeeting) | Some(ToolKind::ScheduleOperation) => {
            check_schedule(action)
        }
        _ => Vec::new(),
    }
}

fn check_email(action: &Action) -> Vec<String> {
    let recipient = action.parameters.scalar("recipient").unwrap_or_default();
    let mut findings = Vec::new();

    if !EMAIL_PATTERN.is_match(recipient) {
        findings.push(format!("Invalid email format: {recipient}"));
    }
    if BLOCKED_DOMAINS
        .iter()
        .any(|domain| recipient.to_ascii_lowercase().ends_with(domain))
    {
        findings.push("Recipient domain is in the blacklist.".to_string());
    }
    findings
}

fn scheduled_time(action: &Action) -> Option<&str> {
    let params = &action.parameters;
    params
        .scalar("start_time")
        .or_else(|| params.scalar("execution_time"))
        .or_else(|| {
            params
                .get_nested("start_time")
                .and_then(|value| value.as_scalar())
        })
        .filter(|value| !value.trim().is_empty())
}

/// Parses the ISO-8601 shapes the NLU service produces.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(with_offset.naive_local());
    }
    let naive = trimmed.trim_end_matches('Z');
    naive
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M").ok())
        .or_else(|| NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S").ok())
}

fn check_schedule(action: &Action) -> Vec<String> {
    let Some(raw) = scheduled_time(action) else {
        return vec!["Missing start_time for scheduling.".to_string()];
    };

    match parse_timestamp(raw) {
        Some(at) if at.hour() < OPERATIONAL_START_HOUR || at.hour() >= OPERATIONAL_END_HOUR => {
            vec![format!(
                "{:02}:00 is outside operational hours ({:02}:00-{:02}:00).",
                at.hour(),
                OPERATIONAL_START_HOUR,
                OPERATIONAL_END_HOUR
            )]
        }
        Some(_) => Vec::new(),
        None => vec![format!("Invalid timestamp format: {raw}")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::{FlatBag, ParamValue, ParameterBag};

    fn email(recipient: &str) -> Action {
        Action::new(
            "send_email",
            ParameterBag::new().with("recipient", ParamValue::scalar(recipient)),
        )
    }

    fn meeting_at(start: &str) -> Action {
        Action::new(
            "schedule_meeting",
            ParameterBag::new().with("start_time", ParamValue::scalar(start)),
        )
    }

    #[test]
    fn test_valid_plan_has_no_findings() {
        let plan = ActionPlan::new(vec![
            email("alice@example.com"),
            meeting_at("2026-02-01T10:00:00"),
        ]);
        assert!(preflight(&plan).is_empty());
    }

    #[test]
    fn test_email_findings() {
        let plan = ActionPlan::new(vec![email("Alice"), email("x@spam.org")]);
        let findings = preflight(&plan);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].action_index, 0);
        assert!(findings[0].message.starts_with("Invalid email format"));
        assert_eq!(findings[1].action_index, 1);
        assert!(findings[1].message.contains("blacklist"));
    }

    #[test]
    fn test_schedule_findings() {
        let plan = ActionPlan::new(vec![
            meeting_at("2026-02-01T21:00:00Z"),
            meeting_at("tomorrow morning"),
            Action::new("schedule_meeting", ParameterBag::new()),
        ]);
        let messages: Vec<_> = preflight(&plan).into_iter().map(|f| f.message).collect();
        assert_eq!(
            messages,
            vec![
                "21:00 is outside operational hours (08:00-18:00).".to_string(),
                "Invalid timestamp format: tomorrow morning".to_string(),
                "Missing start_time for scheduling.".to_string(),
            ]
        );
    }

    #[test]
    fn test_schedule_time_falls_back_to_nested_bag() {
        let mut nested = FlatBag::new();
        nested.insert("start_time".to_string(), ParamValue::scalar("2026-02-01T07:30"));
        let action = Action::new(
            "schedule_operation",
            ParameterBag::new().with_nested(nested),
        );
        let findings = preflight(&ActionPlan::new(vec![action]));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("07:00"));
    }

    #[test]
    fn test_unknown_tools_are_not_checked() {
        let plan = ActionPlan::new(vec![Action::new("notify_team", ParameterBag::new())]);
        assert!(preflight(&plan).is_empty());
    }
}
