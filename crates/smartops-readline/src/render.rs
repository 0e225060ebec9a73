//! Terminal rendering of console state.

use colored::Colorize;
use smartops_core::console::{Notice, NoticeLevel};
use smartops_core::conversation::{Message, MessageRole, ResultCard};
use smartops_core::operation::OperationLogEntry;
use smartops_core::plan::{ActionPlan, PlanState, PreflightFinding};
use smartops_execution::tracing_layer::DispatchEvent;

use crate::command::COMMANDS;

pub fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{}", format!("> {}", message.content).green()),
        MessageRole::Assistant => {
            if message.result_card.is_none() {
                for line in message.content.lines() {
                    println!("{}", line.bright_blue());
                }
            }
        }
    }
    if let Some(card) = &message.result_card {
        print_card(card);
    }
}

pub fn print_card(card: &ResultCard) {
    match card {
        ResultCard::MeetingSuccess { details, join_link } => {
            println!("{}", "┌ MEETING CONFIRMED".bright_green().bold());
            println!("{} {}", "│".bright_green(), details.white().bold());
            match join_link {
                Some(link) => println!("{} join: {}", "└".bright_green(), link.underline()),
                None => println!("{}", "└".bright_green()),
            }
        }
        ResultCard::EmailSuccess { recipient, subject } => {
            println!("{}", "┌ EMAIL DISPATCHED".bright_green().bold());
            println!("{} to:      {}", "│".bright_green(), recipient.white());
            println!("{} subject: {}", "└".bright_green(), subject.white());
        }
        ResultCard::Scheduled {
            operation_type,
            execution_time,
            target,
        } => {
            println!("{}", "┌ OPERATION SCHEDULED".bright_yellow().bold());
            println!("{} {}", "│".bright_yellow(), operation_type.white().bold());
            println!("{} at:  {}", "│".bright_yellow(), execution_time.white());
            println!("{} for: {}", "└".bright_yellow(), target.white());
        }
    }
}

pub fn print_notice(notice: &Notice) {
    let text = format!("[{}] {}", level_label(notice.level), notice.text);
    match notice.level {
        NoticeLevel::Info => println!("{}", text.bright_black()),
        NoticeLevel::Success => println!("{}", text.bright_green()),
        NoticeLevel::Warning => println!("{}", text.yellow()),
        NoticeLevel::Error => eprintln!("{}", text.red()),
    }
}

fn level_label(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    }
}

pub fn print_plan(state: &PlanState, findings: &[PreflightFinding]) {
    let Some(plan) = state.plan() else {
        println!("{}", "No plan proposed.".bright_black());
        return;
    };

    let header = if state.is_approved() {
        "Plan (approved, locked; /retry or /cancel):"
    } else {
        "Proposed plan (human approval required):"
    };
    println!("{}", header.bright_yellow());
    print_actions(plan, findings);
    if state.is_proposed() {
        println!(
            "{}",
            "Edit with /set or /setn, then /approve or /cancel.".bright_black()
        );
    }
}

fn print_actions(plan: &ActionPlan, findings: &[PreflightFinding]) {
    for (index, action) in plan.iter().enumerate() {
        println!("  {}", format!("{}. {}", index + 1, action.tool).yellow().bold());
        for (key, value) in action.parameters.fields() {
            println!("     {key}: {}", value.display_text());
        }
        if let Some(nested) = action.parameters.nested() {
            for (key, value) in nested {
                println!("     {} {key}: {}", "·".bright_black(), value.display_text());
            }
        }
        for finding in findings.iter().filter(|f| f.action_index == index) {
            println!("     {}", format!("! {}", finding.message).bright_red());
        }
    }
}

pub fn print_history(entries: &[OperationLogEntry]) {
    if entries.is_empty() {
        println!("{}", "Operation log is empty.".bright_black());
        return;
    }
    println!("{}", "Operation logs:".bright_magenta());
    for entry in entries {
        println!(
            "  {} {} {} {}",
            format!("#{}", entry.id).bright_black(),
            entry.intent.to_uppercase().bright_blue(),
            entry.status.as_deref().unwrap_or("-").bright_black(),
            format!("\"{}\"", entry.command).italic()
        );
    }
}

pub fn print_dispatch_event(event: &DispatchEvent) {
    let Some(tool) = event.span_field("tool").and_then(|v| v.as_str()) else {
        return;
    };
    let line = format!("  ⋯ {tool}: {}", event.message);
    if event.level == "WARN" || event.level == "ERROR" {
        println!("{}", line.red());
    } else {
        println!("{}", line.bright_black());
    }
}

pub fn print_help() {
    println!("{}", "Type a mission command, or:".bright_black());
    for (name, description) in COMMANDS {
        println!("  {} {}", format!("{name:<9}").bright_cyan(), description.bright_black());
    }
    println!("  {} {}", format!("{:<9}", "quit").bright_cyan(), "leave".bright_black());
}
