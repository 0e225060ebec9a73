//! Parsing of REPL input lines.

use std::fmt;

/// Slash commands, for completion and `/help`.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/plan", "show the proposed plan and preflight findings"),
    ("/set", "<n> <key> <value>  edit a parameter of action n"),
    ("/setn", "<n> <key> <value>  edit a nested parameter of action n"),
    ("/approve", "approve and execute the plan"),
    ("/retry", "re-run a plan whose last run failed"),
    ("/cancel", "discard the plan"),
    ("/history", "refresh and list the operation log"),
    ("/edit", "<id>  reload a logged operation as a new plan"),
    ("/delete", "<id>  delete a logged operation"),
    ("/voice", "toggle voice output"),
    ("/listen", "dictate the next command"),
    ("/help", "show this help"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Analyze(String),
    ShowPlan,
    /// Action numbers are 1-based on screen, 0-based here.
    Set {
        index: usize,
        key: String,
        value: String,
        nested: bool,
    },
    Approve,
    Retry,
    Cancel,
    History,
    Edit(i64),
    Delete(i64),
    Voice,
    Listen,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn usage(text: &str) -> ParseError {
    ParseError(format!("usage: {text}"))
}

fn parse_id(arg: &str, command: &str) -> Result<i64, ParseError> {
    arg.trim()
        .parse()
        .map_err(|_| usage(&format!("{command} <id>")))
}

fn parse_set(rest: &str, nested: bool) -> Result<ReplCommand, ParseError> {
    let command = if nested { "/setn" } else { "/set" };
    let mut parts = rest.trim_start().splitn(3, char::is_whitespace);
    let number = parts.next().and_then(|raw| raw.parse::<usize>().ok());
    let key = parts.next().filter(|key| !key.is_empty());
    let value = parts.next().map(str::trim_start).unwrap_or("");

    match (number, key) {
        (Some(number), Some(key)) if number > 0 => Ok(ReplCommand::Set {
            index: number - 1,
            key: key.to_string(),
            value: value.to_string(),
            nested,
        }),
        _ => Err(usage(&format!("{command} <n> <key> <value>"))),
    }
}

/// Parses one trimmed, non-empty line. Anything not starting with `/` is a
/// command for the NLU service.
pub fn parse(line: &str) -> Result<ReplCommand, ParseError> {
    let line = line.trim();
    if line == "quit" || line == "exit" {
        return Ok(ReplCommand::Quit);
    }
    if !line.starts_with('/') {
        return Ok(ReplCommand::Analyze(line.to_string()));
    }

    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match head {
        "/plan" => Ok(ReplCommand::ShowPlan),
        "/set" => parse_set(rest, false),
        "/setn" => parse_set(rest, true),
        "/approve" => Ok(ReplCommand::Approve),
        "/retry" => Ok(ReplCommand::Retry),
        "/cancel" => Ok(ReplCommand::Cancel),
        "/history" => Ok(ReplCommand::History),
        "/edit" => parse_id(rest, "/edit").map(ReplCommand::Edit),
        "/delete" => parse_id(rest, "/delete").map(ReplCommand::Delete),
        "/voice" => Ok(ReplCommand::Voice),
        "/listen" => Ok(ReplCommand::Listen),
        "/help" => Ok(ReplCommand::Help),
        other => Err(ParseError(format!("unknown command {other}; try /help"))),
    }
}
