use atty::Stream;
use color_eyre::Result;
use jmlup_core::{diag_commands, CommandGroup, CommandInfo, CommandStatus, ExecutionOutcome};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn emit_output(opts: &OutputOptions, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = passthrough_exit_code(&outcome.details).unwrap_or(outcome.status.exit_code());

    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));

    if opts.json {
        let payload = jmlup_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if outcome.status == CommandStatus::Ok {
        if opts.quiet {
            return Ok(code);
        }
        if is_passthrough(&outcome.details) {
            if !outcome.message.is_empty() {
                println!("{}", outcome.message);
            }
        } else {
            let message = jmlup_core::format_status_message(info, &outcome.message);
            println!("{}", style.status(outcome.status, &message));
            for line in stage_lines(&outcome.details) {
                println!("{}", style.dimmed(&line));
            }
            if let Some(hint) = hint_from_details(&outcome.details) {
                println!("{}", style.info(&format!("Tip: {hint}")));
            }
        }
    } else {
        let header = format!("{}  {}", error_code(info, &outcome.details), outcome.message);
        eprintln!("{}", style.status(outcome.status, &header));
        for reason in collect_why_bullets(&outcome.details, &outcome.message) {
            eprintln!("  • {reason}");
        }
        if let Some(hint) = hint_from_details(&outcome.details) {
            eprintln!("{}", style.info(&format!("Fix: {hint}")));
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn is_passthrough(details: &Value) -> bool {
    details
        .as_object()
        .and_then(|map| map.get("passthrough"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn passthrough_exit_code(details: &Value) -> Option<i32> {
    if !is_passthrough(details) {
        return None;
    }
    details
        .get("exit_code")
        .and_then(Value::as_i64)
        .and_then(|code| i32::try_from(code).ok())
}

fn stage_lines(details: &Value) -> Vec<String> {
    let Some(stages) = details.get("stages").and_then(Value::as_array) else {
        return Vec::new();
    };
    stages
        .iter()
        .filter_map(|stage| {
            let name = stage.get("stage")?.as_str()?;
            let outcome = stage.get("outcome")?.as_str()?;
            let label = match stage.get("tool").and_then(Value::as_str) {
                Some(tool) => format!("{name} ({tool})"),
                None => name.to_string(),
            };
            Some(format!("  {label:<22} {outcome}"))
        })
        .collect()
}

fn error_code<'a>(info: CommandInfo, details: &'a Value) -> &'a str {
    if let Some(code) = details.get("code").and_then(Value::as_str) {
        return code;
    }
    match info.group {
        CommandGroup::Init => diag_commands::INIT,
        CommandGroup::Status => diag_commands::STATUS,
        CommandGroup::Restore => diag_commands::RESTORE,
        CommandGroup::Args => diag_commands::ARGS,
        CommandGroup::Exec => diag_commands::EXEC,
    }
}

fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(issues) = details.get("issues").and_then(Value::as_array) {
        for entry in issues {
            if let Value::String(message) = entry {
                push_unique(&mut bullets, message.clone());
            }
        }
    }
    if let Some(error) = details.get("error").and_then(Value::as_str) {
        push_unique(&mut bullets, error.to_string());
    }
    if bullets.is_empty() {
        push_unique(&mut bullets, fallback.to_string());
    }
    bullets
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}
