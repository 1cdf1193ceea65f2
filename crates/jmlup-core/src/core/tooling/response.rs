use serde_json::{json, Value};

use crate::core::bootstrap::find_issue;
use crate::core::config::context::CommandInfo;
use crate::{CommandStatus, ExecutionOutcome, InstallUserError};

/// Turns a failed command into an outcome, keeping the error chain under `issues`.
#[must_use]
pub fn error_outcome(err: &anyhow::Error) -> ExecutionOutcome {
    let issues: Vec<String> = err.chain().map(ToString::to_string).collect();
    if let Some(user) = err.downcast_ref::<InstallUserError>() {
        return ExecutionOutcome::user_error(user.message().to_string(), user.details().clone());
    }
    if let Some(issue) = find_issue(err) {
        let mut outcome = issue.to_outcome();
        if issues.len() > 1 {
            if let Some(map) = outcome.details.as_object_mut() {
                map.insert("issues".into(), json!(issues));
            }
        }
        return outcome;
    }
    ExecutionOutcome::failure(
        err.to_string(),
        json!({
            "reason": "internal_error",
            "error": err.to_string(),
            "issues": issues,
            "hint": "Re-run with `-v` for more detail, or open an issue if this persists.",
        }),
    )
}

#[must_use]
pub fn to_json_response(info: CommandInfo, outcome: &ExecutionOutcome) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "message": format_status_message(info, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(info: CommandInfo, message: &str) -> String {
    let prefix = format!("jmlup {}", info.name);
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
