//! Outcome shaping shared by every command.

pub(crate) mod diagnostics;
pub(crate) mod outcome;
mod response;

pub use response::{error_outcome, format_status_message, to_json_response};
