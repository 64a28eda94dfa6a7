use reqwest::StatusCode;
use serde::Deserialize;

/// Error-body envelope. The observed backends disagree on the `error` field's
/// shape, so both a bare string and an object with a `message` are accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorField>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorField {
    Text(String),
    Detail { message: Option<String> },
}

impl ErrorField {
    fn message(&self) -> Option<&str> {
        match self {
            Self::Text(text) => non_empty_string(text),
            Self::Detail { message } => message.as_deref().and_then(non_empty_string),
        }
    }
}

/// Extracts the user-facing message for a non-success response.
///
/// Fallback order: the body's `error` field, the trimmed raw body, then the
/// status line.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = parsed.value.as_ref().and_then(ErrorField::message) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status_line(status)
}

pub(crate) fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("request failed with status {} {reason}", status.as_u16()),
        None => format!("request failed with status {}", status.as_u16()),
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
