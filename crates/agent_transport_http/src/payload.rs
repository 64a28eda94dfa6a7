use serde::{Deserialize, Serialize};

use agent_transport::{AgentReply, ExchangeRequest};

/// Canonical request payload shape for the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ChatHistoryEntry>>,
}

/// One forwarded history entry on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ChatHistoryEntry {
    pub sender: String,
    pub message: String,
}

impl ChatRequest {
    /// Builds the wire payload for one exchange. The history snapshot is
    /// serialized only when the deployment forwards history; otherwise the
    /// field is omitted entirely.
    #[must_use]
    pub fn from_exchange(request: &ExchangeRequest, send_history: bool) -> Self {
        let history = send_history.then(|| {
            request
                .history
                .iter()
                .map(|entry| ChatHistoryEntry {
                    sender: entry.sender.label().to_string(),
                    message: entry.message.clone(),
                })
                .collect()
        });

        Self {
            message: request.message.clone(),
            history,
        }
    }
}

/// Lenient success-body shape covering the observed backend versions: a bare
/// `response`, or `final_response` plus a `status` trace, or an `agent_steps`
/// list as the trace channel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReplyBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub final_response: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub agent_steps: Option<Vec<String>>,
}

impl ChatReplyBody {
    /// Collapses whichever fields are present into one normalized reply.
    ///
    /// `final_response` wins over `response`; a body with neither normalizes
    /// to empty text (the session substitutes its placeholder). `status` wins
    /// over `agent_steps` as the trace channel; steps join with newlines.
    #[must_use]
    pub fn into_reply(self) -> AgentReply {
        let text = self.final_response.or(self.response).unwrap_or_default();
        let trace = self
            .status
            .and_then(non_empty_trimmed)
            .or_else(|| self.agent_steps.and_then(|steps| non_empty_trimmed(steps.join("\n"))));

        AgentReply { text, trace }
    }
}

fn non_empty_trimmed(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
