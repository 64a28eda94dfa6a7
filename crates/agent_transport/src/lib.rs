//! Minimal transport-agnostic contract for one chat exchange with a remote
//! agent.
//!
//! This crate intentionally defines only the shared request/reply/error types
//! and the seam the session core calls through. It excludes endpoint details,
//! wire payload shapes, and connection management concerns.

use thiserror::Error;

/// Identifier for one send/receive exchange within a session.
pub type ExchangeId = u64;

/// Sender tag attached to forwarded history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySender {
    User,
    Agent,
}

impl HistorySender {
    /// Returns the wire label used when history is forwarded.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

/// One prior turn forwarded for conversational context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub sender: HistorySender,
    pub message: String,
}

impl HistoryEntry {
    /// Creates a history entry for a user turn.
    #[must_use]
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            sender: HistorySender::User,
            message: message.into(),
        }
    }

    /// Creates a history entry for an agent turn.
    #[must_use]
    pub fn agent(message: impl Into<String>) -> Self {
        Self {
            sender: HistorySender::Agent,
            message: message.into(),
        }
    }
}

/// Input required to perform one exchange.
///
/// `history` always carries the committed turns preceding `message`; whether
/// it is forwarded on the wire is a transport configuration concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub exchange_id: ExchangeId,
    pub message: String,
    pub history: Vec<HistoryEntry>,
}

/// Agent reply normalized out of whichever wire shape carried it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentReply {
    /// The final textual reply designated for display.
    pub text: String,
    /// Out-of-band tool-use trace, when the agent reported one.
    pub trace: Option<String>,
}

impl AgentReply {
    /// Creates a reply carrying only final text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            trace: None,
        }
    }

    /// Attaches an out-of-band trace to the reply.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = Some(trace.into());
        self
    }
}

/// Failure reaching the agent or understanding its reply.
///
/// The `Display` string is the user-facing message a session surfaces when an
/// exchange fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("failed to reach the agent: {0}")]
    Network(String),
    /// The endpoint answered with a non-success status. `message` is already
    /// extracted from the error body (or a fallback), so `Display` carries it
    /// verbatim.
    #[error("{message}")]
    Status { code: u16, message: String },
    /// The endpoint answered with a success status but a body that could not
    /// be understood.
    #[error("agent reply was not understood: {0}")]
    MalformedReply(String),
}

impl TransportError {
    /// Returns the HTTP status code for status failures.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Immutable metadata describing a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportProfile {
    pub transport_id: String,
    pub display_name: String,
}

/// Transport interface for performing one exchange.
///
/// Implementations make exactly one best-effort attempt per call: one request,
/// then one reply or one error. Retry and queueing policies live outside this
/// contract.
pub trait AgentTransport: Send + Sync + 'static {
    /// Returns transport identity metadata.
    fn profile(&self) -> TransportProfile;

    /// Performs one exchange.
    fn send(&self, request: &ExchangeRequest) -> Result<AgentReply, TransportError>;
}
