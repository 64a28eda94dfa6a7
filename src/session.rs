//! Single-conversation send/receive state machine.
//!
//! [`ChatSession`] owns the transcript and the phase gate that serializes
//! exchanges: at most one request is in flight per conversation, and the
//! phase field itself is the serialization gate. Transport outcomes are
//! folded back in through [`ChatSession::complete_send`] and
//! [`ChatSession::fail_send`]; both ignore outcomes for exchanges that are no
//! longer current, so late callbacks against an abandoned exchange are no-ops.

use crate::error::SessionError;
use crate::segment::{decompose_with_markers, Segment, TraceMarkers};
use crate::transcript::{Sender, Transcript, Turn};
use crate::transport::{AgentReply, ExchangeId, ExchangeRequest, HistoryEntry};
use crate::ui::UiState;

/// Substituted for the reply text when the backend answers success with no
/// usable text, so every completed exchange produces a visible agent turn.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "Received an empty response.";

/// Greeting seeded by the stock console front-end.
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome to AutoQuery AI! How can I help you find vehicle data today?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Sending {
        exchange_id: ExchangeId,
        pending_text: String,
    },
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub trace_markers: TraceMarkers,
    /// Optional greeting committed as an agent turn before the first
    /// exchange. `None` starts with an empty transcript.
    pub welcome_message: Option<String>,
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trace_markers(mut self, trace_markers: TraceMarkers) -> Self {
        self.trace_markers = trace_markers;
        self
    }

    #[must_use]
    pub fn with_welcome_message(mut self, welcome_message: impl Into<String>) -> Self {
        self.welcome_message = Some(welcome_message.into());
        self
    }
}

#[derive(Debug)]
pub struct ChatSession {
    phase: SessionPhase,
    transcript: Transcript,
    trace_markers: TraceMarkers,
    next_exchange_id: ExchangeId,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        let mut transcript = Transcript::new();
        if let Some(welcome) = config.welcome_message {
            let turn = Turn::agent(welcome.clone(), vec![Segment::Plain(welcome)]);
            // Appending to an empty transcript cannot regress.
            let _ = transcript.append(turn);
        }

        Self {
            phase: SessionPhase::Idle,
            transcript,
            trace_markers: config.trace_markers,
            next_exchange_id: 1,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Derived view of the current phase and transcript.
    #[must_use]
    pub fn ui_state(&self) -> UiState {
        UiState::project(&self.phase, &self.transcript)
    }

    /// Opens an exchange for `text`.
    ///
    /// Returns `Ok(None)` without touching any state when the trimmed text is
    /// empty, and `Err(SessionError::Busy)` while another exchange is in
    /// flight. Otherwise commits the user turn, moves to `Sending`, and
    /// returns the request the transport should carry. The history snapshot
    /// in the request is taken before the user turn is appended, so it holds
    /// only the context that preceded this message.
    pub fn begin_send(&mut self, text: &str) -> Result<Option<ExchangeRequest>, SessionError> {
        if matches!(self.phase, SessionPhase::Sending { .. }) {
            return Err(SessionError::Busy);
        }

        let message = text.trim();
        if message.is_empty() {
            return Ok(None);
        }

        let history = self.history_snapshot();
        self.transcript.append(Turn::user(message))?;

        let exchange_id = self.next_exchange_id;
        self.next_exchange_id += 1;
        self.phase = SessionPhase::Sending {
            exchange_id,
            pending_text: message.to_string(),
        };

        Ok(Some(ExchangeRequest {
            exchange_id,
            message: message.to_string(),
            history,
        }))
    }

    /// Folds a successful transport reply into the transcript.
    ///
    /// Ignored unless `exchange_id` is the exchange currently in flight. A
    /// reply without usable text commits the placeholder turn instead of an
    /// empty one.
    pub fn complete_send(
        &mut self,
        exchange_id: ExchangeId,
        reply: &AgentReply,
    ) -> Result<(), SessionError> {
        if !self.is_awaiting(exchange_id) {
            return Ok(());
        }

        let turn = if reply.text.trim().is_empty() {
            Turn::agent(
                EMPTY_REPLY_PLACEHOLDER,
                vec![Segment::Plain(EMPTY_REPLY_PLACEHOLDER.to_string())],
            )
        } else {
            let mut segments = Vec::new();
            if let Some(trace) = trimmed_trace(reply) {
                segments.push(Segment::Status(trace.to_string()));
            }
            segments.extend(decompose_with_markers(&reply.text, &self.trace_markers));

            Turn::agent(reply.text.clone(), segments)
        };

        self.transcript.append(turn)?;
        self.phase = SessionPhase::Succeeded;
        Ok(())
    }

    /// Folds a transport failure into the phase.
    ///
    /// Ignored unless `exchange_id` is the exchange currently in flight. No
    /// agent turn is appended; the user turn committed by
    /// [`ChatSession::begin_send`] stays in the transcript.
    pub fn fail_send(&mut self, exchange_id: ExchangeId, message: impl Into<String>) {
        if !self.is_awaiting(exchange_id) {
            return;
        }

        self.phase = SessionPhase::Failed(message.into());
    }

    fn is_awaiting(&self, exchange_id: ExchangeId) -> bool {
        matches!(
            &self.phase,
            SessionPhase::Sending { exchange_id: active, .. } if *active == exchange_id
        )
    }

    fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.transcript
            .all()
            .iter()
            .map(|turn| match turn.sender {
                Sender::User => HistoryEntry::user(turn.raw_text.clone()),
                Sender::Agent => HistoryEntry::agent(turn.raw_text.clone()),
            })
            .collect()
    }
}

fn trimmed_trace(reply: &AgentReply) -> Option<&str> {
    reply
        .trace
        .as_deref()
        .map(str::trim)
        .filter(|trace| !trace.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_exchange(session: &mut ChatSession, text: &str) -> ExchangeRequest {
        session
            .begin_send(text)
            .expect("send accepted")
            .expect("non-empty message")
    }

    #[test]
    fn begin_send_commits_user_turn_and_moves_to_sending() {
        let mut session = ChatSession::new();

        let request = open_exchange(&mut session, "  find 2023 Civic prices  ");

        assert_eq!(request.exchange_id, 1);
        assert_eq!(request.message, "find 2023 Civic prices");
        assert!(request.history.is_empty());
        assert_eq!(
            session.phase(),
            &SessionPhase::Sending {
                exchange_id: 1,
                pending_text: "find 2023 Civic prices".to_string(),
            }
        );
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(
            session.transcript().all()[0].raw_text,
            "find 2023 Civic prices"
        );
    }

    #[test]
    fn begin_send_with_blank_text_is_a_no_op() {
        let mut session = ChatSession::new();

        assert!(session.begin_send("").expect("send accepted").is_none());
        assert!(session.begin_send("   \n\t").expect("send accepted").is_none());
        assert_eq!(session.phase(), &SessionPhase::Idle);
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn begin_send_while_sending_reports_busy_without_second_turn() {
        let mut session = ChatSession::new();
        open_exchange(&mut session, "hi");

        let error = session.begin_send("hi").unwrap_err();

        assert!(matches!(error, SessionError::Busy));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn complete_send_decomposes_reply_and_succeeds() {
        let mut session = ChatSession::new();
        let request = open_exchange(&mut session, "find 2023 Civic prices");

        let reply = AgentReply::from_text("Here: ```sql\nSELECT * FROM cars\n``` done");
        session.complete_send(request.exchange_id, &reply).unwrap();

        assert_eq!(session.phase(), &SessionPhase::Succeeded);
        let agent = session.transcript().last_agent_turn().unwrap();
        assert_eq!(
            agent.segments,
            vec![
                Segment::Plain("Here: ".to_string()),
                Segment::Code {
                    language: "sql".to_string(),
                    content: "SELECT * FROM cars".to_string(),
                },
                Segment::Plain(" done".to_string()),
            ]
        );
    }

    #[test]
    fn complete_send_with_blank_reply_substitutes_placeholder() {
        let mut session = ChatSession::new();
        let request = open_exchange(&mut session, "anything there?");

        session
            .complete_send(request.exchange_id, &AgentReply::from_text(""))
            .unwrap();

        let agent = session.transcript().last_agent_turn().unwrap();
        assert_eq!(agent.raw_text, EMPTY_REPLY_PLACEHOLDER);
        assert_eq!(
            agent.segments,
            vec![Segment::Plain(EMPTY_REPLY_PLACEHOLDER.to_string())]
        );
        assert_eq!(session.phase(), &SessionPhase::Succeeded);
    }

    #[test]
    fn complete_send_prepends_out_of_band_trace_as_status() {
        let mut session = ChatSession::new();
        let request = open_exchange(&mut session, "best seller in 2018?");

        let reply = AgentReply::from_text("The Fiesta.")
            .with_trace("Tool Used: sql_query\nTool Input: SELECT ...");
        session.complete_send(request.exchange_id, &reply).unwrap();

        let agent = session.transcript().last_agent_turn().unwrap();
        assert_eq!(
            agent.segments,
            vec![
                Segment::Status("Tool Used: sql_query\nTool Input: SELECT ...".to_string()),
                Segment::Plain("The Fiesta.".to_string()),
            ]
        );
    }

    #[test]
    fn fail_send_keeps_user_turn_and_reports_message() {
        let mut session = ChatSession::new();
        let request = open_exchange(&mut session, "hi");

        session.fail_send(request.exchange_id, "upstream timeout");

        assert_eq!(
            session.phase(),
            &SessionPhase::Failed("upstream timeout".to_string())
        );
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().all()[0].raw_text, "hi");
        assert!(session.transcript().last_agent_turn().is_none());
    }

    #[test]
    fn stale_outcomes_are_ignored() {
        let mut session = ChatSession::new();
        let request = open_exchange(&mut session, "hi");
        session.fail_send(request.exchange_id, "upstream timeout");

        session
            .complete_send(request.exchange_id, &AgentReply::from_text("late reply"))
            .unwrap();
        session.fail_send(request.exchange_id, "second failure");

        assert_eq!(
            session.phase(),
            &SessionPhase::Failed("upstream timeout".to_string())
        );
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn send_is_accepted_again_after_failure() {
        let mut session = ChatSession::new();
        let first = open_exchange(&mut session, "hi");
        session.fail_send(first.exchange_id, "upstream timeout");

        let second = open_exchange(&mut session, "hi again");

        assert_eq!(second.exchange_id, 2);
        assert!(matches!(session.phase(), SessionPhase::Sending { .. }));
    }

    #[test]
    fn history_snapshot_holds_turns_before_the_pending_message() {
        let mut session = ChatSession::new();
        let first = open_exchange(&mut session, "first question");
        session
            .complete_send(first.exchange_id, &AgentReply::from_text("first answer"))
            .unwrap();

        let second = open_exchange(&mut session, "second question");

        let labels: Vec<(&str, &str)> = second
            .history
            .iter()
            .map(|entry| (entry.sender.label(), entry.message.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![("user", "first question"), ("agent", "first answer")]
        );
    }

    #[test]
    fn welcome_message_is_seeded_as_agent_turn() {
        let session = ChatSession::with_config(
            SessionConfig::new().with_welcome_message(DEFAULT_WELCOME_MESSAGE),
        );

        assert_eq!(session.phase(), &SessionPhase::Idle);
        assert_eq!(session.transcript().len(), 1);
        let welcome = session.transcript().last_agent_turn().unwrap();
        assert_eq!(welcome.raw_text, DEFAULT_WELCOME_MESSAGE);
        assert_eq!(
            welcome.segments,
            vec![Segment::Plain(DEFAULT_WELCOME_MESSAGE.to_string())]
        );
    }

    #[test]
    fn custom_trace_markers_flow_into_decomposition() {
        let markers = TraceMarkers {
            status_header: "Thought:".to_string(),
            answer_header: "Answer:".to_string(),
        };
        let mut session =
            ChatSession::with_config(SessionConfig::new().with_trace_markers(markers));
        let request = open_exchange(&mut session, "hi");

        session
            .complete_send(
                request.exchange_id,
                &AgentReply::from_text("Thought: looked it up Answer: 42"),
            )
            .unwrap();

        let agent = session.transcript().last_agent_turn().unwrap();
        assert_eq!(
            agent.segments,
            vec![
                Segment::Status("looked it up".to_string()),
                Segment::Plain("42".to_string()),
            ]
        );
    }
}
