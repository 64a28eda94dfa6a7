//! Append-only conversation transcript.
//!
//! Turns are never edited or removed once committed. A failed exchange leaves
//! the already-committed user turn in place so the user can judge whether to
//! resend.

use time::OffsetDateTime;

use crate::error::TranscriptError;
use crate::segment::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub sender: Sender,
    /// Original text as typed or received; immutable once created.
    pub raw_text: String,
    pub segments: Vec<Segment>,
    pub created_at: OffsetDateTime,
}

impl Turn {
    /// Builds a user turn. User turns always carry exactly one plain segment
    /// equal to the raw text.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        let raw_text = text.into();
        Self {
            sender: Sender::User,
            segments: vec![Segment::Plain(raw_text.clone())],
            raw_text,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Builds an agent turn from the raw reply and its decomposed segments.
    #[must_use]
    pub fn agent(raw_text: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            sender: Sender::Agent,
            raw_text: raw_text.into(),
            segments,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Ordered transcript of a single conversation. Pure data plus ordering
/// invariants; no I/O.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn to the end of the transcript.
    ///
    /// Timestamps must be non-decreasing across the transcript. The session
    /// always supplies fresh timestamps, so a regression here means the wall
    /// clock moved backwards or a caller fabricated an out-of-order turn.
    pub fn append(&mut self, turn: Turn) -> Result<(), TranscriptError> {
        if let Some(last) = self.turns.last() {
            if turn.created_at < last.created_at {
                return Err(TranscriptError::TimestampRegression {
                    last: last.created_at,
                    offered: turn.created_at,
                });
            }
        }

        self.turns.push(turn);
        Ok(())
    }

    /// Read-only view of the whole transcript in commit order.
    #[must_use]
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Most recently committed agent turn, if any.
    #[must_use]
    pub fn last_agent_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|turn| turn.sender == Sender::Agent)
    }
}
