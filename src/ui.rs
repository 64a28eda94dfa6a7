//! Derived view state for front-ends.

use crate::segment::Segment;
use crate::session::SessionPhase;
use crate::transcript::Transcript;

/// Flags and content a front-end needs to render the session.
///
/// Recomputed on demand from the phase and transcript, never stored, so the
/// flags cannot drift from the session's actual state (no `loading=false`
/// with input still disabled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub input_enabled: bool,
    pub is_loading: bool,
    pub error_text: Option<String>,
    pub last_agent_segments: Vec<Segment>,
}

impl UiState {
    #[must_use]
    pub fn project(phase: &SessionPhase, transcript: &Transcript) -> Self {
        let is_loading = matches!(phase, SessionPhase::Sending { .. });
        let error_text = match phase {
            SessionPhase::Failed(message) => Some(message.clone()),
            _ => None,
        };
        let last_agent_segments = transcript
            .last_agent_turn()
            .map(|turn| turn.segments.clone())
            .unwrap_or_default();

        Self {
            input_enabled: !is_loading,
            is_loading,
            error_text,
            last_agent_segments,
        }
    }
}
