//! Conversation core for the AutoQuery chat client.
//!
//! Invariant: the transcript is append-only, and the session phase is the
//! serialization gate that keeps at most one exchange in flight per
//! conversation.
//!
//! # Public API Overview
//! - Hold the ordered conversation in a [`Transcript`] of append-only
//!   [`Turn`]s.
//! - Decompose raw agent replies into typed [`Segment`]s with [`decompose`]
//!   (prose, status/trace preamble, fenced code).
//! - Drive one send/receive cycle at a time through [`ChatSession`], or let
//!   [`ChatSessionController`] run the transport call on a worker thread.
//! - Render from the derived [`UiState`] projection instead of hand-kept
//!   flags.
//!
//! Transports implement [`transport::AgentTransport`]; the core only consumes
//! that contract and never performs I/O itself.

pub mod controller;
pub mod error;
pub mod segment;
pub mod session;
pub mod transcript;
pub mod transport;
pub mod ui;

pub use crate::controller::ChatSessionController;
pub use crate::error::{SessionError, TranscriptError};
pub use crate::segment::{decompose, decompose_with_markers, Segment, TraceMarkers};
pub use crate::session::{
    ChatSession, SessionConfig, SessionPhase, DEFAULT_WELCOME_MESSAGE, EMPTY_REPLY_PLACEHOLDER,
};
pub use crate::transcript::{Sender, Transcript, Turn};
pub use crate::ui::UiState;
