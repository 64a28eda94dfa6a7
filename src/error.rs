use thiserror::Error;
use time::OffsetDateTime;

/// Failure raised by [`crate::transcript::Transcript`] when an append would
/// break transcript ordering. Treated as a programming error, not a condition
/// the user can recover from.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("turn timestamp {offered} is earlier than the last committed turn at {last}")]
    TimestampRegression {
        last: OffsetDateTime,
        offered: OffsetDateTime,
    },
}

/// Failure raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A send was attempted while another exchange was still in flight.
    /// Recovered locally by the caller; never becomes a transcript entry.
    #[error("a send is already in flight for this conversation")]
    Busy,

    #[error(transparent)]
    Invariant(#[from] TranscriptError),
}
