//! Deterministic mock implementation of the shared `agent_transport` contract.
//!
//! This crate contains no network logic and is intended for local development
//! and contract-level integration testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use agent_transport::{
    AgentReply, AgentTransport, ExchangeRequest, TransportError, TransportProfile,
};

/// Stable transport identifier used for explicit startup selection.
pub const MOCK_TRANSPORT_ID: &str = "mock";

/// One scripted exchange outcome.
pub type ScriptedOutcome = Result<AgentReply, TransportError>;

/// Deterministic mock transport used by session tests and local console runs.
///
/// Scripted outcomes are consumed front to back; once the script is exhausted
/// every further exchange answers with [`MockTransport::showcase_reply`], so
/// an interactive session keeps working however long it runs.
#[derive(Debug)]
pub struct MockTransport {
    outcomes: Mutex<VecDeque<ScriptedOutcome>>,
    reply_delay: Option<Duration>,
}

impl MockTransport {
    const REPLY_DELAY_MS: u64 = 150;

    /// Creates a transport with no script: every exchange answers with the
    /// showcase reply, immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    /// Creates a transport that answers with `outcomes` in order.
    #[must_use]
    pub fn with_outcomes(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            reply_delay: None,
        }
    }

    /// Adds an artificial pause before each reply so interactive runs show
    /// the loading state.
    #[must_use]
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = Some(delay);
        self
    }

    /// The canned AutoQuery-flavored reply used when no script remains.
    #[must_use]
    pub fn showcase_reply() -> AgentReply {
        AgentReply::from_text(
            "Here are the three best-selling models in the dataset for 2018.\n\
             ```sql\n\
             SELECT Maker, Genmodel, \"2018\" AS units_sold\n\
             FROM sales_table\n\
             ORDER BY \"2018\" DESC\n\
             LIMIT 3;\n\
             ```\n\
             The Fiesta leads, followed by the Golf and the Focus.",
        )
        .with_trace(
            "Tool Used: sql_query\n\
             Tool Input: SELECT Maker, Genmodel, \"2018\" AS units_sold FROM sales_table \
             ORDER BY \"2018\" DESC LIMIT 3;",
        )
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new().with_reply_delay(Duration::from_millis(Self::REPLY_DELAY_MS))
    }
}

impl AgentTransport for MockTransport {
    fn profile(&self) -> TransportProfile {
        TransportProfile {
            transport_id: MOCK_TRANSPORT_ID.to_string(),
            display_name: "Mock agent (no backend)".to_string(),
        }
    }

    fn send(&self, _request: &ExchangeRequest) -> Result<AgentReply, TransportError> {
        if let Some(delay) = self.reply_delay {
            thread::sleep(delay);
        }

        let scripted = lock_unpoisoned(&self.outcomes).pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok(Self::showcase_reply()),
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
