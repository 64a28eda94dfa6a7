//! Transport contract re-exports used by `autoquery_chat`.

pub use agent_transport::{
    AgentReply, AgentTransport, ExchangeId, ExchangeRequest, HistoryEntry, HistorySender,
    TransportError, TransportProfile,
};
