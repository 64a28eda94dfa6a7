//! HTTP-backed implementation of the shared `agent_transport` contract.
//!
//! This crate owns request building, reply-shape normalization, and
//! error-body extraction for the chat endpoint only. Each exchange is exactly
//! one best-effort POST: no retry, no streaming, no session logic.

pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod url;

pub use client::ChatApiClient;
pub use config::HttpTransportConfig;
pub use error::parse_error_message;
pub use url::normalize_chat_url;

use agent_transport::{
    AgentReply, AgentTransport, ExchangeRequest, TransportError, TransportProfile,
};

/// Stable transport identifier used for explicit startup selection.
pub const HTTP_TRANSPORT_ID: &str = "http";

/// `AgentTransport` adapter driving [`ChatApiClient`] behind the synchronous
/// contract seam. Each call runs the async client to completion on a
/// throwaway current-thread runtime, so callers stay free of async plumbing.
#[derive(Debug)]
pub struct HttpTransport {
    client: ChatApiClient,
}

impl HttpTransport {
    /// Creates a transport for the configured chat endpoint.
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: ChatApiClient::new(config)?,
        })
    }

    /// Endpoint after base-URL normalization.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.client.normalized_endpoint()
    }
}

impl AgentTransport for HttpTransport {
    fn profile(&self) -> TransportProfile {
        TransportProfile {
            transport_id: HTTP_TRANSPORT_ID.to_string(),
            display_name: format!("AutoQuery backend at {}", self.endpoint()),
        }
    }

    fn send(&self, request: &ExchangeRequest) -> Result<AgentReply, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                TransportError::Network(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.send(request))
    }
}
