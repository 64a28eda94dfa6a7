use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;

use agent_transport::{AgentReply, ExchangeRequest, TransportError};

use crate::config::HttpTransportConfig;
use crate::error::parse_error_message;
use crate::payload::{ChatRequest, ChatReplyBody};
use crate::url::normalize_chat_url;

/// Async reqwest client for the chat endpoint.
#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: HttpTransportConfig,
}

impl ChatApiClient {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|error| TransportError::Network(error.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        if let Some(user_agent) = self.config.user_agent.as_deref() {
            headers.insert(
                USER_AGENT,
                HeaderValue::from_str(user_agent).map_err(|_| {
                    TransportError::Network(format!("invalid user agent value: {user_agent}"))
                })?,
            );
        }
        for (key, value) in &self.config.extra_headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| TransportError::Network(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(value).map_err(|_| {
                    TransportError::Network(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(headers)
    }

    /// Performs one exchange: a single POST, then one normalized reply or one
    /// error. Non-success statuses carry the message extracted from the error
    /// body; a success body that is not JSON is a malformed reply.
    pub async fn send(&self, request: &ExchangeRequest) -> Result<AgentReply, TransportError> {
        let payload = ChatRequest::from_exchange(request, self.config.send_history);
        let headers = self.build_headers()?;

        let response = self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload)
            .send()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| TransportError::Network(error.to_string()))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                code: status.as_u16(),
                message: parse_error_message(status, &body),
            });
        }

        let parsed: ChatReplyBody = serde_json::from_str(&body)
            .map_err(|error| TransportError::MalformedReply(error.to_string()))?;
        Ok(parsed.into_reply())
    }
}
