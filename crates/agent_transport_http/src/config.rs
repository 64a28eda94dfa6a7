use std::collections::BTreeMap;
use std::time::Duration;

use crate::url::DEFAULT_CHAT_BASE_URL;

/// Transport configuration for chat endpoint requests.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL of the chat backend; normalized to `/api/chat` per request.
    pub base_url: String,
    /// Whether committed conversation history is forwarded with each message.
    /// Off by default: the observed backend keeps its own session state.
    pub send_history: bool,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            send_history: false,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
        }
    }
}

impl HttpTransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_send_history(mut self, send_history: bool) -> Self {
        self.send_history = send_history;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.extra_headers.extend(headers);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::HttpTransportConfig;
    use crate::url::DEFAULT_CHAT_BASE_URL;

    #[test]
    fn default_config_targets_local_backend_without_history() {
        let config = HttpTransportConfig::default();

        assert_eq!(config.base_url, DEFAULT_CHAT_BASE_URL);
        assert!(!config.send_history);
        assert!(config.user_agent.is_none());
        assert!(config.extra_headers.is_empty());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn builder_methods_layer_over_defaults() {
        let config = HttpTransportConfig::new()
            .with_base_url("https://autoquery.example")
            .with_send_history(true)
            .with_user_agent("autoquery-console/0.1")
            .with_timeout(Duration::from_secs(30))
            .insert_header("x-deployment", "staging");

        assert_eq!(config.base_url, "https://autoquery.example");
        assert!(config.send_history);
        assert_eq!(config.user_agent.as_deref(), Some("autoquery-console/0.1"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            config.extra_headers.get("x-deployment").map(String::as_str),
            Some("staging")
        );
    }
}
