use std::sync::Arc;
use std::time::Duration;

use agent_transport::AgentTransport;
use agent_transport_http::{HttpTransport, HttpTransportConfig, HTTP_TRANSPORT_ID};
use agent_transport_mock::{MockTransport, MOCK_TRANSPORT_ID};

pub const DEFAULT_TRANSPORT_ID: &str = MOCK_TRANSPORT_ID;
pub const TRANSPORT_ENV_VAR: &str = "AUTOQUERY_TRANSPORT";
pub const CHAT_URL_ENV_VAR: &str = "AUTOQUERY_CHAT_URL";
pub const HTTP_TIMEOUT_ENV_VAR: &str = "AUTOQUERY_HTTP_TIMEOUT_SECS";
pub const SEND_HISTORY_ENV_VAR: &str = "AUTOQUERY_SEND_HISTORY";

pub fn transport_from_env() -> Result<Arc<dyn AgentTransport>, String> {
    let transport_id = std::env::var(TRANSPORT_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    transport_for_id(transport_id.as_deref().unwrap_or(DEFAULT_TRANSPORT_ID))
}

pub fn transport_for_id(transport_id: &str) -> Result<Arc<dyn AgentTransport>, String> {
    match transport_id {
        MOCK_TRANSPORT_ID => Ok(Arc::new(MockTransport::default())),
        HTTP_TRANSPORT_ID => {
            let config = http_config_from_env()?;
            let transport = HttpTransport::new(config).map_err(|error| error.to_string())?;
            Ok(Arc::new(transport))
        }
        unknown => Err(format!(
            "Unsupported transport '{unknown}'. Available transports: {MOCK_TRANSPORT_ID}, {HTTP_TRANSPORT_ID}"
        )),
    }
}

fn http_config_from_env() -> Result<HttpTransportConfig, String> {
    let mut config = HttpTransportConfig::new();

    if let Some(base_url) = non_empty_env(CHAT_URL_ENV_VAR) {
        config = config.with_base_url(base_url);
    }

    if let Some(raw) = non_empty_env(HTTP_TIMEOUT_ENV_VAR) {
        let seconds: u64 = raw.parse().map_err(|_| {
            format!("{HTTP_TIMEOUT_ENV_VAR} must be a whole number of seconds, got '{raw}'")
        })?;
        if seconds == 0 {
            return Err(format!("{HTTP_TIMEOUT_ENV_VAR} must be > 0"));
        }
        config = config.with_timeout(Duration::from_secs(seconds));
    }

    if let Some(raw) = non_empty_env(SEND_HISTORY_ENV_VAR) {
        config = config.with_send_history(parse_flag(SEND_HISTORY_ENV_VAR, &raw)?);
    }

    Ok(config)
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(format!("{name} must be a boolean flag, got '{other}'")),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
