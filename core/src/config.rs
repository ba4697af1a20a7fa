//! Executor configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Settings shared by every call made through one `RequestExecutor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Default deadline for a whole exchange, overridable per call.
    #[serde(
        rename = "timeout_ms",
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_millis"
    )]
    pub timeout: Duration,
    /// Redirects followed before giving up with a transport failure.
    pub max_redirects: u32,
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            user_agent: concat!("reqpad/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ExecutorConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

fn deserialize_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("reqpad/"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ExecutorConfig::from_json(r#"{"timeout_ms": 250}"#).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn serializes_timeout_as_millis() {
        let config = ExecutorConfig {
            timeout: Duration::from_millis(1500),
            ..ExecutorConfig::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeout_ms"], 1500);
    }
}
