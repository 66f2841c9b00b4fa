//! Engine configuration

use serde::Deserialize;
use std::time::Duration;

/// Decision engine configuration
///
/// `local_mode = true`, or an absent `backend_url`, selects in-process
/// evaluation; otherwise the engine talks to the remote decision point.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Remote decision-point URL (sidecar mode)
    pub backend_url: Option<String>,

    /// Force in-process evaluation even when a URL is configured
    pub local_mode: bool,

    /// Allow requests when the decision point is unreachable. Default
    /// false; fail-closed is the only recommended production setting.
    pub fail_open: bool,

    /// Verdict cache TTL in seconds
    pub cache_ttl_seconds: u64,

    /// Remote call timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            local_mode: false,
            fail_open: false,
            cache_ttl_seconds: 5,
            timeout_seconds: 2,
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Whether this configuration selects the in-process evaluator
    pub fn is_local(&self) -> bool {
        self.local_mode || self.backend_url.is_none()
    }

    /// Load overrides from the environment
    ///
    /// Recognized variables: `BACKEND_URL`, `LOCAL_MODE`, `FAIL_OPEN`,
    /// `CACHE_TTL_SECONDS`, `TIMEOUT_SECONDS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("BACKEND_URL") {
            if !url.is_empty() {
                config.backend_url = Some(url);
            }
        }
        config.local_mode = env_bool("LOCAL_MODE").unwrap_or(config.local_mode);
        config.fail_open = env_bool("FAIL_OPEN").unwrap_or(config.fail_open);
        if let Some(ttl) = env_u64("CACHE_TTL_SECONDS") {
            config.cache_ttl_seconds = ttl;
        }
        if let Some(timeout) = env_u64("TIMEOUT_SECONDS") {
            config.timeout_seconds = timeout;
        }

        config
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fail_closed_local() {
        let config = EngineConfig::default();
        assert!(config.is_local());
        assert!(!config.fail_open);
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn url_selects_remote_unless_local_forced() {
        let mut config = EngineConfig {
            backend_url: Some("http://127.0.0.1:8181/v1/decide".to_string()),
            ..Default::default()
        };
        assert!(!config.is_local());

        config.local_mode = true;
        assert!(config.is_local());
    }

    #[test]
    fn kebab_case_config_surface() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"backend-url": "http://pdp:8181", "fail-open": true, "cache-ttl-seconds": 30}"#,
        )
        .unwrap();

        assert_eq!(config.backend_url.as_deref(), Some("http://pdp:8181"));
        assert!(config.fail_open);
        assert_eq!(config.cache_ttl_seconds, 30);
        assert_eq!(config.timeout_seconds, 2);
    }
}
