use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "repair-assistant";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default endpoint of the reasoning service (start/send actions).
pub const DEFAULT_REASONING_URL: &str = "http://localhost:8787/assistant";
/// Default endpoint of the diagnostic-report service.
pub const DEFAULT_REPORT_URL: &str = "http://localhost:8787/diagnostic-report";
/// Default endpoint of the geolocation service.
pub const DEFAULT_GEOLOCATION_URL: &str = "http://localhost:8787/geolocation";

/// Upper bound on reasoning attempts per turn, whatever the configuration says.
const MAX_REASONING_ATTEMPTS: u32 = 5;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "repair_assistant=info,warn"
}

/// Runtime configuration for the assistant engine.
///
/// Defaults target a local development stack. `from_env()` layers
/// `REPAIR_ASSISTANT_*` environment variables on top of the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub reasoning_url: String,
    pub report_url: String,
    pub geolocation_url: String,
    /// Bound on a single reasoning call. On expiry the turn takes the fallback path.
    pub reasoning_timeout_secs: u64,
    /// Attempts per turn before falling back. 1 means a single attempt.
    pub reasoning_max_attempts: u32,
    /// Language hint forwarded to the reasoning service.
    pub language_hint: String,
    /// Symptom count at which the conversation moves to `recommendation`.
    pub recommendation_symptom_threshold: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            reasoning_url: DEFAULT_REASONING_URL.to_string(),
            report_url: DEFAULT_REPORT_URL.to_string(),
            geolocation_url: DEFAULT_GEOLOCATION_URL.to_string(),
            reasoning_timeout_secs: 30,
            reasoning_max_attempts: 1,
            language_hint: "fr".to_string(),
            recommendation_symptom_threshold: 3,
        }
    }
}

impl AssistantConfig {
    /// Defaults overridden by any `REPAIR_ASSISTANT_*` variable that is set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env()` but reads from an arbitrary lookup (tests, embedded hosts).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("REPAIR_ASSISTANT_REASONING_URL") {
            config.reasoning_url = url;
        }
        if let Some(url) = lookup("REPAIR_ASSISTANT_REPORT_URL") {
            config.report_url = url;
        }
        if let Some(url) = lookup("REPAIR_ASSISTANT_GEOLOCATION_URL") {
            config.geolocation_url = url;
        }
        if let Some(lang) = lookup("REPAIR_ASSISTANT_LANGUAGE") {
            config.language_hint = lang;
        }
        if let Some(raw) = lookup("REPAIR_ASSISTANT_REASONING_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.reasoning_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "Ignoring invalid reasoning timeout"),
            }
        }
        if let Some(raw) = lookup("REPAIR_ASSISTANT_REASONING_ATTEMPTS") {
            match raw.parse::<u32>() {
                Ok(n) => config.reasoning_max_attempts = n,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid reasoning attempt count"),
            }
        }

        config
    }

    /// Reasoning timeout as a `Duration`.
    pub fn reasoning_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reasoning_timeout_secs)
    }

    /// Attempts per turn, clamped to [1, 5].
    pub fn reasoning_attempts(&self) -> u32 {
        self.reasoning_max_attempts.clamp(1, MAX_REASONING_ATTEMPTS)
    }
}
