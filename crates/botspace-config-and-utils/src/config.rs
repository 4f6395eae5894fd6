//! Configuration resolution for a single CLI invocation.

use crate::{BotState, CoreError, CoreResult};
use std::time::Duration;
use url::Url;

/// Default API URL (can be overridden at compile time via BOTSPACE_DEFAULT_API_URL env var).
pub const DEFAULT_API_URL: &str = match option_env!("BOTSPACE_DEFAULT_API_URL") {
    Some(url) => url,
    None => "http://localhost:8080/api/v1",
};

/// Default state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".botspace/state.json";

/// Default page size for message queries.
pub const DEFAULT_LIMIT: u32 = 30;

/// Default follow-mode polling interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: f64 = 5.0;

/// Per-request HTTP timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default log level for the CLI.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const ENV_API_URL: &str = "BOTSPACE_API_URL";
const ENV_TOKEN: &str = "BOTSPACE_TOKEN";

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub space_id: Option<String>,
}

/// Resolved configuration.
///
/// Precedence for each value is flag, then environment, then the merged
/// local state, then the built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL without a trailing slash.
    pub api_url: String,
    token: Option<String>,
    space_id: Option<String>,
}

impl Config {
    /// Resolve configuration from flags, the process environment, and state.
    pub fn resolve(overrides: &ConfigOverrides, state: &BotState) -> CoreResult<Self> {
        Self::resolve_with_env(overrides, state, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        overrides: &ConfigOverrides,
        state: &BotState,
        env: impl Fn(&str) -> Option<String>,
    ) -> CoreResult<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        let api_url = non_empty(overrides.api_url.clone())
            .or_else(|| non_empty(env(ENV_API_URL)))
            .or_else(|| non_empty(state.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim_end_matches('/').to_string();
        validate_api_url(&api_url)?;

        let token = non_empty(overrides.token.clone())
            .or_else(|| non_empty(env(ENV_TOKEN)))
            .or_else(|| non_empty(state.token.clone()));

        let space_id =
            non_empty(overrides.space_id.clone()).or_else(|| non_empty(state.bot_space_id.clone()));

        Ok(Self {
            api_url,
            token,
            space_id,
        })
    }

    /// The bearer token, required by every authenticated command.
    pub fn token(&self) -> CoreResult<&str> {
        self.token.as_deref().ok_or_else(|| {
            CoreError::Config(
                "missing token: pass --token, set BOTSPACE_TOKEN, or run register".to_string(),
            )
        })
    }

    /// The bot space to operate on.
    pub fn space_id(&self) -> CoreResult<&str> {
        self.space_id.as_deref().ok_or_else(|| {
            CoreError::Config(
                "missing bot space id: pass --space-id or run register first".to_string(),
            )
        })
    }
}

fn validate_api_url(raw: &str) -> CoreResult<()> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(CoreError::Config(format!(
            "unsupported API URL scheme '{}' (expected http or https)",
            other
        ))),
    }
}
