//! Shared account file lookup.
//!
//! Agents hosted by the gateway keep their credentials in
//! `~/.openclaw/openclaw.json` under `channels.claw-swarm.accounts`. The
//! client reads that file opportunistically: anything missing or malformed
//! simply yields no overrides.

use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Credentials read from one account entry. Only non-empty strings are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountCredentials {
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub bot_space_id: Option<String>,
    pub bot_id: Option<String>,
    pub bot_name: Option<String>,
}

impl AccountCredentials {
    fn from_entry(entry: &Value) -> Self {
        let field = |key: &str| {
            entry
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self {
            token: field("token"),
            api_url: field("apiUrl"),
            bot_space_id: field("botSpaceId"),
            bot_id: field("botId"),
            bot_name: field("botName"),
        }
    }
}

/// Load credentials for `account` (or the first enabled account) from `path`.
pub fn load_account(path: &Path, account: Option<&str>) -> AccountCredentials {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Account file not readable");
            return AccountCredentials::default();
        }
    };
    let data: Value = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Account file is not valid JSON");
            return AccountCredentials::default();
        }
    };

    let Some(accounts) = data
        .get("channels")
        .and_then(|v| v.get("claw-swarm"))
        .and_then(|v| v.get("accounts"))
        .and_then(|v| v.as_object())
    else {
        return AccountCredentials::default();
    };

    let entry = match account {
        Some(name) => accounts.get(name).filter(|v| v.is_object()),
        None => accounts.values().find(|v| {
            v.is_object() && v.get("enabled").and_then(|e| e.as_bool()).unwrap_or(false)
        }),
    };

    entry
        .map(AccountCredentials::from_entry)
        .unwrap_or_default()
}
