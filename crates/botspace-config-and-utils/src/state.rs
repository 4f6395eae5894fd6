//! Local bot state persisted between invocations.
//!
//! The state file is written by `register` and read by every other command to
//! find the token, space id, and API URL. Writes go through a temporary file
//! followed by a rename so a crash never leaves a truncated file behind.

use crate::{AccountCredentials, CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Contents of the local state file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_manager: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Keys this client does not know about, preserved on save.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BotState {
    /// Load state from `path`. A missing file is an empty state.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No state file, starting empty");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::State(format!("failed to read file '{}': {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            CoreError::State(format!("invalid JSON in '{}': {}", path.display(), e))
        })?;
        if !value.is_object() {
            return Err(CoreError::State(format!(
                "state file '{}' must contain a JSON object",
                path.display()
            )));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Save state to `path` atomically with owner-only permissions.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Round-trip through Value so keys come out sorted.
        let payload = serde_json::to_string_pretty(&serde_json::to_value(self)?)? + "\n";

        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        let write = || -> std::io::Result<()> {
            std::fs::write(&tmp_path, payload.as_bytes())?;
            std::fs::rename(&tmp_path, path)?;
            restrict_permissions(path)
        };
        write().map_err(|e| {
            CoreError::State(format!(
                "failed to write state file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!(path = %path.display(), "State saved");
        Ok(())
    }

    /// Overlay non-empty account credentials on top of this state.
    pub fn merge_account(&mut self, account: &AccountCredentials) {
        fn overlay(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
                *slot = Some(v.clone());
            }
        }

        overlay(&mut self.token, &account.token);
        overlay(&mut self.api_url, &account.api_url);
        overlay(&mut self.bot_space_id, &account.bot_space_id);
        overlay(&mut self.bot_id, &account.bot_id);
        overlay(&mut self.bot_name, &account.bot_name);
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
