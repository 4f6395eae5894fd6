//! Logging initialization for the CLI.
//!
//! Thin wrapper over the observability crate. Diagnostics always go to
//! stderr so stdout stays reserved for command output and followed messages.

use std::path::PathBuf;

const ENV_LOG_LEVEL: &str = "BOTSPACE_LOG_LEVEL";
const ENV_LOG_FILE: &str = "BOTSPACE_LOG_FILE";

/// Initialize the logging system for the CLI.
///
/// `level` is used unless `BOTSPACE_LOG_LEVEL` is set; `RUST_LOG` still wins
/// over both. When `log_file` (or `BOTSPACE_LOG_FILE`) is given, events are
/// also appended to it as JSONL.
///
/// # Example
///
/// ```ignore
/// init_logging("warn", None);
/// tracing::warn!("fetch failed, retrying");
/// ```
pub fn init_logging(level: &str, log_file: Option<PathBuf>) {
    let default_level = std::env::var(ENV_LOG_LEVEL)
        .ok()
        .and_then(non_empty_env)
        .unwrap_or_else(|| level.to_string());

    let log_path = log_file.or_else(|| {
        std::env::var(ENV_LOG_FILE)
            .ok()
            .and_then(non_empty_env)
            .map(PathBuf::from)
    });

    observability::init_with_config(observability::LogConfig {
        service_name: "cli".into(),
        default_level,
        log_path,
        also_stderr: true,
    });
}

fn non_empty_env(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
