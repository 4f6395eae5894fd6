//! # Observability
//!
//! Centralized logging setup for the Botspace client.
//!
//! Binaries call `observability::init_with_config` once at
//! startup and use standard `tracing` macros everywhere else. They have no
//! knowledge of where log lines end up.
//!
//! Two sinks are available:
//!
//! - a compact human-readable layer on stderr, for interactive use
//! - an append-only JSONL file, one object per event, for long-running
//!   follow sessions whose diagnostics should be kept
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "cli".into(),
//!         default_level: "warn".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::warn!("fetch failed, retrying");
//! }
//! ```

mod file;
mod json_layer;

use std::path::PathBuf;

pub use json_layer::LogEntry;

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "cli").
    /// Included in every JSONL line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional JSONL log file. No file is written when unset.
    pub log_path: Option<PathBuf>,

    /// Emit logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: true,
        }
    }
}

/// Initialize the observability layer with custom configuration.
///
/// Calling this more than once keeps the first subscriber.
pub fn init_with_config(config: LogConfig) {
    file::init_subscriber(&config);
}
