//! Configuration, local state, and shared utilities for the Botspace client.

mod account;
mod config;
mod error;
mod logging;
mod paths;
mod state;

pub use account::{load_account, AccountCredentials};
pub use config::{
    Config, ConfigOverrides, DEFAULT_API_URL, DEFAULT_LIMIT, DEFAULT_LOG_LEVEL,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_STATE_FILE, REQUEST_TIMEOUT,
};
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
pub use state::BotState;
