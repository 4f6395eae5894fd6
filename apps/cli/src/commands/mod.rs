//! CLI command implementations.

mod auth;
mod messages;
mod skills;
mod statuses;
mod summary;
mod tasks;

pub use auth::{me, register};
pub use messages::{messages, overall, send, MessagesArgs};
pub use skills::{skill_create, skill_delete, skill_update, skills, SkillUpdateArgs};
pub use statuses::{bots, status_bulk, status_get, status_set, statuses};
pub use summary::{summary_get, summary_set};
pub use tasks::{
    task_accept, task_assign, task_block, task_complete, task_create, task_current, tasks,
};

use crate::output::OutputFormat;
use anyhow::Result;
use botspace_api_client::BotspaceClient;
use botspace_config_and_utils::{
    load_account, BotState, Config, ConfigOverrides, Paths, DEFAULT_LOG_LEVEL, DEFAULT_STATE_FILE,
    REQUEST_TIMEOUT,
};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Flags accepted by every command.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Base API URL (example: http://localhost:8080/api/v1)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path to local state JSON file
    #[arg(long, global = true, env = "BOTSPACE_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Bearer token override for this invocation
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Account name in ~/.openclaw/openclaw.json (default: first enabled)
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Append diagnostics as JSON lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Flag for commands that act on a bot space.
#[derive(Debug, Clone, Default, Args)]
pub struct SpaceArgs {
    /// Bot space ID (defaults to saved state)
    #[arg(long)]
    pub space_id: Option<String>,
}

/// Everything a command needs from flags, environment, and local files.
pub struct Context {
    pub format: OutputFormat,
    pub state_file: PathBuf,
    /// The local state file as loaded, without account overrides.
    local_state: BotState,
    /// Local state overlaid with the shared account file.
    merged_state: BotState,
    overrides: ConfigOverrides,
    config: Config,
}

/// An authenticated client bound to one bot space.
pub struct Space {
    pub client: BotspaceClient,
    pub id: String,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let local_state = BotState::load(&global.state_file)?;

        let account = match Paths::new() {
            Ok(paths) => load_account(&paths.account_file(), global.account.as_deref()),
            Err(e) => {
                debug!(error = %e, "Skipping account file");
                Default::default()
            }
        };
        let mut merged_state = local_state.clone();
        merged_state.merge_account(&account);

        let overrides = ConfigOverrides {
            api_url: global.api_url.clone(),
            token: global.token.clone(),
            space_id: None,
        };
        let config = Config::resolve(&overrides, &merged_state)?;
        debug!(api_url = %config.api_url, state_file = %global.state_file.display(), "Configuration loaded");

        Ok(Self {
            format: global.output,
            state_file: global.state_file.clone(),
            local_state,
            merged_state,
            overrides,
            config,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    pub fn local_state(&self) -> &BotState {
        &self.local_state
    }

    /// Client without credentials, for registration.
    pub fn anonymous_client(&self) -> Result<BotspaceClient> {
        Ok(BotspaceClient::new(self.api_url(), None, REQUEST_TIMEOUT)?)
    }

    /// Client carrying the resolved token.
    pub fn client(&self) -> Result<BotspaceClient> {
        let token = self.config.token()?;
        Ok(BotspaceClient::new(
            self.api_url(),
            Some(token.to_string()),
            REQUEST_TIMEOUT,
        )?)
    }

    /// Authenticated client plus the resolved space id.
    pub fn space(&self, args: &SpaceArgs) -> Result<Space> {
        let client = self.client()?;
        let overrides = ConfigOverrides {
            space_id: args.space_id.clone(),
            ..self.overrides.clone()
        };
        let config = Config::resolve(&overrides, &self.merged_state)?;
        Ok(Space {
            client,
            id: config.space_id()?.to_string(),
        })
    }
}

/// Split a comma-separated tag list, dropping blanks.
pub(crate) fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
