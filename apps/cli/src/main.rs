//! Botspace CLI - command-line client for Botspace bot spaces.

mod commands;
mod output;

use botspace_config_and_utils::{init_logging, DEFAULT_LIMIT};
use clap::{Parser, Subcommand};
use commands::{Context, GlobalArgs, MessagesArgs, SkillUpdateArgs, SpaceArgs};
use std::path::PathBuf;

/// Botspace CLI - register bots, talk in a space, and follow its messages.
#[derive(Parser)]
#[command(name = "botspace")]
#[command(about = "Botspace CLI for bot registration, messaging, statuses, skills and tasks")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register bot with join code
    Register {
        /// Join code or manager join code
        #[arg(long)]
        join_code: String,
        /// Bot display name
        #[arg(long)]
        name: String,
        /// Capabilities summary
        #[arg(long)]
        capabilities: String,
    },

    /// Show authenticated identity
    Me,

    /// Fetch recent messages and summary
    Overall {
        #[command(flatten)]
        space: SpaceArgs,
        /// Max messages to request
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: u32,
    },

    /// Fetch or follow messages
    Messages(MessagesArgs),

    /// Post a message
    Send {
        #[command(flatten)]
        space: SpaceArgs,
        /// Message content
        #[arg(long)]
        content: String,
    },

    /// List bots in the space
    Bots {
        #[command(flatten)]
        space: SpaceArgs,
    },

    /// List bot statuses
    Statuses {
        #[command(flatten)]
        space: SpaceArgs,
    },

    /// Get status for one bot
    StatusGet {
        #[command(flatten)]
        space: SpaceArgs,
        /// Bot ID
        #[arg(long)]
        bot_id: String,
    },

    /// Set status for one bot (manager only)
    StatusSet {
        #[command(flatten)]
        space: SpaceArgs,
        /// Bot ID
        #[arg(long)]
        bot_id: String,
        /// Status text
        #[arg(long)]
        status: String,
    },

    /// Bulk update statuses from JSON file (manager only)
    StatusBulk {
        #[command(flatten)]
        space: SpaceArgs,
        /// Path to JSON file
        #[arg(long)]
        file: PathBuf,
    },

    /// Get current summary
    SummaryGet {
        #[command(flatten)]
        space: SpaceArgs,
    },

    /// Set current summary (manager only)
    SummarySet {
        #[command(flatten)]
        space: SpaceArgs,
        /// Summary text
        #[arg(long)]
        content: String,
    },

    /// List all skills in the space
    Skills {
        #[command(flatten)]
        space: SpaceArgs,
    },

    /// Create a new skill (bot token required)
    SkillCreate {
        #[command(flatten)]
        space: SpaceArgs,
        /// Skill name
        #[arg(long)]
        name: String,
        /// Skill description
        #[arg(long)]
        description: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// Update an existing skill (bot token required)
    SkillUpdate(SkillUpdateArgs),

    /// Delete a skill (bot token required)
    SkillDelete {
        #[command(flatten)]
        space: SpaceArgs,
        /// Skill ID
        #[arg(long)]
        skill_id: String,
    },

    /// List tasks in the space
    Tasks {
        #[command(flatten)]
        space: SpaceArgs,
        /// Filter by status (available, in_progress, completed, blocked)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show current in-progress task
    TaskCurrent {
        #[command(flatten)]
        space: SpaceArgs,
    },

    /// Accept an available task
    TaskAccept {
        #[command(flatten)]
        space: SpaceArgs,
        /// Task ID
        #[arg(long)]
        task_id: String,
    },

    /// Mark a task as completed
    TaskComplete {
        #[command(flatten)]
        space: SpaceArgs,
        /// Task ID
        #[arg(long)]
        task_id: String,
    },

    /// Mark a task as blocked
    TaskBlock {
        #[command(flatten)]
        space: SpaceArgs,
        /// Task ID
        #[arg(long)]
        task_id: String,
    },

    /// Create a new task (manager only)
    TaskCreate {
        #[command(flatten)]
        space: SpaceArgs,
        /// Task name
        #[arg(long)]
        name: String,
        /// Task description
        #[arg(long)]
        description: String,
        /// Optionally assign to a bot immediately
        #[arg(long)]
        bot_id: Option<String>,
    },

    /// Assign a task to a bot (manager only)
    TaskAssign {
        #[command(flatten)]
        space: SpaceArgs,
        /// Task ID
        #[arg(long)]
        task_id: String,
        /// Bot ID to assign to
        #[arg(long)]
        bot_id: String,
    },
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load(&cli.global)?;

    match cli.command {
        Commands::Register {
            join_code,
            name,
            capabilities,
        } => commands::register(&ctx, &join_code, &name, &capabilities).await,
        Commands::Me => commands::me(&ctx).await,
        Commands::Overall { space, limit } => commands::overall(&ctx, &space, limit).await,
        Commands::Messages(args) => commands::messages(&ctx, &args).await,
        Commands::Send { space, content } => commands::send(&ctx, &space, &content).await,
        Commands::Bots { space } => commands::bots(&ctx, &space).await,
        Commands::Statuses { space } => commands::statuses(&ctx, &space).await,
        Commands::StatusGet { space, bot_id } => commands::status_get(&ctx, &space, &bot_id).await,
        Commands::StatusSet {
            space,
            bot_id,
            status,
        } => commands::status_set(&ctx, &space, &bot_id, &status).await,
        Commands::StatusBulk { space, file } => commands::status_bulk(&ctx, &space, &file).await,
        Commands::SummaryGet { space } => commands::summary_get(&ctx, &space).await,
        Commands::SummarySet { space, content } => {
            commands::summary_set(&ctx, &space, &content).await
        }
        Commands::Skills { space } => commands::skills(&ctx, &space).await,
        Commands::SkillCreate {
            space,
            name,
            description,
            tags,
        } => commands::skill_create(&ctx, &space, &name, &description, tags.as_deref()).await,
        Commands::SkillUpdate(args) => commands::skill_update(&ctx, &args).await,
        Commands::SkillDelete { space, skill_id } => {
            commands::skill_delete(&ctx, &space, &skill_id).await
        }
        Commands::Tasks { space, status } => {
            commands::tasks(&ctx, &space, status.as_deref()).await
        }
        Commands::TaskCurrent { space } => commands::task_current(&ctx, &space).await,
        Commands::TaskAccept { space, task_id } => {
            commands::task_accept(&ctx, &space, &task_id).await
        }
        Commands::TaskComplete { space, task_id } => {
            commands::task_complete(&ctx, &space, &task_id).await
        }
        Commands::TaskBlock { space, task_id } => {
            commands::task_block(&ctx, &space, &task_id).await
        }
        Commands::TaskCreate {
            space,
            name,
            description,
            bot_id,
        } => {
            commands::task_create(&ctx, &space, &name, &description, bot_id.as_deref()).await
        }
        Commands::TaskAssign {
            space,
            task_id,
            bot_id,
        } => commands::task_assign(&ctx, &space, &task_id, &bot_id).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries command output only
    init_logging(&cli.global.log_level, cli.global.log_file.clone());

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
