//! Message commands: one-shot listing, follow mode, and sending.

use super::{Context, SpaceArgs};
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use botspace_api_client::MessagePage;
use botspace_config_and_utils::{DEFAULT_LIMIT, DEFAULT_POLL_INTERVAL_SECS};
use clap::Args;
use message_feed_tailer::{
    format_message, resolve_start_cursor, Dispatcher, FeedTailer, FollowConfig, FollowOutput,
    LineSink, ShellReaction, SpaceFeed,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone, Args)]
pub struct MessagesArgs {
    #[command(flatten)]
    pub space: SpaceArgs,

    /// Max messages per request
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Cursor ID for pagination
    #[arg(long)]
    pub before: Option<String>,

    /// Fetch messages after this message ID
    #[arg(long)]
    pub since_id: Option<String>,

    /// Continuously monitor new messages
    #[arg(long)]
    pub follow: bool,

    /// Polling interval seconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    pub interval: f64,

    /// Shell command to run for each new message JSON payload
    #[arg(long)]
    pub on_message_cmd: Option<String>,

    /// Kill the reaction command after this many seconds
    #[arg(long)]
    pub on_message_timeout: Option<f64>,
}

impl MessagesArgs {
    fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            bail!("--limit must be greater than 0");
        }
        if self.follow {
            if self.before.is_some() {
                bail!("--before cannot be used with --follow");
            }
            if self.interval.is_nan() || self.interval <= 0.0 {
                bail!("--interval must be greater than 0");
            }
            if let Some(secs) = self.on_message_timeout {
                if secs.is_nan() || secs <= 0.0 {
                    bail!("--on-message-timeout must be greater than 0");
                }
            }
        } else if self.before.is_some() && self.since_id.is_some() {
            bail!("--before and --since-id cannot be used together");
        }
        Ok(())
    }
}

/// Fetch recent messages together with the space summary.
pub async fn overall(ctx: &Context, space: &SpaceArgs, limit: u32) -> Result<()> {
    let space = ctx.space(space)?;
    let resp = space.client.overall(&space.id, limit).await?;

    if ctx.format.is_json() {
        return output::print_json(&resp);
    }

    match &resp.summary {
        Some(summary) => {
            println!("summary:");
            println!("{}", summary.content);
            println!();
        }
        None => {
            println!("summary: (none)");
            println!();
        }
    }
    println!("messages:");
    print_message_batch(&resp.messages);
    Ok(())
}

/// List messages once, or follow the feed with `--follow`.
pub async fn messages(ctx: &Context, args: &MessagesArgs) -> Result<()> {
    args.validate()?;
    if args.follow {
        return follow(ctx, args).await;
    }

    let space = ctx.space(&args.space)?;
    let page = match &args.since_id {
        Some(since) => {
            space
                .client
                .messages_since(&space.id, since, args.limit)
                .await?
        }
        None => {
            space
                .client
                .list_messages(&space.id, args.limit, args.before.as_deref())
                .await?
        }
    };

    if ctx.format.is_json() {
        return output::print_json(&page);
    }
    print_message_batch(&page);
    Ok(())
}

async fn follow(ctx: &Context, args: &MessagesArgs) -> Result<()> {
    let space = ctx.space(&args.space)?;
    let config = FollowConfig::new(Duration::try_from_secs_f64(args.interval)?, args.limit)?;
    let feed = SpaceFeed::new(space.client, space.id.clone());

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received interrupt, stopping");
                cancel.cancel();
            }
        })
    };

    let cursor = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(()),
        cursor = resolve_start_cursor(&feed, args.since_id.clone()) => cursor?,
    };

    if !ctx.format.is_json() {
        match &cursor {
            Some(id) => println!("monitoring {}, starting after message {}", space.id, id),
            None => println!("monitoring {}, waiting for first message", space.id),
        }
    }

    let mut dispatcher = Dispatcher::new(Box::new(LineSink::stdout(follow_output(ctx.format))));
    if let Some(command) = &args.on_message_cmd {
        let mut reaction = ShellReaction::new(command.clone());
        if let Some(secs) = args.on_message_timeout {
            reaction = reaction.with_timeout(Duration::try_from_secs_f64(secs)?);
        }
        dispatcher = dispatcher.with_reaction(Box::new(reaction));
    }

    let mut tailer = FeedTailer::new(feed, config, dispatcher);
    let result = tailer.run(cursor, &cancel).await;
    watcher.abort();

    let last = result?;
    debug!(cursor = ?last, "Stopped following");
    Ok(())
}

fn follow_output(format: OutputFormat) -> FollowOutput {
    match format {
        OutputFormat::Text => FollowOutput::Text,
        OutputFormat::Json => FollowOutput::Json,
    }
}

/// Print a page oldest first, then its count and continuation flag.
fn print_message_batch(page: &MessagePage) {
    for line in batch_lines(page) {
        println!("{}", line);
    }
}

fn batch_lines(page: &MessagePage) -> Vec<String> {
    let mut messages: Vec<_> = page.messages.iter().collect();
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut lines: Vec<String> = messages.into_iter().map(format_message).collect();
    lines.push(format!("count={} hasMore={}", page.count(), page.has_more));
    lines
}

/// Post a message to the space.
pub async fn send(ctx: &Context, space: &SpaceArgs, content: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let message = space.client.send_message(&space.id, content).await?;

    if ctx.format.is_json() {
        return output::print_json(&message);
    }
    println!("sent message id={}", message.id);
    Ok(())
}
