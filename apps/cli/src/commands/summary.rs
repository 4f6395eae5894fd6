//! Space summary commands.

use super::{Context, SpaceArgs};
use crate::output;
use anyhow::Result;

pub async fn summary_get(ctx: &Context, space: &SpaceArgs) -> Result<()> {
    let space = ctx.space(space)?;
    let summary = space.client.get_summary(&space.id).await?;

    if ctx.format.is_json() {
        return output::print_json(&summary);
    }
    println!("{}", summary.content);
    Ok(())
}

/// Replace the summary (manager only).
pub async fn summary_set(ctx: &Context, space: &SpaceArgs, content: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let summary = space.client.set_summary(&space.id, content).await?;

    if ctx.format.is_json() {
        return output::print_json(&summary);
    }
    println!("summary updated at {}", output::or_dash(Some(&summary.updated_at)));
    Ok(())
}
