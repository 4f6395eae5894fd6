//! Task board commands.

use super::{Context, SpaceArgs};
use crate::output;
use anyhow::Result;
use botspace_api_client::{Task, TaskDraft};

fn task_line(task: &Task) -> String {
    let name = if task.name.is_empty() { "unnamed" } else { task.name.as_str() };
    let status = if task.status.is_empty() { "unknown" } else { task.status.as_str() };
    let bot = task
        .bot_id
        .as_deref()
        .filter(|b| !b.is_empty())
        .unwrap_or("unassigned");
    format!("{} name={} status={} bot={}", task.id, name, status, bot)
}

/// List tasks, optionally filtered by status.
pub async fn tasks(ctx: &Context, space: &SpaceArgs, status: Option<&str>) -> Result<()> {
    let space = ctx.space(space)?;
    let tasks = space.client.list_tasks(&space.id, status).await?;

    if ctx.format.is_json() {
        return output::print_json(&tasks);
    }
    if tasks.is_empty() {
        println!("no tasks returned");
    }
    for task in &tasks {
        println!("{}", task_line(task));
    }
    Ok(())
}

/// Show the caller's in-progress task.
pub async fn task_current(ctx: &Context, space: &SpaceArgs) -> Result<()> {
    let space = ctx.space(space)?;
    let task = space.client.current_task(&space.id).await?;

    if ctx.format.is_json() {
        return output::print_json(&task);
    }
    match task {
        Some(task) => {
            println!("{}", task_line(&task));
            println!("description: {}", task.description);
        }
        None => println!("no active task"),
    }
    Ok(())
}

pub async fn task_accept(ctx: &Context, space: &SpaceArgs, task_id: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let task = space.client.accept_task(&space.id, task_id).await?;

    if ctx.format.is_json() {
        return output::print_json(&task);
    }
    println!("accepted task: {}", task.name);
    Ok(())
}

pub async fn task_complete(ctx: &Context, space: &SpaceArgs, task_id: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let task = space.client.complete_task(&space.id, task_id).await?;

    if ctx.format.is_json() {
        return output::print_json(&task);
    }
    println!("completed task: {}", task.name);
    Ok(())
}

pub async fn task_block(ctx: &Context, space: &SpaceArgs, task_id: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let task = space.client.block_task(&space.id, task_id).await?;

    if ctx.format.is_json() {
        return output::print_json(&task);
    }
    println!("blocked task: {}", task.name);
    Ok(())
}

/// Create a task (manager only), optionally assigned right away.
pub async fn task_create(
    ctx: &Context,
    space: &SpaceArgs,
    name: &str,
    description: &str,
    bot_id: Option<&str>,
) -> Result<()> {
    let space = ctx.space(space)?;
    let draft = TaskDraft {
        name: name.to_string(),
        description: description.to_string(),
        bot_id: bot_id.map(String::from),
    };
    let task = space.client.create_task(&space.id, &draft).await?;

    if ctx.format.is_json() {
        return output::print_json(&task);
    }
    println!(
        "created task id={} name={} status={}",
        task.id, task.name, task.status
    );
    Ok(())
}

/// Assign a task to a bot (manager only).
pub async fn task_assign(ctx: &Context, space: &SpaceArgs, task_id: &str, bot_id: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let task = space.client.assign_task(&space.id, task_id, bot_id).await?;

    if ctx.format.is_json() {
        return output::print_json(&task);
    }
    println!(
        "assigned task '{}' to bot {}",
        task.name,
        task.bot_id.as_deref().unwrap_or(bot_id)
    );
    Ok(())
}
