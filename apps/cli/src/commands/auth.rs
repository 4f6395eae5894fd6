//! Registration and identity commands.

use super::Context;
use crate::output;
use anyhow::Result;
use botspace_api_client::{Identity, RegisterRequest, RegisterResponse};
use botspace_config_and_utils::BotState;
use tracing::info;

/// Register a bot with a join code and save its credentials.
pub async fn register(ctx: &Context, join_code: &str, name: &str, capabilities: &str) -> Result<()> {
    let client = ctx.anonymous_client()?;
    let resp = client
        .register(&RegisterRequest {
            join_code: join_code.to_string(),
            name: name.to_string(),
            capabilities: capabilities.to_string(),
        })
        .await?;

    let state = registered_state(ctx.local_state(), &resp, ctx.api_url());
    state.save(&ctx.state_file)?;
    info!(bot_id = %resp.bot.id, space_id = %resp.bot_space.id, "Registered bot");

    if ctx.format.is_json() {
        return output::print_json(&resp);
    }

    let bot_name = if resp.bot.name.is_empty() {
        name
    } else {
        resp.bot.name.as_str()
    };
    let space_name = if resp.bot_space.name.is_empty() {
        "unknown-space"
    } else {
        resp.bot_space.name.as_str()
    };
    println!("registered bot '{}' in space '{}'", bot_name, space_name);
    println!("state saved to {}", ctx.state_file.display());
    Ok(())
}

/// Local state after a successful registration. Unrelated keys are kept.
fn registered_state(current: &BotState, resp: &RegisterResponse, api_url: &str) -> BotState {
    BotState {
        token: Some(resp.token.clone()),
        bot_id: Some(resp.bot.id.clone()),
        bot_space_id: Some(resp.bot_space.id.clone()),
        is_manager: Some(resp.bot.is_manager),
        api_url: Some(api_url.to_string()),
        ..current.clone()
    }
}

/// Show the identity behind the current token.
pub async fn me(ctx: &Context) -> Result<()> {
    let identity = ctx.client()?.me().await?;

    if ctx.format.is_json() {
        return output::print_json(&identity);
    }

    match identity {
        Identity::Bot(bot) => println!(
            "bot id={} name={} space={} manager={}",
            bot.id, bot.name, bot.bot_space_id, bot.is_manager
        ),
        Identity::User(user) => println!("user id={} email={}", user.id, user.email),
    }
    Ok(())
}
