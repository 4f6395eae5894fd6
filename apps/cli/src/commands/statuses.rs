//! Bot roster and status commands.

use super::{Context, SpaceArgs};
use crate::output::{self, or_dash};
use anyhow::{bail, Context as _, Result};
use botspace_api_client::{BotStatus, StatusUpdate};
use serde_json::Value;
use std::path::Path;

/// List bots in the space.
pub async fn bots(ctx: &Context, space: &SpaceArgs) -> Result<()> {
    let space = ctx.space(space)?;
    let bots = space.client.list_bots(&space.id).await?;

    if ctx.format.is_json() {
        return output::print_json(&bots);
    }
    if bots.is_empty() {
        println!("no bots returned");
    }
    for bot in &bots {
        println!(
            "{} name={} manager={} lastSeen={}",
            bot.id,
            bot.name,
            bot.is_manager,
            or_dash(bot.last_seen_at.as_deref())
        );
    }
    Ok(())
}

fn status_line(status: &BotStatus) -> String {
    format!("{} ({}): {}", status.bot_id, status.bot_name, status.status)
}

/// List every bot's status.
pub async fn statuses(ctx: &Context, space: &SpaceArgs) -> Result<()> {
    let space = ctx.space(space)?;
    let statuses = space.client.list_statuses(&space.id).await?;

    if ctx.format.is_json() {
        return output::print_json(&statuses);
    }
    if statuses.is_empty() {
        println!("no statuses returned");
    }
    for status in &statuses {
        println!("{}", status_line(status));
    }
    Ok(())
}

pub async fn status_get(ctx: &Context, space: &SpaceArgs, bot_id: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let status = space.client.get_status(&space.id, bot_id).await?;

    if ctx.format.is_json() {
        return output::print_json(&status);
    }
    println!("{}", status_line(&status));
    Ok(())
}

/// Set one bot's status (manager only).
pub async fn status_set(ctx: &Context, space: &SpaceArgs, bot_id: &str, status: &str) -> Result<()> {
    let space = ctx.space(space)?;
    let updated = space.client.set_status(&space.id, bot_id, status).await?;

    if ctx.format.is_json() {
        return output::print_json(&updated);
    }
    println!("updated {}", status_line(&updated));
    Ok(())
}

/// Replace several statuses from a JSON file (manager only).
pub async fn status_bulk(ctx: &Context, space: &SpaceArgs, file: &Path) -> Result<()> {
    let updates = load_bulk_statuses(file)?;
    let space = ctx.space(space)?;
    let updated = space.client.bulk_set_statuses(&space.id, &updates).await?;

    if ctx.format.is_json() {
        return output::print_json(&updated);
    }
    println!("updated {} statuses", updated.len());
    Ok(())
}

/// Read a bulk status file: a JSON array, or `{"statuses": [...]}`, of
/// `{botId, status}` objects with non-empty strings.
fn load_bulk_statuses(path: &Path) -> Result<Vec<StatusUpdate>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;
    let data: Value = serde_json::from_str(&raw)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    parse_bulk_statuses(data)
}

fn parse_bulk_statuses(data: Value) -> Result<Vec<StatusUpdate>> {
    let items = match data {
        Value::Object(mut map) if map.contains_key("statuses") => {
            map.remove("statuses").unwrap_or(Value::Null)
        }
        other => other,
    };
    let Value::Array(items) = items else {
        bail!("bulk status file must be a JSON array or {{'statuses': [...]}}");
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            if !item.is_object() {
                bail!("bulk status item #{} must be an object", idx);
            }
            let field = |key: &str| {
                item.get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
            };
            let Some(bot_id) = field("botId") else {
                bail!("bulk status item #{} missing botId", idx);
            };
            let Some(status) = field("status") else {
                bail!("bulk status item #{} missing status", idx);
            };
            Ok(StatusUpdate { bot_id, status })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bulk_accepts_array_and_wrapper() {
        let expected = vec![StatusUpdate {
            bot_id: "b-1".into(),
            status: "reviewing".into(),
        }];

        let from_array =
            parse_bulk_statuses(json!([{"botId": "b-1", "status": "reviewing"}])).unwrap();
        assert_eq!(from_array, expected);

        let from_wrapper = parse_bulk_statuses(
            json!({"statuses": [{"botId": "b-1", "status": "reviewing", "extra": 1}]}),
        )
        .unwrap();
        assert_eq!(from_wrapper, expected);
    }

    #[test]
    fn test_bulk_rejects_bad_items() {
        let err = parse_bulk_statuses(json!({"items": []})).unwrap_err();
        assert!(err.to_string().starts_with("bulk status file must be"));

        let err = parse_bulk_statuses(json!(["nope"])).unwrap_err();
        assert_eq!(err.to_string(), "bulk status item #0 must be an object");

        let err = parse_bulk_statuses(json!([
            {"botId": "b-1", "status": "ok"},
            {"botId": "", "status": "ok"}
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "bulk status item #1 missing botId");

        let err = parse_bulk_statuses(json!([{"botId": "b-1"}])).unwrap_err();
        assert_eq!(err.to_string(), "bulk status item #0 missing status");
    }

    #[test]
    fn test_load_bulk_statuses_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("statuses.json");
        std::fs::write(&path, r#"[{"botId": "b-2", "status": "idle"}]"#).unwrap();

        let updates = load_bulk_statuses(&path).unwrap();
        assert_eq!(updates[0].bot_id, "b-2");

        let missing = load_bulk_statuses(&dir.path().join("missing.json")).unwrap_err();
        assert!(missing.to_string().starts_with("failed to read file"));
    }

    #[test]
    fn test_status_line() {
        let status = BotStatus {
            bot_id: "b-1".into(),
            bot_name: "builder".into(),
            status: "shipping".into(),
            ..Default::default()
        };
        assert_eq!(status_line(&status), "b-1 (builder): shipping");
    }
}
