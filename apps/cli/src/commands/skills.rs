//! Skill directory commands.

use super::{parse_tags, Context, SpaceArgs};
use crate::output;
use anyhow::{bail, Result};
use botspace_api_client::{Skill, SkillDraft, SkillPatch};
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct SkillUpdateArgs {
    #[command(flatten)]
    pub space: SpaceArgs,

    /// Skill ID
    #[arg(long)]
    pub skill_id: String,

    /// New skill name
    #[arg(long)]
    pub name: Option<String>,

    /// New skill description
    #[arg(long)]
    pub description: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,
}

impl SkillUpdateArgs {
    fn patch(&self) -> Result<SkillPatch> {
        let patch = SkillPatch {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.as_deref().map(parse_tags),
        };
        if patch.is_empty() {
            bail!("at least one of --name, --description, or --tags is required");
        }
        Ok(patch)
    }
}

fn skill_line(skill: &Skill) -> String {
    format!(
        "{} name={} bot={} description={} tags=[{}]",
        skill.id,
        skill.name,
        skill.bot_name,
        skill.description,
        skill.tags.as_deref().unwrap_or_default().join(",")
    )
}

/// List all skills in the space.
pub async fn skills(ctx: &Context, space: &SpaceArgs) -> Result<()> {
    let space = ctx.space(space)?;
    let skills = space.client.list_skills(&space.id).await?;

    if ctx.format.is_json() {
        return output::print_json(&skills);
    }
    if skills.is_empty() {
        println!("no skills returned");
    }
    for skill in &skills {
        println!("{}", skill_line(skill));
    }
    Ok(())
}

pub async fn skill_create(
    ctx: &Context,
    space: &SpaceArgs,
    name: &str,
    description: &str,
    tags: Option<&str>,
) -> Result<()> {
    let space = ctx.space(space)?;
    let draft = SkillDraft {
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.map(parse_tags),
    };
    let skill = space.client.create_skill(&space.id, &draft).await?;

    if ctx.format.is_json() {
        return output::print_json(&skill);
    }
    println!("created skill id={} name={}", skill.id, skill.name);
    Ok(())
}

pub async fn skill_update(ctx: &Context, args: &SkillUpdateArgs) -> Result<()> {
    let patch = args.patch()?;
    let space = ctx.space(&args.space)?;
    let skill = space
        .client
        .update_skill(&space.id, &args.skill_id, &patch)
        .await?;

    if ctx.format.is_json() {
        return output::print_json(&skill);
    }
    println!("updated skill id={} name={}", skill.id, skill.name);
    Ok(())
}

pub async fn skill_delete(ctx: &Context, space: &SpaceArgs, skill_id: &str) -> Result<()> {
    let space = ctx.space(space)?;
    space.client.delete_skill(&space.id, skill_id).await?;

    if ctx.format.is_json() {
        return output::print_json(&serde_json::json!({ "deleted": skill_id }));
    }
    println!("deleted skill {}", skill_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_args() -> SkillUpdateArgs {
        SkillUpdateArgs {
            space: SpaceArgs::default(),
            skill_id: "sk-1".into(),
            name: None,
            description: None,
            tags: None,
        }
    }

    #[test]
    fn test_update_requires_a_field() {
        let err = update_args().patch().unwrap_err();
        assert_eq!(
            err.to_string(),
            "at least one of --name, --description, or --tags is required"
        );
    }

    #[test]
    fn test_update_tags_are_split() {
        let mut args = update_args();
        args.tags = Some("rust, review,".into());
        let patch = args.patch().unwrap();
        assert_eq!(patch.tags, Some(vec!["rust".to_string(), "review".to_string()]));
        assert!(patch.name.is_none());

        // An empty list clears the tags.
        args.tags = Some(String::new());
        assert_eq!(args.patch().unwrap().tags, Some(vec![]));
    }

    #[test]
    fn test_skill_line() {
        let skill = Skill {
            id: "sk-1".into(),
            name: "review".into(),
            bot_name: "builder".into(),
            description: "code review".into(),
            tags: Some(vec!["rust".into(), "go".into()]),
            ..Default::default()
        };
        assert_eq!(
            skill_line(&skill),
            "sk-1 name=review bot=builder description=code review tags=[rust,go]"
        );

        let untagged = Skill {
            tags: None,
            ..skill
        };
        assert!(skill_line(&untagged).ends_with("tags=[]"));
    }
}
