//! Typed REST client for the Botspace coordination service.
//!
//! Covers the bot-facing surface: registration, identity, messages,
//! statuses, summary, skills and tasks.

mod client;
mod error;
mod types;

pub use client::BotspaceClient;
pub use error::{ApiError, ApiResult};
pub use types::{
    Bot, BotSpaceRef, BotStatus, Identity, Message, MessagePage, Overall, RegisterRequest,
    RegisterResponse, Skill, SkillDraft, SkillPatch, StatusUpdate, Summary, Task, TaskDraft, User,
};
