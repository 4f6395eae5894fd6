//! # message-feed-tailer
//!
//! Follows the message feed of one bot space: resumes from a cursor, drains
//! backlog without gaps or repeats, dispatches each new message in
//! `createdAt` order, and optionally runs a reaction for it.
//!
//! ```text
//! resolve_start_cursor ──▶ FeedTailer::run ──▶ PageFetcher (HTTP)
//!                               │
//!                               ▼
//!                          Dispatcher ──▶ MessageSink (stdout)
//!                               │
//!                               └──────▶ ReactionSink (sh -c ...)
//! ```
//!
//! Everything runs on the caller's task, one operation at a time. A
//! [`CancellationToken`](tokio_util::sync::CancellationToken) stops the loop
//! at its next fetch, sleep or reaction, and `run` then returns normally.
//!
//! Only authorization failures leave the loop as errors. Every other fetch
//! failure is logged at `warn` and retried after the poll interval.

mod classify;
mod cursor;
mod dispatch;
mod error;
mod feed;
mod reaction;
mod tailer;

pub use classify::{classify, FailureClass};
pub use cursor::resolve_start_cursor;
pub use dispatch::{format_message, Dispatcher, FollowOutput, LineSink, MessageSink};
pub use error::{ReactionError, TailError, TailResult};
pub use feed::{PageFetcher, SpaceFeed};
pub use reaction::{ReactionSink, ShellReaction};
pub use tailer::{FeedTailer, FollowConfig};

pub use botspace_api_client::{Message, MessagePage};
