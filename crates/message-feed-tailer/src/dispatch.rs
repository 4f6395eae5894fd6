//! Emitting dispatched messages and running their reactions.

use crate::reaction::ReactionSink;
use botspace_api_client::Message;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How a dispatched message is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowOutput {
    /// `[createdAt] senderName (senderType): content`
    #[default]
    Text,
    /// `{"type":"message","message":{...}}`
    Json,
}

/// Destination for dispatched messages, in dispatch order.
pub trait MessageSink: Send {
    fn emit(&mut self, message: &Message) -> io::Result<()>;
}

/// Writes one line per message and flushes it immediately.
pub struct LineSink<W> {
    writer: W,
    format: FollowOutput,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(writer: W, format: FollowOutput) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout(format: FollowOutput) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write + Send> MessageSink for LineSink<W> {
    fn emit(&mut self, message: &Message) -> io::Result<()> {
        let line = match self.format {
            FollowOutput::Text => format_message(message),
            FollowOutput::Json => json_record(message)?,
        };
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }
}

/// Human-readable single-line rendering of a message.
pub fn format_message(message: &Message) -> String {
    let created_at = if message.created_at.is_empty() {
        "?"
    } else {
        message.created_at.as_str()
    };
    format!(
        "[{}] {} ({}): {}",
        created_at,
        message.sender_name().unwrap_or("unknown"),
        message.sender_type().unwrap_or("unknown"),
        message.content().unwrap_or("")
    )
}

fn json_record(message: &Message) -> io::Result<String> {
    let record = serde_json::json!({ "type": "message", "message": message });
    serde_json::to_string(&record).map_err(io::Error::from)
}

/// Emits each message and then runs the optional reaction for it.
pub struct Dispatcher {
    sink: Box<dyn MessageSink>,
    reaction: Option<Box<dyn ReactionSink>>,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn MessageSink>) -> Self {
        Self {
            sink,
            reaction: None,
        }
    }

    pub fn with_reaction(mut self, reaction: Box<dyn ReactionSink>) -> Self {
        self.reaction = Some(reaction);
        self
    }

    /// Dispatch one message.
    ///
    /// Returns `false` if cancellation interrupted the reaction, in which case
    /// the message does not count as dispatched. Sink and reaction failures
    /// are logged and otherwise ignored.
    pub async fn dispatch(&mut self, message: &Message, cancel: &CancellationToken) -> bool {
        if let Err(e) = self.sink.emit(message) {
            warn!(id = %message.id, error = %e, "failed to write message");
        }

        let Some(reaction) = &self.reaction else {
            return true;
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            result = reaction.react(message) => result,
        };

        match result {
            Ok(()) => debug!(id = %message.id, "reaction command succeeded"),
            Err(e) => warn!(id = %message.id, "reaction command failed: {}", e),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactionError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn message(id: &str, fields: serde_json::Value) -> Message {
        let extra = match fields {
            serde_json::Value::Object(map) => map,
            _ => Default::default(),
        };
        Message {
            id: id.into(),
            created_at: "2025-01-01T00:00:00Z".into(),
            extra,
        }
    }

    #[test]
    fn text_line_has_sender_and_content() {
        let msg = message(
            "m-1",
            serde_json::json!({"senderName": "builder", "senderType": "bot", "content": "done"}),
        );
        assert_eq!(format_message(&msg), "[2025-01-01T00:00:00Z] builder (bot): done");
    }

    #[test]
    fn text_line_fills_missing_fields() {
        let mut msg = message("m-1", serde_json::json!({}));
        msg.created_at.clear();
        assert_eq!(format_message(&msg), "[?] unknown (unknown): ");
    }

    #[test]
    fn json_line_wraps_full_record() {
        let msg = message("m-1", serde_json::json!({"content": "hi", "senderId": "b-2"}));
        let mut sink = LineSink::new(Vec::new(), FollowOutput::Json);
        sink.emit(&msg).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.ends_with('\n'));
        assert_eq!(out.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["message"]["id"], "m-1");
        assert_eq!(value["message"]["senderId"], "b-2");
    }

    struct BrokenPipe;

    impl MessageSink for BrokenPipe {
        fn emit(&mut self, _message: &Message) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    struct CountingReaction(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl ReactionSink for CountingReaction {
        async fn react(&self, message: &Message) -> Result<(), ReactionError> {
            self.0.lock().push(message.id.clone());
            Err(ReactionError::Failed {
                exit_code: Some(1),
                detail: "nope".into(),
            })
        }
    }

    #[tokio::test]
    async fn sink_failure_still_runs_reaction() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new(Box::new(BrokenPipe))
            .with_reaction(Box::new(CountingReaction(seen.clone())));

        let cancel = CancellationToken::new();
        assert!(dispatcher.dispatch(&message("m-1", serde_json::json!({})), &cancel).await);
        assert_eq!(*seen.lock(), vec!["m-1".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_reaction_is_not_dispatched() {
        struct Never;

        #[async_trait]
        impl ReactionSink for Never {
            async fn react(&self, _message: &Message) -> Result<(), ReactionError> {
                std::future::pending().await
            }
        }

        let mut dispatcher =
            Dispatcher::new(Box::new(LineSink::new(Vec::new(), FollowOutput::Text)))
                .with_reaction(Box::new(Never));
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(!dispatcher.dispatch(&message("m-1", serde_json::json!({})), &cancel).await);
    }
}
