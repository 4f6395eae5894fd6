//! The drain loop.

use crate::classify::{classify, FailureClass};
use crate::dispatch::Dispatcher;
use crate::error::{TailError, TailResult};
use crate::feed::PageFetcher;
use botspace_api_client::{ApiResult, Message, MessagePage};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Pacing of a follow session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowConfig {
    /// Idle and retry sleep.
    pub interval: Duration,
    /// Page size for every fetch.
    pub limit: u32,
}

impl FollowConfig {
    pub fn new(interval: Duration, limit: u32) -> TailResult<Self> {
        if interval.is_zero() {
            return Err(TailError::InvalidConfig(
                "interval must be greater than zero".into(),
            ));
        }
        if limit == 0 {
            return Err(TailError::InvalidConfig(
                "limit must be greater than zero".into(),
            ));
        }
        Ok(Self { interval, limit })
    }
}

/// How one pass through the loop ended, short of an error.
enum Pass {
    Idle,
    Cancelled,
}

/// Follows one feed until cancelled or rejected.
///
/// Without a cursor, each pass fetches the newest page, dispatches it and
/// always sleeps. With a cursor, each pass fetches "since cursor" repeatedly
/// with no delay while the server reports more backlog, then sleeps once.
/// Failed fetches are classified: authorization failures end the session,
/// anything else is logged and retried after one interval with the cursor
/// unchanged.
pub struct FeedTailer<F> {
    fetcher: F,
    config: FollowConfig,
    dispatcher: Dispatcher,
}

impl<F: PageFetcher> FeedTailer<F> {
    pub fn new(fetcher: F, config: FollowConfig, dispatcher: Dispatcher) -> Self {
        Self {
            fetcher,
            config,
            dispatcher,
        }
    }

    /// Run the session starting after `cursor`.
    ///
    /// Returns the last dispatched message id once `cancel` fires.
    pub async fn run(
        &mut self,
        mut cursor: Option<String>,
        cancel: &CancellationToken,
    ) -> TailResult<Option<String>> {
        loop {
            if cancel.is_cancelled() {
                return Ok(cursor);
            }

            let pass = if cursor.is_some() {
                self.drain_since(&mut cursor, cancel).await
            } else {
                self.poll_recent(&mut cursor, cancel).await
            };

            match pass {
                Ok(Pass::Idle) => {}
                Ok(Pass::Cancelled) => return Ok(cursor),
                Err(e) => match classify(&e) {
                    FailureClass::Fatal => return Err(TailError::Unauthorized(e)),
                    FailureClass::Transient => {
                        warn!(cursor = ?cursor, "fetch failed, retrying: {}", e);
                    }
                },
            }

            let slept = tokio::select! {
                biased;
                _ = cancel.cancelled() => false,
                _ = tokio::time::sleep(self.config.interval) => true,
            };
            if !slept {
                return Ok(cursor);
            }
        }
    }

    async fn poll_recent(
        &mut self,
        cursor: &mut Option<String>,
        cancel: &CancellationToken,
    ) -> ApiResult<Pass> {
        let limit = self.config.limit;
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Pass::Cancelled),
            page = self.fetcher.fetch_recent(limit) => page?,
        };
        debug!(count = page.messages.len(), "Fetched recent page");

        if self.dispatch_page(page.messages, cursor, cancel).await {
            Ok(Pass::Idle)
        } else {
            Ok(Pass::Cancelled)
        }
    }

    async fn drain_since(
        &mut self,
        cursor: &mut Option<String>,
        cancel: &CancellationToken,
    ) -> ApiResult<Pass> {
        let limit = self.config.limit;
        while let Some(since) = cursor.clone() {
            let page: MessagePage = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Pass::Cancelled),
                page = self.fetcher.fetch_since(&since, limit) => page?,
            };
            debug!(cursor = %since, count = page.messages.len(), has_more = page.has_more, "Fetched page");

            let exhausted = !page.has_more || page.messages.is_empty();
            if !self.dispatch_page(page.messages, cursor, cancel).await {
                return Ok(Pass::Cancelled);
            }
            if exhausted {
                break;
            }
        }
        Ok(Pass::Idle)
    }

    /// Dispatch a page oldest first, advancing the cursor after each message.
    ///
    /// Returns `false` if cancelled part way through.
    async fn dispatch_page(
        &mut self,
        mut messages: Vec<Message>,
        cursor: &mut Option<String>,
        cancel: &CancellationToken,
    ) -> bool {
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        for message in messages {
            if !self.dispatcher.dispatch(&message, cancel).await {
                return false;
            }
            *cursor = Some(message.id);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MessageSink;
    use crate::error::ReactionError;
    use crate::reaction::ReactionSink;
    use async_trait::async_trait;
    use botspace_api_client::ApiError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Arc;
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_secs(5);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Recent,
        Since(String),
    }

    /// Replays canned responses, recording each call and when it happened.
    /// Once the script runs out it cancels the session and answers empty.
    struct ScriptedFetcher {
        script: Mutex<VecDeque<ApiResult<MessagePage>>>,
        calls: Arc<Mutex<Vec<(Call, Instant)>>>,
        cancel: CancellationToken,
    }

    impl ScriptedFetcher {
        fn new(
            script: Vec<ApiResult<MessagePage>>,
            cancel: &CancellationToken,
        ) -> (Self, Arc<Mutex<Vec<(Call, Instant)>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let fetcher = Self {
                script: Mutex::new(script.into()),
                calls: calls.clone(),
                cancel: cancel.clone(),
            };
            (fetcher, calls)
        }

        fn next(&self, call: Call) -> ApiResult<MessagePage> {
            self.calls.lock().push((call, Instant::now()));
            match self.script.lock().pop_front() {
                Some(response) => response,
                None => {
                    self.cancel.cancel();
                    Ok(page(&[], false))
                }
            }
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch_recent(&self, _limit: u32) -> ApiResult<MessagePage> {
            self.next(Call::Recent)
        }

        async fn fetch_since(&self, cursor: &str, _limit: u32) -> ApiResult<MessagePage> {
            self.next(Call::Since(cursor.to_string()))
        }
    }

    /// An append-only feed that honours `since` and `limit`.
    /// Cancels the session on the first empty answer.
    struct LogFeed {
        log: Vec<Message>,
        cancel: CancellationToken,
    }

    #[async_trait]
    impl PageFetcher for LogFeed {
        async fn fetch_recent(&self, limit: u32) -> ApiResult<MessagePage> {
            let start = self.log.len().saturating_sub(limit as usize);
            Ok(MessagePage {
                messages: self.log[start..].to_vec(),
                count: None,
                has_more: false,
            })
        }

        async fn fetch_since(&self, cursor: &str, limit: u32) -> ApiResult<MessagePage> {
            let start = self
                .log
                .iter()
                .position(|m| m.id == cursor)
                .map(|i| i + 1)
                .unwrap_or(0);
            let end = (start + limit as usize).min(self.log.len());
            let messages = self.log[start..end].to_vec();
            if messages.is_empty() {
                self.cancel.cancel();
            }
            Ok(MessagePage {
                has_more: end < self.log.len(),
                count: Some(messages.len()),
                messages,
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl RecordingSink {
        fn ids(&self) -> Vec<String> {
            self.0.lock().clone()
        }
    }

    impl MessageSink for RecordingSink {
        fn emit(&mut self, message: &Message) -> io::Result<()> {
            self.0.lock().push(message.id.clone());
            Ok(())
        }
    }

    /// Fails for the listed ids, succeeds otherwise.
    #[derive(Clone, Default)]
    struct ScriptedReaction {
        failing: Vec<String>,
        attempts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ReactionSink for ScriptedReaction {
        async fn react(&self, message: &Message) -> Result<(), ReactionError> {
            self.attempts.lock().push(message.id.clone());
            if self.failing.contains(&message.id) {
                Err(ReactionError::Failed {
                    exit_code: Some(1),
                    detail: "exit code 1".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn msg(id: &str, created_at: &str) -> Message {
        Message {
            id: id.into(),
            created_at: created_at.into(),
            extra: Default::default(),
        }
    }

    fn page(ids: &[&str], has_more: bool) -> MessagePage {
        let messages: Vec<Message> = ids
            .iter()
            .map(|id| msg(id, &format!("2025-01-01T00:00:00Z-{}", id)))
            .collect();
        MessagePage {
            count: Some(messages.len()),
            messages,
            has_more,
        }
    }

    /// Paused time advances to timer deadlines, which are millisecond-granular.
    fn assert_gap(earlier: Instant, later: Instant, expected: Duration) {
        let gap = later - earlier;
        assert!(
            gap >= expected && gap < expected + Duration::from_millis(2),
            "expected a gap of {:?}, got {:?}",
            expected,
            gap
        );
    }

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            message: String::new(),
        }
    }

    fn tailer<F: PageFetcher>(fetcher: F, sink: &RecordingSink) -> FeedTailer<F> {
        FeedTailer::new(
            fetcher,
            FollowConfig::new(INTERVAL, 30).unwrap(),
            Dispatcher::new(Box::new(sink.clone())),
        )
    }

    #[test]
    fn config_rejects_zero_values() {
        assert!(FollowConfig::new(Duration::ZERO, 30).is_err());
        assert!(FollowConfig::new(INTERVAL, 0).is_err());
        assert!(FollowConfig::new(Duration::from_millis(1), 1).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn page_is_dispatched_in_created_at_order() {
        let cancel = CancellationToken::new();
        let unordered = MessagePage {
            messages: vec![
                msg("c", "2025-01-01T00:00:03Z"),
                msg("a", "2025-01-01T00:00:01Z"),
                msg("b", "2025-01-01T00:00:02Z"),
            ],
            count: Some(3),
            has_more: false,
        };
        let (fetcher, calls) = ScriptedFetcher::new(vec![Ok(unordered)], &cancel);
        let sink = RecordingSink::default();

        let last = tailer(fetcher, &sink).run(None, &cancel).await.unwrap();

        assert_eq!(sink.ids(), vec!["a", "b", "c"]);
        assert_eq!(last.as_deref(), Some("c"));
        let calls = calls.lock();
        assert_eq!(calls[0].0, Call::Recent);
        assert_eq!(calls[1].0, Call::Since("c".into()));
        assert_gap(calls[0].1, calls[1].1, INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn backlog_drains_without_sleeping() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) = ScriptedFetcher::new(
            vec![
                Ok(page(&["m1"], true)),
                Ok(page(&["m2"], true)),
                Ok(page(&["m3"], false)),
            ],
            &cancel,
        );
        let sink = RecordingSink::default();

        let last = tailer(fetcher, &sink)
            .run(Some("m0".into()), &cancel)
            .await
            .unwrap();

        assert_eq!(sink.ids(), vec!["m1", "m2", "m3"]);
        assert_eq!(last.as_deref(), Some("m3"));

        let calls = calls.lock();
        let cursors: Vec<_> = calls.iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(
            cursors,
            vec![
                Call::Since("m0".into()),
                Call::Since("m1".into()),
                Call::Since("m2".into()),
                Call::Since("m3".into()),
            ]
        );
        assert_eq!(calls[1].1, calls[0].1);
        assert_eq!(calls[2].1, calls[0].1);
        assert_gap(calls[2].1, calls[3].1, INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_page_with_has_more_still_idles() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) = ScriptedFetcher::new(vec![Ok(page(&[], true))], &cancel);
        let sink = RecordingSink::default();

        tailer(fetcher, &sink)
            .run(Some("m0".into()), &cancel)
            .await
            .unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 2);
        assert_gap(calls[0].1, calls[1].1, INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn resumed_session_skips_already_dispatched() {
        let log: Vec<Message> = (1..=5)
            .map(|i| msg(&format!("m{}", i), &format!("2025-01-01T00:00:0{}Z", i)))
            .collect();

        let first = RecordingSink::default();
        let cancel = CancellationToken::new();
        let feed = LogFeed {
            log: log[..3].to_vec(),
            cancel: cancel.clone(),
        };
        let mut session = FeedTailer::new(
            feed,
            FollowConfig::new(INTERVAL, 2).unwrap(),
            Dispatcher::new(Box::new(first.clone())),
        );
        let resume_at = session.run(Some("m1".into()), &cancel).await.unwrap();
        assert_eq!(first.ids(), vec!["m2", "m3"]);
        assert_eq!(resume_at.as_deref(), Some("m3"));

        let second = RecordingSink::default();
        let cancel = CancellationToken::new();
        let feed = LogFeed {
            log,
            cancel: cancel.clone(),
        };
        let mut session = FeedTailer::new(
            feed,
            FollowConfig::new(INTERVAL, 2).unwrap(),
            Dispatcher::new(Box::new(second.clone())),
        );
        let last = session.run(resume_at, &cancel).await.unwrap();
        assert_eq!(second.ids(), vec!["m4", "m5"]);
        assert_eq!(last.as_deref(), Some("m5"));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_ends_session_immediately() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) = ScriptedFetcher::new(
            vec![Ok(page(&["m1"], true)), Err(status(401))],
            &cancel,
        );
        let sink = RecordingSink::default();

        let err = tailer(fetcher, &sink)
            .run(Some("m0".into()), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TailError::Unauthorized(ref e) if e.status() == Some(401)));
        assert_eq!(calls.lock().len(), 2);
        assert_eq!(sink.ids(), vec!["m1"]);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn forbidden_in_cursorless_mode_is_fatal() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) = ScriptedFetcher::new(vec![Err(status(403))], &cancel);
        let sink = RecordingSink::default();

        let err = tailer(fetcher, &sink).run(None, &cancel).await.unwrap_err();

        assert!(matches!(err, TailError::Unauthorized(_)));
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_keeps_cursor_and_retries_after_interval() {
        let cancel = CancellationToken::new();
        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let (fetcher, calls) = ScriptedFetcher::new(
            vec![
                Err(status(502)),
                Err(ApiError::Json(malformed)),
                Ok(page(&["m1"], false)),
            ],
            &cancel,
        );
        let sink = RecordingSink::default();

        let last = tailer(fetcher, &sink)
            .run(Some("m0".into()), &cancel)
            .await
            .unwrap();

        let calls = calls.lock();
        assert_eq!(calls[0].0, Call::Since("m0".into()));
        assert_eq!(calls[1].0, Call::Since("m0".into()));
        assert_eq!(calls[2].0, Call::Since("m0".into()));
        assert_gap(calls[0].1, calls[1].1, INTERVAL);
        assert_gap(calls[1].1, calls[2].1, INTERVAL);
        assert_eq!(sink.ids(), vec!["m1"]);
        assert_eq!(last.as_deref(), Some("m1"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_mid_drain_retries_from_advanced_cursor() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) = ScriptedFetcher::new(
            vec![
                Ok(page(&["m1"], true)),
                Err(status(500)),
                Ok(page(&["m2"], false)),
            ],
            &cancel,
        );
        let sink = RecordingSink::default();

        let last = tailer(fetcher, &sink)
            .run(Some("m0".into()), &cancel)
            .await
            .unwrap();

        let calls = calls.lock();
        let cursors: Vec<Call> = calls.iter().map(|(c, _)| c.clone()).collect();
        assert_eq!(
            cursors,
            vec![
                Call::Since("m0".into()),
                Call::Since("m1".into()),
                Call::Since("m1".into()),
                Call::Since("m2".into()),
            ]
        );
        assert_gap(calls[0].1, calls[1].1, Duration::ZERO);
        assert_gap(calls[1].1, calls[2].1, INTERVAL);
        assert_eq!(sink.ids(), vec!["m1", "m2"]);
        assert_eq!(last.as_deref(), Some("m2"));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_reaction_does_not_block_next_message() {
        let cancel = CancellationToken::new();
        let (fetcher, _calls) =
            ScriptedFetcher::new(vec![Ok(page(&["m1", "m2"], false))], &cancel);
        let sink = RecordingSink::default();
        let reaction = ScriptedReaction {
            failing: vec!["m1".into()],
            ..Default::default()
        };

        let mut tailer = FeedTailer::new(
            fetcher,
            FollowConfig::new(INTERVAL, 30).unwrap(),
            Dispatcher::new(Box::new(sink.clone())).with_reaction(Box::new(reaction.clone())),
        );
        let last = tailer.run(Some("m0".into()), &cancel).await.unwrap();

        assert_eq!(sink.ids(), vec!["m1", "m2"]);
        assert_eq!(*reaction.attempts.lock(), vec!["m1", "m2"]);
        assert_eq!(last.as_deref(), Some("m2"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_feed_without_cursor_keeps_polling_recent() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) =
            ScriptedFetcher::new(vec![Ok(page(&[], false)), Ok(page(&[], false))], &cancel);
        let sink = RecordingSink::default();

        let last = tailer(fetcher, &sink).run(None, &cancel).await.unwrap();

        assert_eq!(last, None);
        assert!(sink.ids().is_empty());
        let calls = calls.lock();
        assert!(calls.iter().all(|(c, _)| *c == Call::Recent));
        assert_eq!(calls.len(), 3);
        assert_gap(calls[0].1, calls[1].1, INTERVAL);
        assert_gap(calls[1].1, calls[2].1, INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_fetches_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (fetcher, calls) = ScriptedFetcher::new(vec![], &cancel);
        let sink = RecordingSink::default();

        let last = tailer(fetcher, &sink)
            .run(Some("m9".into()), &cancel)
            .await
            .unwrap();

        assert_eq!(last.as_deref(), Some("m9"));
        assert!(calls.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_idle_sleep() {
        let cancel = CancellationToken::new();
        let (fetcher, calls) = ScriptedFetcher::new(
            vec![Ok(page(&[], false)), Ok(page(&[], false))],
            &cancel,
        );
        let sink = RecordingSink::default();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = tailer(fetcher, &sink).run(None, &cancel).await;

        assert!(matches!(result, Ok(None)));
        assert_eq!(calls.lock().len(), 1);
        assert_gap(started, Instant::now(), Duration::from_secs(1));
    }
}
