//! Starting point of a tailing session.

use crate::classify::{classify, FailureClass};
use crate::error::{TailError, TailResult};
use crate::feed::PageFetcher;
use tracing::debug;

/// Decide where a new session starts.
///
/// An explicit id is returned as-is. Otherwise the newest message becomes the
/// cursor, so nothing already in the feed is replayed; an empty feed yields
/// `None` and the session picks up whatever arrives first.
///
/// Called once per session. Unlike fetches inside the drain loop, a failure
/// here is never retried.
pub async fn resolve_start_cursor<F>(fetcher: &F, explicit: Option<String>) -> TailResult<Option<String>>
where
    F: PageFetcher + ?Sized,
{
    if let Some(id) = explicit {
        return Ok(Some(id));
    }

    let page = fetcher.fetch_recent(1).await.map_err(|e| match classify(&e) {
        FailureClass::Fatal => TailError::Unauthorized(e),
        FailureClass::Transient => TailError::StartCursor(e),
    })?;

    let cursor = page.messages.into_iter().next().map(|m| m.id);
    debug!(cursor = ?cursor, "Resolved start cursor");
    Ok(cursor)
}
