//! Load session lifecycle.

use tokio_util::sync::CancellationToken;

/// Terminal result of one load session.
///
/// A session moves from pending to exactly one of these; terminal states are
/// final. Retries happen only via a brand-new session triggered by a later
/// viewport event, never within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// All pages fetched and handed to the store.
    Succeeded,

    /// A genuine failure was reported to the store.
    Failed,

    /// The session was superseded by a newer extent request.
    Cancelled,
}

/// One viewport-extent load.
///
/// At most one session per source is live (uncancelled) at a time: starting
/// a new load cancels the previous session's token before any I/O, so stale
/// loads can never race the active one into the store.
#[derive(Debug)]
pub struct LoadSession {
    cancellation: CancellationToken,
}

impl LoadSession {
    pub fn new() -> Self {
        Self {
            cancellation: CancellationToken::new(),
        }
    }

    /// The cancellation token threaded through every I/O call of this
    /// session.
    pub fn token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Cancel the session, aborting all outstanding requests cooperatively.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for LoadSession {
    fn default() -> Self {
        Self::new()
    }
}
