use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

/// Default number of notices a slow subscriber may fall behind by.
const DEFAULT_CAPACITY: usize = 16;

/// Announcement that `key` now holds `raw`.
#[derive(Debug, Clone)]
pub struct ChangeNotice {
    pub key: String,
    pub raw: Arc<str>,
    /// Instance id of the writer, so a store can skip its own notices.
    pub origin: u64,
}

/// Publish/subscribe channel shared by every store over one backend.
///
/// A subscriber that lags behind loses notices; it must then re-read the
/// backend (see `DocumentStore::next_change`).
#[derive(Clone)]
pub struct ChangeChannel {
    tx: broadcast::Sender<ChangeNotice>,
}

impl ChangeChannel {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send a notice to every current subscriber, returning how many got it.
    pub fn publish(&self, notice: ChangeNotice) -> usize {
        match self.tx.send(notice) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("Change notice dropped - no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.tx.subscribe()
    }
}

impl Default for ChangeChannel {
    fn default() -> Self {
        Self::new()
    }
}
