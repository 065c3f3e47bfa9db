//! Rebuild coalescing.
//!
//! One pending timer, owned by [`Debouncer::next_batch`]. Every qualifying
//! change restarts it; the batch is released only once the window elapses
//! with no further change. Changes to the same path collapse into one entry,
//! keeping the most recent kind.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

use crate::dev::watcher::FileChange;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the next settled batch of changes.
    ///
    /// Returns `None` once the channel is closed and nothing is pending. If
    /// the channel closes while a batch is pending, that batch is returned
    /// immediately.
    pub async fn next_batch(&self, rx: &mut mpsc::Receiver<FileChange>) -> Option<Vec<FileChange>> {
        let first = rx.recv().await?;

        let mut pending: IndexMap<PathBuf, FileChange> = IndexMap::new();
        pending.insert(first.path().to_path_buf(), first);

        let timer = sleep(self.delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                change = rx.recv() => match change {
                    Some(change) => {
                        pending.insert(change.path().to_path_buf(), change);
                        timer.as_mut().reset(Instant::now() + self.delay);
                    }
                    None => break,
                },
                () = &mut timer => break,
            }
        }

        Some(pending.into_values().collect())
    }
}
