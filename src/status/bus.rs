// src/status/bus.rs

//! Publish/subscribe for unit status.
//!
//! The bus keeps only the latest full [`StatusSnapshot`] in a
//! `tokio::sync::watch` channel. Subscribers get the current snapshot on
//! their first read and a fresh one after every change; a slow subscriber may
//! skip intermediate snapshots but never sees them out of order.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tracing::trace;

use crate::status::snapshot::{StatusFilter, StatusSnapshot};
use crate::work::WorkInfo;

#[derive(Debug, Clone)]
pub struct StatusBus {
    tx: watch::Sender<StatusSnapshot>,
}

impl StatusBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StatusSnapshot::default());
        Self { tx }
    }

    /// Replace the current snapshot. Visible to every reader as soon as this
    /// returns.
    pub fn publish(&self, snapshot: StatusSnapshot) {
        trace!(
            units = snapshot.units().len(),
            subscribers = self.tx.receiver_count(),
            "publishing status snapshot"
        );
        self.tx.send_replace(snapshot);
    }

    /// Current units matching `filter`. Never blocks.
    pub fn current(&self, filter: &StatusFilter) -> Vec<WorkInfo> {
        self.tx.borrow().filtered(filter)
    }

    /// Infinite stream of filtered snapshots, starting with the current one.
    pub fn subscribe(&self, filter: StatusFilter) -> impl Stream<Item = Vec<WorkInfo>> + Send + Unpin + 'static {
        WatchStream::new(self.tx.subscribe()).map(move |snapshot| snapshot.filtered(&filter))
    }
}

impl Default for StatusBus {
    fn default() -> Self {
        Self::new()
    }
}
