//! Fan-out of new items to every registered subscriber.
//!
//! Delivery runs over a registry snapshot, in registration order, one
//! subscriber at a time. A failing or panicking subscriber is logged and
//! skipped; it never aborts the round or reaches the caller.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::CallbackRegistry;
use crate::Item;

/// Outcome of one delivery round.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    /// Subscribers whose process was already gone
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Broadcaster {
    registry: CallbackRegistry,
}

impl Broadcaster {
    pub fn new(registry: CallbackRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Notifies every live subscriber registered when the call starts.
    ///
    /// Failed deliveries are not retried.
    pub async fn deliver(
        &self,
        item: &Item,
    ) -> DeliveryReport {
        let snapshot = self.registry.begin_broadcast();
        let mut report = DeliveryReport::default();

        for (index, handle) in snapshot.iter().enumerate() {
            let identity = snapshot.identity(index);
            if !handle.is_alive() {
                debug!(?identity, "skip dead subscriber");
                report.skipped += 1;
                continue;
            }

            match AssertUnwindSafe(async { handle.notify(item).await })
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    warn!(?identity, item = item.id, "notify subscriber failed: {:?}", e);
                    report.failed += 1;
                }
                Err(_) => {
                    error!(?identity, item = item.id, "subscriber notification panicked");
                    report.failed += 1;
                }
            }
        }

        snapshot.finish();
        debug!(item = item.id, ?report, "broadcast finished");
        report
    }
}
