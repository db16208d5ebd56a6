//! Periodic item producer.
//!
//! A single cooperative loop: wait one interval (or until cancelled), append
//! the next item, broadcast it. Cancellation is only observed between
//! rounds, so an in-flight delivery always runs to completion.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::Broadcaster;
use crate::Item;
use crate::ItemStore;
use crate::ProducerConfig;

pub struct ItemProducer {
    store: Arc<ItemStore>,
    broadcaster: Broadcaster,
    config: ProducerConfig,
}

impl ItemProducer {
    pub fn new(
        store: Arc<ItemStore>,
        broadcaster: Broadcaster,
        config: ProducerConfig,
    ) -> Self {
        Self {
            store,
            broadcaster,
            config,
        }
    }

    /// Runs the producer on its own task until `token` is cancelled.
    pub fn spawn(
        self,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(token).await })
    }

    pub async fn run(
        &self,
        token: CancellationToken,
    ) {
        info!(interval_in_ms = self.config.interval_in_ms, "item producer started");
        let interval = self.config.interval();

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("item producer received stop signal");
                    break;
                }
                _ = sleep(interval) => {
                    let item = self.produce_one();
                    let report = self.broadcaster.deliver(&item).await;
                    debug!(id = item.id, ?report, "produced item delivered");
                }
            }
        }
    }

    /// Appends the next item to the store and returns it.
    pub fn produce_one(&self) -> Item {
        self.store
            .append_next(|id| Item::new(id, self.config.label_for(id)))
    }
}
