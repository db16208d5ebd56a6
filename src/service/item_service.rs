use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use super::ItemManager;
use crate::Broadcaster;
use crate::CallbackRegistry;
use crate::Item;
use crate::ItemProducer;
use crate::ItemStore;
use crate::NotifyConfig;
use crate::Registration;
use crate::Result;
use crate::ServiceError;
use crate::SubscriberHandle;

struct ProducerTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of the item store, the callback registry and the producer task.
///
/// Store and registry are independent synchronization domains: a slow
/// broadcast never blocks `add_item`, and `register_listener` never waits
/// on a remote call.
pub struct ItemService {
    store: Arc<ItemStore>,
    registry: CallbackRegistry,
    broadcaster: Broadcaster,
    config: NotifyConfig,
    producer: Mutex<Option<ProducerTask>>,
}

impl ItemService {
    pub fn new(config: NotifyConfig) -> Self {
        let registry = CallbackRegistry::new();
        Self {
            store: Arc::new(ItemStore::new()),
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            config,
            producer: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Seeds an empty store and launches the background producer.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - [`ServiceError::AlreadyStarted`] if the producer is running
    /// - [`crate::Error::Config`] if the service or producer settings are invalid
    pub fn on_start(&self) -> Result<()> {
        let mut producer = self.producer.lock();
        if producer.is_some() {
            return Err(ServiceError::AlreadyStarted.into());
        }
        // A zero interval would turn the producer into a busy loop
        self.config.service.validate()?;
        self.config.producer.validate()?;

        if self.store.seed(&self.config.service.seed_items) {
            info!(count = self.config.service.seed_items.len(), "item store seeded");
        }

        let token = CancellationToken::new();
        let handle = ItemProducer::new(
            self.store.clone(),
            self.broadcaster.clone(),
            self.config.producer.clone(),
        )
        .spawn(token.clone());
        *producer = Some(ProducerTask { token, handle });

        info!("item service started");
        Ok(())
    }

    /// Signals the producer to stop and waits for its loop to exit.
    pub async fn on_stop(&self) -> Result<()> {
        let Some(task) = self.producer.lock().take() else {
            warn!("item service is not running");
            return Ok(());
        };

        task.token.cancel();
        task.handle.await.map_err(ServiceError::ProducerJoin)?;
        info!("item service stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.producer.lock().is_some()
    }

    /// Stops the service for good and drops every registered subscriber.
    pub async fn shutdown(&self) -> Result<()> {
        self.on_stop().await?;
        self.registry.kill();
        Ok(())
    }
}

#[async_trait]
impl ItemManager for ItemService {
    async fn get_items(&self) -> Vec<Item> {
        self.store.snapshot_all()
    }

    async fn add_item(
        &self,
        item: Item,
    ) -> Result<()> {
        info!(%item, "add item");
        self.store.append(item);
        Ok(())
    }

    async fn register_listener(
        &self,
        listener: Arc<dyn SubscriberHandle>,
    ) -> Result<()> {
        match self.registry.register(listener)? {
            Registration::Registered => {}
            Registration::AlreadyRegistered => info!("listener already exists"),
        }
        info!(size = self.registry.count(), "register listener");
        Ok(())
    }

    async fn unregister_listener(
        &self,
        listener: Arc<dyn SubscriberHandle>,
    ) -> Result<()> {
        if !self.registry.unregister(listener.as_ref()) {
            info!("listener not found, can not unregister");
        }
        info!(size = self.registry.count(), "unregister listener");
        Ok(())
    }
}
