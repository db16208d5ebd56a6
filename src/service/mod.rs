//! RPC-facing service surface and host lifecycle hooks.
mod item_service;
pub use item_service::*;


use std::sync::Arc;

use async_trait::async_trait;

use crate::Item;
use crate::Result;
use crate::SubscriberHandle;

/// Operations a remote client may invoke on the service.
#[async_trait]
pub trait ItemManager: Send + Sync + 'static {
    /// Point-in-time copy of every stored item, in insertion order.
    async fn get_items(&self) -> Vec<Item>;

    async fn add_item(
        &self,
        item: Item,
    ) -> Result<()>;

    /// Subscribes `listener` to new items. Registering the same logical
    /// subscriber again is a no-op.
    async fn register_listener(
        &self,
        listener: Arc<dyn SubscriberHandle>,
    ) -> Result<()>;

    /// Removes the logical subscriber `listener` denotes, if registered.
    async fn unregister_listener(
        &self,
        listener: Arc<dyn SubscriberHandle>,
    ) -> Result<()>;
}
