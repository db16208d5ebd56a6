use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tracing::debug;

use crate::Item;

/// Callback surface a subscriber exposes to the service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ItemListener: Send + Sync + 'static {
    async fn on_new_item(
        &self,
        item: &Item,
    );
}

/// Listener that hands every notification over to a channel, so the
/// subscriber can process it on its own task.
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<Item>,
}

impl ChannelListener {
    /// Creates a listener together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Item>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl ItemListener for ChannelListener {
    async fn on_new_item(
        &self,
        item: &Item,
    ) {
        if self.sender.send(item.clone()).is_err() {
            debug!(id = item.id, "listener receiver dropped, notification discarded");
        }
    }
}
