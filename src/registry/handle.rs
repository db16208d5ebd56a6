use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::HandleId;
use crate::Item;
use crate::Result;

/// Local representation of a remote subscriber, supplied by the transport.
///
/// A new value may be produced for every inbound call that carries the same
/// remote subscriber, so implementations must not be compared by address.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriberHandle: Send + Sync + 'static {
    /// Stable token of the remote endpoint, `None` if the transport cannot
    /// provide one.
    fn identity(&self) -> Option<HandleId>;

    /// Liveness of the process hosting the endpoint.
    fn is_alive(&self) -> bool;

    /// Arranges for `recipient` to be told once the hosting process dies.
    ///
    /// Fails without invoking `recipient` if the process is already gone.
    fn link_to_death(
        &self,
        recipient: Arc<dyn DeathRecipient>,
    ) -> Result<()>;

    /// Detaches a recipient previously passed to
    /// [`link_to_death`](Self::link_to_death). Returns `false` if it was not
    /// linked.
    fn unlink_to_death(
        &self,
        recipient: &Arc<dyn DeathRecipient>,
    ) -> bool;

    /// Remote call into the subscriber's notification entry point. Blocks
    /// for as long as the remote side takes.
    async fn notify(
        &self,
        item: &Item,
    ) -> Result<()>;
}

/// Receives the transport's asynchronous death notification.
#[cfg_attr(test, automock)]
pub trait DeathRecipient: Send + Sync + 'static {
    fn subscriber_died(&self);
}
