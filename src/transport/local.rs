use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

use super::ItemListener;
use crate::CallbackError;
use crate::DeathRecipient;
use crate::HandleId;
use crate::Item;
use crate::Result;
use crate::SubscriberHandle;

/// Callback endpoint hosted by a simulated subscriber process.
struct Endpoint {
    id: HandleId,
    listener: Arc<dyn ItemListener>,
    alive: AtomicBool,
    /// Guards `alive` transitions as well as the recipient list
    recipients: Mutex<Vec<Arc<dyn DeathRecipient>>>,
}

impl Endpoint {
    fn die(&self) -> Vec<Arc<dyn DeathRecipient>> {
        let mut recipients = self.recipients.lock();
        if !self.alive.swap(false, Ordering::AcqRel) {
            return Vec::new();
        }
        std::mem::take(&mut *recipients)
    }
}

/// In-process transport with cross-process semantics.
///
/// Endpoints are published by subscribers; the server only ever sees proxies
/// produced by [`LocalBinder::marshal`] or [`LocalTransport::resolve`].
#[derive(Clone, Default)]
pub struct LocalTransport {
    endpoints: Arc<DashMap<HandleId, Arc<Endpoint>>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hosts `listener` in a new simulated process.
    pub fn publish(
        &self,
        listener: Arc<dyn ItemListener>,
    ) -> LocalBinder {
        let endpoint = Arc::new(Endpoint {
            id: HandleId::generate(),
            listener,
            alive: AtomicBool::new(true),
            recipients: Mutex::new(Vec::new()),
        });
        self.endpoints.insert(endpoint.id.clone(), endpoint.clone());
        debug!(id = %endpoint.id, "endpoint published");

        LocalBinder {
            transport: self.clone(),
            endpoint,
        }
    }

    /// Marshals a new proxy for a live endpoint.
    pub fn resolve(
        &self,
        id: &HandleId,
    ) -> Option<Arc<dyn SubscriberHandle>> {
        self.endpoints
            .get(id)
            .map(|entry| Arc::new(LocalProxy::new(entry.value().clone())) as Arc<dyn SubscriberHandle>)
    }

    /// Number of endpoints whose process is alive.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }
}

/// Subscriber-side owner of a published endpoint.
///
/// Dropping the binder withdraws the endpoint from the transport, so it can
/// no longer be resolved. Proxies already handed out keep working until
/// [`kill_process`](Self::kill_process) is called.
pub struct LocalBinder {
    transport: LocalTransport,
    endpoint: Arc<Endpoint>,
}

impl LocalBinder {
    pub fn id(&self) -> &HandleId {
        &self.endpoint.id
    }

    /// Produces the proxy the server would receive for one inbound call.
    ///
    /// Every call returns a distinct object sharing the same identity token.
    pub fn marshal(&self) -> Arc<dyn SubscriberHandle> {
        Arc::new(LocalProxy::new(self.endpoint.clone()))
    }

    pub fn is_alive(&self) -> bool {
        self.endpoint.alive.load(Ordering::Acquire)
    }

    /// Terminates the hosting process and fires its death notifications.
    pub fn kill_process(&self) {
        self.transport.endpoints.remove(&self.endpoint.id);
        let recipients = self.endpoint.die();
        info!(id = %self.endpoint.id, recipients = recipients.len(), "subscriber process killed");

        for recipient in recipients {
            recipient.subscriber_died();
        }
    }
}

impl Drop for LocalBinder {
    fn drop(&mut self) {
        if self.transport.endpoints.remove(&self.endpoint.id).is_some() {
            debug!(id = %self.endpoint.id, "endpoint withdrawn");
        }
    }
}

/// Server-side proxy for an endpoint.
struct LocalProxy {
    endpoint: Arc<Endpoint>,
}

impl LocalProxy {
    fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl SubscriberHandle for LocalProxy {
    fn identity(&self) -> Option<HandleId> {
        Some(self.endpoint.id.clone())
    }

    fn is_alive(&self) -> bool {
        self.endpoint.alive.load(Ordering::Acquire)
    }

    fn link_to_death(
        &self,
        recipient: Arc<dyn DeathRecipient>,
    ) -> Result<()> {
        let mut recipients = self.endpoint.recipients.lock();
        if !self.endpoint.alive.load(Ordering::Acquire) {
            return Err(CallbackError::SubscriberDead(self.endpoint.id.clone()).into());
        }
        recipients.push(recipient);
        Ok(())
    }

    fn unlink_to_death(
        &self,
        recipient: &Arc<dyn DeathRecipient>,
    ) -> bool {
        let target = Arc::as_ptr(recipient) as *const ();
        let mut recipients = self.endpoint.recipients.lock();
        match recipients.iter().position(|r| Arc::as_ptr(r) as *const () == target) {
            Some(pos) => {
                recipients.remove(pos);
                true
            }
            None => false,
        }
    }

    async fn notify(
        &self,
        item: &Item,
    ) -> Result<()> {
        if !self.is_alive() {
            return Err(CallbackError::communication(Some(self.endpoint.id.clone()), "dead object").into());
        }
        self.endpoint.listener.on_new_item(item).await;
        Ok(())
    }
}
