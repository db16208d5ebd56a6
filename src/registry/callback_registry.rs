use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::resolve;
use super::BroadcastSnapshot;
use super::DeathRecipient;
use super::HandleId;
use super::SubscriberHandle;
use crate::CallbackError;
use crate::Result;

/// Outcome of a successful [`CallbackRegistry::register`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Registered,
    /// The logical subscriber was already present; nothing changed.
    AlreadyRegistered,
}

pub(crate) struct Entry {
    pub(crate) identity: HandleId,
    pub(crate) handle: Arc<dyn SubscriberHandle>,
    pub(crate) recipient: Arc<dyn DeathRecipient>,
    /// Distinguishes successive registrations of the same identity
    pub(crate) cookie: u64,
}

pub(crate) struct RegistryInner {
    /// Published list, replaced wholesale on every mutation
    entries: ArcSwap<Vec<Arc<Entry>>>,
    /// Serializes mutations; never held across a remote call
    write_lock: Mutex<()>,
    closed: AtomicBool,
    next_cookie: AtomicU64,
    pub(crate) active_broadcasts: AtomicUsize,
}

/// Registry of remote subscribers keyed by logical identity.
///
/// Cloning is cheap and every clone refers to the same registry.
#[derive(Clone)]
pub struct CallbackRegistry {
    inner: Arc<RegistryInner>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: ArcSwap::from_pointee(Vec::new()),
                write_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
                next_cookie: AtomicU64::new(1),
                active_broadcasts: AtomicUsize::new(0),
            }),
        }
    }

    /// Adds a subscriber unless the same logical subscriber is present.
    ///
    /// A death recipient is linked to the handle so the entry disappears when
    /// the owning process terminates.
    ///
    /// # Errors
    /// - [`CallbackError::RegistryClosed`] after [`kill`](Self::kill)
    /// - [`CallbackError::MissingIdentity`] if the handle has no identity token
    /// - [`CallbackError::SubscriberDead`] if the owning process is already gone
    pub fn register(
        &self,
        handle: Arc<dyn SubscriberHandle>,
    ) -> Result<Registration> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(CallbackError::RegistryClosed.into());
        }
        let identity = handle.identity().ok_or(CallbackError::MissingIdentity)?;

        let _guard = self.inner.write_lock.lock();
        // kill() may have completed while we waited for the lock
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(CallbackError::RegistryClosed.into());
        }

        let current = self.inner.entries.load_full();
        if resolve(current.iter().map(|e| &e.handle), handle.as_ref()).is_some() {
            debug!(%identity, "subscriber already registered");
            return Ok(Registration::AlreadyRegistered);
        }

        let cookie = self.inner.next_cookie.fetch_add(1, Ordering::Relaxed);
        let recipient: Arc<dyn DeathRecipient> = Arc::new(RegistryDeathRecipient {
            registry: Arc::downgrade(&self.inner),
            identity: identity.clone(),
            cookie,
        });
        if let Err(e) = handle.link_to_death(recipient.clone()) {
            warn!(%identity, "link_to_death failed: {:?}", e);
            return Err(CallbackError::SubscriberDead(identity).into());
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Arc::new(Entry {
            identity: identity.clone(),
            handle,
            recipient,
            cookie,
        }));
        let size = next.len();
        self.inner.entries.store(Arc::new(next));

        info!(%identity, size, "subscriber registered");
        Ok(Registration::Registered)
    }

    /// Removes the entry denoting the same logical subscriber as `handle`.
    ///
    /// Returns `false` when no such entry exists.
    pub fn unregister(
        &self,
        handle: &dyn SubscriberHandle,
    ) -> bool {
        if handle.identity().is_none() {
            warn!("cannot resolve a subscriber handle without identity token");
            return false;
        }

        let removed = {
            let _guard = self.inner.write_lock.lock();
            let current = self.inner.entries.load_full();
            match resolve(current.iter().map(|e| &e.handle), handle) {
                Some(pos) => {
                    let mut next: Vec<Arc<Entry>> = (*current).clone();
                    let entry = next.remove(pos);
                    self.inner.entries.store(Arc::new(next));
                    entry
                }
                None => {
                    debug!(identity = ?handle.identity(), "subscriber not found, nothing to unregister");
                    return false;
                }
            }
        };

        removed.handle.unlink_to_death(&removed.recipient);
        info!(identity = %removed.identity, size = self.count(), "subscriber unregistered");
        true
    }

    /// Starts a broadcast over the currently registered subscribers.
    pub fn begin_broadcast(&self) -> BroadcastSnapshot {
        BroadcastSnapshot::begin(self.inner.entries.load_full(), self.inner.clone())
    }

    /// Number of registered subscribers, taken through a broadcast snapshot.
    pub fn count(&self) -> usize {
        let snapshot = self.begin_broadcast();
        let size = snapshot.len();
        snapshot.finish();
        size
    }

    /// Number of snapshots that have begun and not yet finished.
    pub fn active_broadcasts(&self) -> usize {
        self.inner.active_broadcasts.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Disables the registry and drops every entry.
    ///
    /// Later registrations fail with [`CallbackError::RegistryClosed`].
    /// Snapshots taken before the call stay valid.
    pub fn kill(&self) {
        let drained = {
            let _guard = self.inner.write_lock.lock();
            self.inner.closed.store(true, Ordering::Release);
            self.inner.entries.swap(Arc::new(Vec::new()))
        };

        for entry in drained.iter() {
            entry.handle.unlink_to_death(&entry.recipient);
        }
        info!(dropped = drained.len(), "callback registry killed");
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryInner {
    /// Drops the entry created by the registration identified by `cookie`.
    fn prune_dead(
        &self,
        identity: &HandleId,
        cookie: u64,
    ) {
        let _guard = self.write_lock.lock();
        let current = self.entries.load_full();
        let Some(pos) = current.iter().position(|e| e.cookie == cookie && &e.identity == identity) else {
            debug!(%identity, "dead subscriber already removed");
            return;
        };

        let mut next: Vec<Arc<Entry>> = (*current).clone();
        next.remove(pos);
        let size = next.len();
        self.entries.store(Arc::new(next));
        info!(%identity, size, "subscriber process died, entry pruned");
    }
}

/// Death recipient linked at registration time.
///
/// Holds the registry weakly: a handle that outlives the registry must not
/// keep it alive.
struct RegistryDeathRecipient {
    registry: Weak<RegistryInner>,
    identity: HandleId,
    cookie: u64,
}

impl DeathRecipient for RegistryDeathRecipient {
    fn subscriber_died(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.prune_dead(&self.identity, self.cookie);
        }
    }
}
