use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::trace;

use super::callback_registry::Entry;
use super::callback_registry::RegistryInner;
use super::HandleId;
use super::SubscriberHandle;

/// Immutable, ordered view of the registered subscribers at the instant
/// [`CallbackRegistry::begin_broadcast`](super::CallbackRegistry::begin_broadcast)
/// was called.
///
/// Ending the broadcast happens exactly once: either through
/// [`finish`](Self::finish) or when the snapshot is dropped. Registrations
/// that happen while the snapshot is alive are not reflected in it.
#[must_use = "a broadcast snapshot ends as soon as it is dropped"]
pub struct BroadcastSnapshot {
    entries: Arc<Vec<Arc<Entry>>>,
    registry: Arc<RegistryInner>,
}

impl BroadcastSnapshot {
    pub(super) fn begin(
        entries: Arc<Vec<Arc<Entry>>>,
        registry: Arc<RegistryInner>,
    ) -> Self {
        let depth = acquire_broadcast(&registry.active_broadcasts);
        trace!(depth, size = entries.len(), "begin broadcast");
        Self { entries, registry }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(
        &self,
        index: usize,
    ) -> Option<&Arc<dyn SubscriberHandle>> {
        self.entries.get(index).map(|entry| &entry.handle)
    }

    /// Identity the handle at `index` was registered under.
    pub fn identity(
        &self,
        index: usize,
    ) -> Option<&HandleId> {
        self.entries.get(index).map(|entry| &entry.identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SubscriberHandle>> {
        self.entries.iter().map(|entry| &entry.handle)
    }

    /// Ends the broadcast.
    pub fn finish(self) {
        drop(self)
    }
}

impl Drop for BroadcastSnapshot {
    fn drop(&mut self) {
        let depth = release_broadcast(&self.registry.active_broadcasts);
        trace!(depth, "finish broadcast");
    }
}

/// Records a started broadcast and returns the new outstanding count.
pub(crate) fn acquire_broadcast(counter: &AtomicUsize) -> usize {
    counter.fetch_add(1, Ordering::AcqRel) + 1
}

/// Records a finished broadcast and returns the remaining outstanding count.
///
/// # Panics
/// When no broadcast is outstanding. A finish without a matching begin means
/// the caller broke the pairing contract and the registry can no longer be
/// trusted.
pub(crate) fn release_broadcast(counter: &AtomicUsize) -> usize {
    match counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1)) {
        Ok(previous) => previous - 1,
        Err(_) => panic!("finish_broadcast called without a matching begin_broadcast"),
    }
}
