use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::trace;

use super::Item;

/// Copy-on-write item collection shared by the producer and inbound calls.
///
/// Writers publish a new vector through [`ArcSwap::rcu`], so concurrent
/// appends are never lost and readers always observe a complete vector.
/// Reads never block writers.
pub struct ItemStore {
    items: ArcSwap<Vec<Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            items: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: ArcSwap::from_pointee(items),
        }
    }

    pub fn append(
        &self,
        item: Item,
    ) {
        trace!(id = item.id, "append item");
        self.items.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(item.clone());
            next
        });
    }

    /// Appends the item built for the next free identifier (`len + 1`).
    ///
    /// The identifier is computed against the same vector the append is
    /// published over, so it cannot race with concurrent appends. `make`
    /// may run more than once under contention and must be pure.
    pub fn append_next<F>(
        &self,
        make: F,
    ) -> Item
    where
        F: Fn(u64) -> Item,
    {
        let previous = self.items.rcu(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().cloned());
            next.push(make(current.len() as u64 + 1));
            next
        });
        let item = make(previous.len() as u64 + 1);
        trace!(id = item.id, "append next item");
        item
    }

    /// Appends every item only if the store is still empty.
    ///
    /// Returns `false` when the store already held items.
    pub fn seed(
        &self,
        items: &[Item],
    ) -> bool {
        let previous = self.items.rcu(|current| {
            if current.is_empty() {
                Arc::new(items.to_vec())
            } else {
                Arc::clone(current)
            }
        });
        previous.is_empty()
    }

    /// Point-in-time owned copy, safe to hand across the process boundary.
    pub fn snapshot_all(&self) -> Vec<Item> {
        self.items.load().as_ref().clone()
    }

    pub fn len(&self) -> usize {
        self.items.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}
