//! Item payload and the shared item store.
mod store;
pub use store::*;


use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Immutable payload shared between the server and its subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub label: String,
}

impl Item {
    pub fn new(
        id: u64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "[id:{}, label:{}]", self.id, self.label)
    }
}
