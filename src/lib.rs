//! Cross-process item notification service.
//!
//! A server process owns an [`ItemStore`] that a background [`ItemProducer`]
//! keeps appending to. Remote subscribers register through the
//! [`ItemManager`] surface and are kept in a [`CallbackRegistry`] that
//! resolves them by identity token, prunes them when their process dies and
//! hands out paired broadcast snapshots to the [`Broadcaster`].
mod broadcast;
mod config;
mod errors;
mod item;
mod producer;
mod registry;
mod service;
mod transport;

pub use broadcast::*;
pub use self::config::*;
pub use errors::*;
pub use item::*;
pub use producer::*;
pub use registry::*;
pub use service::*;
pub use transport::*;
