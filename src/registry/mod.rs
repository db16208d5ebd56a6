//! Liveness-aware registry of remote subscriber handles.
//!
//! Subscribers arrive as freshly marshaled proxies on every call, so every
//! lookup is resolved through the identity token the transport attaches to a
//! handle (see [`same_subscriber`]). Entries leave the registry on explicit
//! unregistration or when the transport reports that the owning process died.
//! Iteration happens over paired broadcast snapshots that are decoupled from
//! concurrent mutation.
mod callback_registry;
mod handle;
mod identity;
mod snapshot;

pub use callback_registry::*;
pub use handle::*;
pub use identity::*;
pub use snapshot::*;

#[cfg(test)]
mod callback_registry_test;
