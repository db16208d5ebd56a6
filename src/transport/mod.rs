//! Transport-side collaborators.
//!
//! The registry only sees [`SubscriberHandle`](crate::SubscriberHandle)s. This
//! module holds the subscriber-facing callback surface and an in-process
//! transport that behaves like a cross-process one: every call marshals a new
//! proxy, proxies share the endpoint's identity token, and killing the
//! hosting process fires death notifications.
mod listener;
mod local;
pub use listener::*;
pub use local::*;
