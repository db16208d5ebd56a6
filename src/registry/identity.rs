use std::fmt;
use std::sync::Arc;

use super::SubscriberHandle;

/// Stable identity token of a remote callback endpoint.
///
/// The token names the endpoint itself, not the local proxy wrapping it, so
/// two proxies marshaled from the same remote object carry equal tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandleId(Arc<str>);

impl HandleId {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self(token.into())
    }

    /// Allocates a fresh random token.
    pub fn generate() -> Self {
        Self(nanoid::nanoid!().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether two handles denote the same logical subscriber.
///
/// Only identity tokens are compared. Handles without a token never match,
/// not even themselves.
pub fn same_subscriber(
    a: &dyn SubscriberHandle,
    b: &dyn SubscriberHandle,
) -> bool {
    match (a.identity(), b.identity()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Position of the first handle in `handles` that denotes the same logical
/// subscriber as `target`.
pub fn resolve<'a, I>(
    handles: I,
    target: &dyn SubscriberHandle,
) -> Option<usize>
where
    I: IntoIterator<Item = &'a Arc<dyn SubscriberHandle>>,
{
    handles
        .into_iter()
        .position(|handle| same_subscriber(handle.as_ref(), target))
}
