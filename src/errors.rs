//! Notification Service Error Hierarchy
//!
//! Defines the error types surfaced by the callback registry, the broadcast
//! path and the service lifecycle. Conditions that are deliberately not
//! errors (unknown subscriber on unregister, duplicate registration) are
//! reported through return values and log lines instead.

use config::ConfigError;
use tokio::task::JoinError;

use crate::HandleId;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Subscriber registration and remote callback failures
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// Service lifecycle failures
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// A remote call to a subscriber failed at the transport level
    #[error("Communication with subscriber {identity:?} failed: {reason}")]
    CommunicationFault {
        identity: Option<HandleId>,
        reason: String,
    },

    /// The transport could not supply a stable identity token for the handle
    #[error("Subscriber handle carries no identity token")]
    MissingIdentity,

    /// The subscriber's owning process is already gone
    #[error("Subscriber {0} is dead")]
    SubscriberDead(HandleId),

    /// The registry has been killed and accepts no new registrations
    #[error("Callback registry is closed")]
    RegistryClosed,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Service is already started")]
    AlreadyStarted,

    /// The background producer task panicked or was aborted
    #[error("Producer task failed: {0}")]
    ProducerJoin(#[from] JoinError),
}

impl CallbackError {
    pub fn communication(
        identity: Option<HandleId>,
        reason: impl Into<String>,
    ) -> Self {
        CallbackError::CommunicationFault {
            identity,
            reason: reason.into(),
        }
    }
}
