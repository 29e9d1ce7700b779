//! Error types for the session layer.

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A session is already registered under this code.
    #[error("session {0} already exists")]
    AlreadyExists(String),

    /// No session is registered under this code.
    #[error("session {0} not found")]
    NotFound(String),
}

/// A push notification could not be delivered.
///
/// The subscriber that produced it is pruned; the operation that
/// triggered the notification carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The client's receiving end is gone.
    #[error("subscriber disconnected")]
    Disconnected,
}
