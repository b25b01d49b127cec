//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{BroadcastError, DirectoryError, ProtocolError, RepositoryError, RoomKey};

/// Failure while serving one connection.
///
/// Only [`SessionError::Transport`] ends the connection; everything else is
/// answered with an `error` event to the sender.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("room '{0}' is not available")]
    RoomNotFound(RoomKey),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Transport(_))
    }

    /// Text for the `error` event sent back to the client.
    ///
    /// Internal faults are not described to clients.
    pub fn client_message(&self) -> String {
        match self {
            SessionError::Protocol(e) => e.to_string(),
            SessionError::RoomNotFound(key) => format!("Room '{}' not found", key),
            SessionError::Transport(_) | SessionError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::RoomNotFound(key) => SessionError::RoomNotFound(key),
            other => SessionError::Internal(other.to_string()),
        }
    }
}

impl From<DirectoryError> for SessionError {
    fn from(e: DirectoryError) -> Self {
        SessionError::Internal(e.to_string())
    }
}

impl From<BroadcastError> for SessionError {
    fn from(e: BroadcastError) -> Self {
        SessionError::Internal(e.to_string())
    }
}
