//! Room directory: the collaborator that knows which rooms may be joined.
//!
//! Board records (codes, active flags) are owned by another service; the
//! engine only asks whether a room is open for joining.

use async_trait::async_trait;

use super::{DirectoryError, RoomKey};

/// Result of a directory lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Active,
    Inactive,
    Unknown,
}

impl RoomStatus {
    pub fn is_joinable(&self) -> bool {
        matches!(self, RoomStatus::Active)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn resolve(&self, key: &RoomKey) -> Result<RoomStatus, DirectoryError>;
}
