//! Room directory implementations.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{DirectoryError, RoomDirectory, RoomKey, RoomStatus};

/// Treats every room as active. Used when no room list is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenRoomDirectory;

#[async_trait]
impl RoomDirectory for OpenRoomDirectory {
    async fn resolve(&self, _key: &RoomKey) -> Result<RoomStatus, DirectoryError> {
        Ok(RoomStatus::Active)
    }
}

/// Fixed set of known rooms; anything not listed resolves to `Unknown`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRoomDirectory {
    rooms: HashMap<RoomKey, RoomStatus>,
}

impl InMemoryRoomDirectory {
    /// A key listed in both sets ends up inactive.
    pub fn new(
        active: impl IntoIterator<Item = RoomKey>,
        inactive: impl IntoIterator<Item = RoomKey>,
    ) -> Self {
        let mut rooms: HashMap<RoomKey, RoomStatus> = active
            .into_iter()
            .map(|key| (key, RoomStatus::Active))
            .collect();
        rooms.extend(inactive.into_iter().map(|key| (key, RoomStatus::Inactive)));
        Self { rooms }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn resolve(&self, key: &RoomKey) -> Result<RoomStatus, DirectoryError> {
        Ok(self
            .rooms
            .get(key)
            .copied()
            .unwrap_or(RoomStatus::Unknown))
    }
}
