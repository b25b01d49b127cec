//! Per-room ordering of state changes and their broadcasts.
//!
//! A change to a room and the events announcing it must reach members in the
//! same order the changes were applied. Otherwise a late `user_list` from a
//! leave could overwrite the list from a later join, or an `object_added`
//! could arrive after the `canvas_cleared` that already removed it. Each room
//! gets its own gate; changes in different rooms never wait on each other.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::RoomKey;

#[derive(Default)]
pub struct RoomSequencer {
    gates: Mutex<HashMap<RoomKey, Arc<Mutex<()>>>>,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold the returned guard across the mutation and every broadcast of it.
    pub async fn lock(&self, key: &RoomKey) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock().await;
            gates.entry(key.clone()).or_default().clone()
        };
        gate.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_room_is_serialized() {
        // テスト項目: 同じルームのゲートは同時に一人しか保持できない
        // given (前提条件):
        let sequencer = Arc::new(RoomSequencer::new());
        let key: RoomKey = "whiteboard:abc".parse().unwrap();
        let guard = sequencer.lock(&key).await;

        // when (操作):
        let contender = {
            let sequencer = sequencer.clone();
            let key = key.clone();
            tokio::spawn(async move {
                let _guard = sequencer.lock(&key).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // then (期待する結果):
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_rooms_do_not_block() {
        // テスト項目: 別ルームのゲートは互いに待たない
        // given (前提条件):
        let sequencer = RoomSequencer::new();
        let _board = sequencer.lock(&"whiteboard:abc".parse().unwrap()).await;

        // when (操作):
        let chat = tokio::time::timeout(
            Duration::from_millis(100),
            sequencer.lock(&"chat:abc".parse().unwrap()),
        )
        .await;

        // then (期待する結果):
        assert!(chat.is_ok());
    }
}
