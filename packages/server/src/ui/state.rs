//! Shared application state.

use std::sync::Arc;

use tsudoi_shared::time::Clock;

use crate::{
    domain::{BroadcastBus, EchoPolicy, RoomDirectory, RoomRepository},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, HandleEventUseCase, JoinRoomUseCase, RoomSequencer,
    },
};

/// Shared application state
///
/// Built once at startup and handed to every handler through axum's `State`.
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// HandleEventUseCase（受信イベント処理のユースケース）
    pub handle_event_usecase: Arc<HandleEventUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// BroadcastBus（エラー応答の直接送信に使う）
    pub bus: Arc<dyn BroadcastBus>,
}

impl AppState {
    /// Wire every usecase over the given collaborators.
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        bus: Arc<dyn BroadcastBus>,
        directory: Arc<dyn RoomDirectory>,
        clock: Arc<dyn Clock>,
        echo_policy: EchoPolicy,
    ) -> Self {
        let sequencer = Arc::new(RoomSequencer::new());
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            bus.clone(),
            directory,
            sequencer.clone(),
        ));

        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                bus.clone(),
                clock.clone(),
            )),
            handle_event_usecase: Arc::new(HandleEventUseCase::new(
                repository.clone(),
                bus.clone(),
                clock,
                join_room_usecase,
                sequencer.clone(),
                echo_policy,
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                repository.clone(),
                bus.clone(),
                sequencer,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone(), bus.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository, bus.clone())),
            bus,
        }
    }
}
