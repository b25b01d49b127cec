//! UseCase 層: 接続・join・イベント処理・切断、それと HTTP から見るルーム情報

mod connect_participant;
mod disconnect_participant;
mod error;
mod get_room_detail;
mod get_rooms;
mod handle_event;
mod join_room;
mod sequencer;
mod session;
#[cfg(test)]
mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::SessionError;
pub use get_room_detail::{GetRoomDetailUseCase, RoomDetail};
pub use get_rooms::{GetRoomsUseCase, RoomOverview};
pub use handle_event::HandleEventUseCase;
pub use join_room::JoinRoomUseCase;
pub use sequencer::RoomSequencer;
pub use session::{Session, SessionState};
