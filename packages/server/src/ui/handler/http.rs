//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{DisplayName, RoomKey},
    infrastructure::dto::{
        http::{HealthDto, RoomDetailDto, RoomSummaryDto},
        websocket::DrawObjectDto,
    },
    ui::state::AppState,
    usecase::{RoomDetail, RoomOverview},
};
use tsudoi_shared::time::timestamp_to_jst_rfc3339;

fn names(users: Vec<DisplayName>) -> Vec<String> {
    users.into_iter().map(DisplayName::into_string).collect()
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto { status: "ok" })
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let room_summaries: Vec<RoomSummaryDto> = rooms
        .into_iter()
        .map(|RoomOverview { summary, connections }| RoomSummaryDto {
            kind: summary.key.kind.to_string(),
            id: summary.key.id.as_str().to_string(),
            users: names(summary.users),
            connections,
            object_count: summary.object_count,
            created_at: timestamp_to_jst_rfc3339(summary.created_at.value()),
        })
        .collect();

    Json(room_summaries)
}

/// Get room detail by kind and ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path((kind, room_id)): Path<(String, String)>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let key = RoomKey::from_parts(&kind, &room_id).map_err(|_| StatusCode::NOT_FOUND)?;
    let RoomDetail { room, connections } = state
        .get_room_detail_usecase
        .execute(&key)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    // Domain Model から DTO への変換
    let room_detail = RoomDetailDto {
        kind: room.key.kind.to_string(),
        id: room.key.id.as_str().to_string(),
        users: names(room.snapshot_presence()),
        connections,
        objects: room
            .snapshot_objects()
            .iter()
            .map(DrawObjectDto::from)
            .collect(),
        created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
    };
    Ok(Json(room_detail))
}
