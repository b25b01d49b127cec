//! HTTP API response DTOs.

use serde::Serialize;

use super::websocket::DrawObjectDto;

/// One entry of `GET /api/rooms`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub kind: String,
    pub id: String,
    pub users: Vec<String>,
    pub connections: usize,
    pub object_count: usize,
    pub created_at: Option<String>,
}

/// Response of `GET /api/rooms/{kind}/{room_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub kind: String,
    pub id: String,
    pub users: Vec<String>,
    pub connections: usize,
    pub objects: Vec<DrawObjectDto>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
}
