//! HTTP API response DTOs.

use atelier_shared::protocol::RosterEntry;
use serde::Serialize;

/// Room summary for `GET /api/rooms`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub exercise_id: u64,
    pub users: Vec<RosterEntry>,
    pub member_count: usize,
    pub created_at: String,
}

/// Room detail for `GET /api/rooms/{exercise_id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub exercise_id: u64,
    pub members: Vec<MemberDetailDto>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailDto {
    pub connection_id: String,
    pub user_id: u64,
    pub username: String,
    pub joined_at: String,
    pub last_seen: String,
}
