//! UseCase: Room 詳細の取得

use std::sync::Arc;

use crate::domain::{ExerciseId, Room, RoomRepository};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, exercise_id: ExerciseId) -> Result<Room, GetRoomDetailError> {
        self.repository
            .get_room(exercise_id)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound(exercise_id))
    }
}
