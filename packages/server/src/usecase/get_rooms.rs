//! UseCase: Room 一覧の取得

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 参加者のいる Room を exercise_id の昇順で返す
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.get_rooms().await
    }
}
