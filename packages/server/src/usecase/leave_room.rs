//! UseCase: Room からの退出（leave）

use std::sync::Arc;

use crate::domain::{ConnectionId, ExerciseId, MessagePusher, RoomRepository};

use super::{
    RelaySequencer,
    error::LeaveError,
    presence::{self, Departure},
};

pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: RelaySequencer,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: RelaySequencer,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
        }
    }

    /// leave を実行
    ///
    /// 接続は開いたままで、以降はどの Room のブロードキャストも受け取らない。
    /// `exercise_id` が接続の所属している Room と異なる場合は何もしない。
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        exercise_id: ExerciseId,
    ) -> Result<Departure, LeaveError> {
        let _guard = self.sequencer.enter().await;

        let membership = self
            .repository
            .find_membership(&connection_id)
            .await
            .ok_or(LeaveError::NotAMember)?;
        if membership.exercise_id != exercise_id {
            return Err(LeaveError::RoomMismatch {
                requested: exercise_id,
                actual: membership.exercise_id,
            });
        }

        presence::remove_and_announce(
            self.repository.as_ref(),
            self.message_pusher.as_ref(),
            &connection_id,
        )
        .await
        .ok_or(LeaveError::NotAMember)
    }
}
