//! UseCase: 接続の終了
//!
//! WebSocket が閉じられたとき（正常・異常を問わず）に呼び出されます。
//! 参加中であれば leave と同じ効果を、登録されている送信者情報で発生させます。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomRepository};

use super::{
    RelaySequencer,
    presence::{self, Departure},
};

pub struct CloseConnectionUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: RelaySequencer,
}

impl CloseConnectionUseCase {
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

    /// 接続を終了する
    ///
    /// # Returns
    ///
    /// * `Some(Departure)` - 参加中だった場合の退出結果
    /// * `None` - どの Room にも参加していなかった（すでに退出済み・期限切れで削除済みを含む）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<Departure> {
        let departure = {
            let _guard = self.sequencer.enter().await;
            presence::remove_and_announce(
                self.repository.as_ref(),
                self.message_pusher.as_ref(),
                connection_id,
            )
            .await
        };

        self.message_pusher.unregister_client(connection_id).await;
        tracing::info!("Connection '{}' closed", connection_id);

        departure
    }
}
