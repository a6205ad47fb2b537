//! UseCase: 生存確認（ping / pong）
//!
//! 接続から何らかのフレームを受信するたびに `record_activity` で最終受信時刻を更新します。
//! `ping` にはその送信者にだけ `pong` を返します。

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{ConnectionId, GatewayEvent, MessagePusher, RoomRepository, Timestamp};

pub struct KeepaliveUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl KeepaliveUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 最終受信時刻を更新する。どの Room にも参加していない接続では `false`。
    pub async fn record_activity(&self, connection_id: &ConnectionId) -> bool {
        let now = Timestamp::new(self.clock.now_millis());
        self.repository.touch_member(connection_id, now).await
    }

    /// ping に応答する
    pub async fn execute(&self, connection_id: &ConnectionId) {
        self.record_activity(connection_id).await;
        if let Err(e) = self
            .message_pusher
            .push_to(connection_id, &GatewayEvent::Pong)
            .await
        {
            tracing::warn!("Failed to send pong to '{}': {}", connection_id, e);
        }
    }
}
