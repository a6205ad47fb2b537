//! UseCase: 接続の受け付け
//!
//! 接続ハンドルを採番し、送信チャンネルを MessagePusher に登録します。
//! この時点ではどの Room にも所属しません（join を送るまではブロードキャストを受け取らない）。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionIdFactory, MessagePusher, PusherChannel};

pub struct OpenConnectionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl OpenConnectionUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub async fn execute(&self, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionIdFactory::generate();
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        tracing::info!("Connection '{}' accepted", connection_id);
        connection_id
    }
}
