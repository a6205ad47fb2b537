//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - WebSocket の `UnboundedSender` を管理
//! - GatewayEvent をワイヤ形式（JSON）に変換してクライアントへ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信はチャンネルへの書き込みだけなので、ネットワーク I/O を待つことはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use atelier_shared::protocol::ServerEnvelope;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, GatewayEvent, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録中の接続数
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

/// GatewayEvent を JSON 文字列に変換
pub fn encode_event(event: &GatewayEvent) -> Result<String, MessagePushError> {
    let envelope = ServerEnvelope::from(event.clone());
    serde_json::to_string(&envelope).map_err(|e| MessagePushError::EncodeFailed(e.to_string()))
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &GatewayEvent,
    ) -> Result<(), MessagePushError> {
        let content = encode_event(event)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(content)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &GatewayEvent,
    ) -> Result<(), MessagePushError> {
        if targets.is_empty() {
            return Ok(());
        }
        let content = encode_event(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(content.clone()) {
                        tracing::warn!("Failed to push message to connection '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted message to connection '{}'", target);
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(())
    }
}
