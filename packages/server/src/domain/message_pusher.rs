//! MessagePusher trait 定義
//!
//! 接続中のクライアントへイベントを届けるためのインターフェースです。
//! WebSocket などの具体的な送信手段は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, GatewayEvent, MessagePushError};

/// 接続ごとの送信チャンネル
///
/// UI 層が WebSocket 接続を受け付けたときに生成し、MessagePusher に登録します。
/// sender が破棄されると、その接続の送信ループが終了し WebSocket が閉じられます。
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除（チャンネルを破棄する）
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定の接続にイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &GatewayEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続にイベントを送信（`targets` の順序で送る）
    ///
    /// 一部の接続への送信失敗は許容する。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &GatewayEvent,
    ) -> Result<(), MessagePushError>;
}
