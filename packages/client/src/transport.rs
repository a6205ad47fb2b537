//! Transport abstraction for the session loop.
//!
//! A [`Connector`] opens a connection and hands back a [`TransportHandle`]:
//! a sender for outbound frames and a receiver for inbound events. The
//! session loop never touches the socket directly, so tests can plug in
//! in-memory connectors.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::error::ClientError;

/// セッションからトランスポートへ送るフレーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    /// 接続を閉じる
    Close,
}

/// トランスポートからセッションへ届くイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// テキストフレームを受信した
    Message(String),
    /// 通信エラー（接続が続くかどうかは `Closed` で判断する）
    Error(String),
    /// 接続が閉じられた
    Closed,
}

/// 開いた接続へのハンドル
#[derive(Debug)]
pub struct TransportHandle {
    pub outbound: mpsc::UnboundedSender<OutboundFrame>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

#[async_trait]
pub trait Connector: Send + Sync {
    /// `url` に接続する
    async fn connect(&self, url: &str) -> Result<TransportHandle, ClientError>;
}

/// tokio-tungstenite を使った Connector 実装
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<TransportHandle, ClientError> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        tracing::debug!("WebSocket connected to {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<OutboundFrame>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<TransportEvent>();

        // Spawn a task to write outbound frames to the WebSocket
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                match frame {
                    OutboundFrame::Text(text) => {
                        if let Err(e) = write.send(Message::Text(text.into())).await {
                            tracing::warn!("Failed to send frame: {}", e);
                            break;
                        }
                    }
                    OutboundFrame::Close => {
                        let _ = write.close().await;
                        break;
                    }
                }
            }
        });

        // Spawn a task to forward inbound frames to the session
        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if inbound_tx
                            .send(TransportEvent::Message(text.to_string()))
                            .is_err()
                        {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Server closed the connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let _ = inbound_tx.send(TransportEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = inbound_tx.send(TransportEvent::Closed);
        });

        Ok(TransportHandle {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}
