//! Session configuration and endpoint resolution.

use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 500;

/// 1 つの演習セッションの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// WebSocket エンドポイント（例: `ws://127.0.0.1:8080/ws`）
    pub url: String,
    pub user_id: u64,
    pub username: String,
    pub exercise_id: u64,
    /// 再接続までの待ち時間
    pub reconnect_interval: Duration,
    /// 再接続の最大回数（最初の接続は含まない）
    pub max_reconnect_attempts: u32,
    /// ping を送る間隔
    pub keepalive_interval: Duration,
    /// アクティビティログに保持する件数
    pub activity_capacity: usize,
}

impl SessionConfig {
    pub fn new(
        url: impl Into<String>,
        user_id: u64,
        username: impl Into<String>,
        exercise_id: u64,
    ) -> Self {
        Self {
            url: url.into(),
            user_id,
            username: username.into(),
            exercise_id,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
        }
    }
}

/// アプリケーションの origin から WebSocket エンドポイントを求める
///
/// `http://host` は `ws://host/ws`、`https://host` は `wss://host/ws` になる。
/// origin にパスが含まれていても無視する。
pub fn endpoint_url(origin: &str) -> Result<String, ClientError> {
    let origin = origin.trim();
    let (scheme, rest) = if let Some(rest) = origin.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = origin.strip_prefix("http://") {
        ("ws", rest)
    } else if let Some(rest) = origin.strip_prefix("wss://") {
        ("wss", rest)
    } else if let Some(rest) = origin.strip_prefix("ws://") {
        ("ws", rest)
    } else {
        return Err(ClientError::InvalidOrigin(origin.to_string()));
    };

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(ClientError::InvalidOrigin(origin.to_string()));
    }

    Ok(format!("{}://{}/ws", scheme, host))
}
