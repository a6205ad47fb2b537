//! Room を変更する処理の直列化
//!
//! join / leave / 中継 / 切断 / 期限切れ削除は、登録簿の変更と
//! それに伴うブロードキャストをこのロックの内側で行います。
//! これにより、ブロードキャストに使う名簿は必ずその変更で得られた名簿になり、
//! 同じ Room に対する操作の効果が交錯しません。
//!
//! ブロードキャストはチャンネルへの書き込みだけなので、ロック中に
//! ネットワーク I/O を待つことはありません。

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct RelaySequencer {
    lock: Arc<Mutex<()>>,
}

impl RelaySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直列化区間に入る。返されたガードを破棄すると区間を抜ける。
    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}
