//! UseCase: 応答のない参加者の削除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EvictStaleMembersUseCase::execute() メソッド
//! - 一定時間フレームを受信していない参加者の削除と user-left の通知
//!
//! ### なぜこのテストが必要か
//! - 切断を検知できなかった参加者が名簿に残り続けないことを保証
//! - 生存確認を送っている参加者が削除されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：期限切れの参加者と生きている参加者が混在する Room
//! - エッジケース：期限ちょうどの参加者、参加者がいない状態

use std::{sync::Arc, time::Duration};

use atelier_shared::time::Clock;

use crate::domain::{MessagePusher, RoomRepository, Timestamp};

use super::{
    RelaySequencer,
    presence::{self, Departure},
};

pub struct EvictStaleMembersUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: RelaySequencer,
    clock: Arc<dyn Clock>,
    liveness_timeout: Duration,
}

impl EvictStaleMembersUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: RelaySequencer,
        clock: Arc<dyn Clock>,
        liveness_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
            clock,
            liveness_timeout,
        }
    }

    /// 期限切れの参加者を削除する
    ///
    /// 削除した接続は MessagePusher からも登録解除するため、その WebSocket は閉じられる。
    pub async fn execute(&self) -> Vec<Departure> {
        let timeout_millis = i64::try_from(self.liveness_timeout.as_millis()).unwrap_or(i64::MAX);
        let deadline = Timestamp::new(self.clock.now_millis().saturating_sub(timeout_millis));

        let departures = {
            let _guard = self.sequencer.enter().await;
            let mut departures = Vec::new();
            for connection_id in self.repository.find_stale_members(deadline).await {
                if let Some(departure) = presence::remove_and_announce(
                    self.repository.as_ref(),
                    self.message_pusher.as_ref(),
                    &connection_id,
                )
                .await
                {
                    departures.push(departure);
                }
            }
            departures
        };

        for departure in &departures {
            let connection_id = departure.membership.member.connection_id;
            tracing::warn!(
                "Evicted connection '{}' (user {}) after {:?} without activity",
                connection_id,
                departure.membership.member.user_id,
                self.liveness_timeout
            );
            self.message_pusher.unregister_client(&connection_id).await;
        }

        departures
    }
}
