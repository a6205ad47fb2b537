//! UseCase: Room への参加（join）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加者の登録、本人への joined 応答、他の参加者への user-joined 通知
//!
//! ### なぜこのテストが必要か
//! - N 人目の参加者に返す名簿が、それまでの N-1 人と一致することを保証
//! - 別の Room への通知が漏れないことを保証
//! - 同じ接続での再 join が古い参加情報を置き換えることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：空の Room への参加、既存の Room への参加
//! - エッジケース：同じ接続で別の Room に join し直す、同じ Room に join し直す

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    ConnectionId, ExerciseId, GatewayEvent, Member, Membership, MessagePusher, RoomRepository,
    RosterMember, Timestamp, UserId, Username,
};

use super::{RelaySequencer, error::JoinError, presence};

/// join メッセージから取り出した、検証済みの参加要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub user_id: UserId,
    pub username: Username,
    pub exercise_id: ExerciseId,
}

/// join の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// 本人に joined で返した名簿（本人が加わる前）
    pub previous_roster: Vec<RosterMember>,
    /// 更新後の名簿
    pub roster: Vec<RosterMember>,
    /// user-joined を通知した接続（登録順）
    pub notified: Vec<ConnectionId>,
    /// この join で置き換えられた、同じ接続の古い参加情報
    pub superseded: Option<Membership>,
}

/// Room への参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: RelaySequencer,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sequencer: RelaySequencer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sequencer,
            clock,
        }
    }

    /// join を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - join を送ってきた接続
    /// * `request` - 検証済みの参加要求
    ///
    /// # Returns
    ///
    /// * `Ok(JoinOutcome)` - 参加成功
    /// * `Err(JoinError)` - 登録失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinOutcome, JoinError> {
        let _guard = self.sequencer.enter().await;
        let exercise_id = request.exercise_id;

        // 1. 同じ接続の古い参加情報を取り除く
        let superseded = match self.repository.find_membership(&connection_id).await {
            // 別の Room からの移動: 元の Room には user-left を通知する
            Some(previous) if previous.exercise_id != exercise_id => presence::remove_and_announce(
                self.repository.as_ref(),
                self.message_pusher.as_ref(),
                &connection_id,
            )
            .await
            .map(|departure| departure.membership),
            // 同じ Room への再 join: 直後の user-joined が名簿を更新する
            Some(_) => self.repository.remove_member(&connection_id).await,
            None => None,
        };

        // 2. 参加前の名簿と通知対象を取得
        let (previous_roster, notified) = match self.repository.get_room(exercise_id).await {
            Some(room) => (room.roster(), room.connection_ids()),
            None => (Vec::new(), Vec::new()),
        };

        // 3. 参加者を登録
        let joined_at = Timestamp::new(self.clock.now_millis());
        let member = Member::new(connection_id, request.user_id, request.username, joined_at);
        let joined_member = member.roster_member();
        self.repository
            .add_member(exercise_id, member)
            .await
            .map_err(|e| JoinError::RegistrationFailed(e.to_string()))?;

        let roster = self
            .repository
            .get_room(exercise_id)
            .await
            .map(|room| room.roster())
            .unwrap_or_default();

        // 4. 本人に joined を返す
        let joined = GatewayEvent::Joined {
            exercise_id,
            roster: previous_roster.clone(),
        };
        if let Err(e) = self.message_pusher.push_to(&connection_id, &joined).await {
            tracing::warn!("Failed to send joined to '{}': {}", connection_id, e);
        }

        // 5. 他の参加者に user-joined を通知
        if !notified.is_empty() {
            let user_joined = GatewayEvent::UserJoined {
                exercise_id,
                member: joined_member.clone(),
                roster: roster.clone(),
            };
            if let Err(e) = self
                .message_pusher
                .broadcast(notified.clone(), &user_joined)
                .await
            {
                tracing::warn!("Failed to broadcast user-joined: {}", e);
            }
        }

        tracing::info!(
            "User {} ('{}') joined room {} (connection '{}', {} member(s))",
            joined_member.user_id,
            joined_member.username,
            exercise_id,
            connection_id,
            roster.len()
        );

        Ok(JoinOutcome {
            previous_roster,
            roster,
            notified,
            superseded,
        })
    }
}
