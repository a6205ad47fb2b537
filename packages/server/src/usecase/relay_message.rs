//! UseCase: 解答の更新・コメントの中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - update-solution / comment を同じ Room の他の参加者へ中継する処理
//!
//! ### なぜこのテストが必要か
//! - 送信者自身には届かず、他の全参加者に届くことを保証
//! - 別の Room へ漏れないことを保証
//! - 中継されるメッセージの送信者情報が join 時の情報であることを保証
//! - 同じ送信者からのメッセージの順序が保たれることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 人以上の Room での中継
//! - 異常系：参加していない接続からの送信、別の Room 宛ての送信
//! - エッジケース：参加者が送信者だけの Room
//! - Mock を使用したテスト：ブロードキャスト失敗時のエラー

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::domain::{
    ConnectionId, ExerciseId, GatewayEvent, MessagePusher, RoomRepository, Timestamp,
};

use super::{RelaySequencer, error::RelayError};

/// 中継するメッセージの本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayPayload {
    /// update-solution
    Solution(String),
    /// comment
    Comment(String),
}

impl RelayPayload {
    fn kind(&self) -> &'static str {
        match self {
            RelayPayload::Solution(_) => "solution",
            RelayPayload::Comment(_) => "comment",
        }
    }
}

pub struct RelayMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sequencer: RelaySequencer,
    clock: Arc<dyn Clock>,
}

impl RelayMessageUseCase {
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

    /// メッセージを中継する
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - 中継先の接続（登録順、送信者を除く）
    /// * `Err(RelayError)` - 送信者が参加者でない、宛先の Room が異なる、またはブロードキャスト失敗
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        exercise_id: ExerciseId,
        payload: RelayPayload,
    ) -> Result<Vec<ConnectionId>, RelayError> {
        let _guard = self.sequencer.enter().await;

        let membership = self
            .repository
            .find_membership(&connection_id)
            .await
            .ok_or(RelayError::NotAMember)?;
        if membership.exercise_id != exercise_id {
            return Err(RelayError::RoomMismatch {
                requested: exercise_id,
                actual: membership.exercise_id,
            });
        }

        let targets = self
            .repository
            .get_room(exercise_id)
            .await
            .map(|room| room.connection_ids_except(&connection_id))
            .unwrap_or_default();

        tracing::debug!(
            "Relaying {} from user {} to {} member(s) of room {}",
            payload.kind(),
            membership.member.user_id,
            targets.len(),
            exercise_id
        );

        if targets.is_empty() {
            return Ok(targets);
        }

        let author = membership.member.roster_member();
        let timestamp = Timestamp::new(self.clock.now_millis());
        let event = match payload {
            RelayPayload::Solution(solution) => GatewayEvent::SolutionUpdated {
                exercise_id,
                author,
                solution,
                timestamp,
            },
            RelayPayload::Comment(comment) => GatewayEvent::NewComment {
                exercise_id,
                author,
                comment,
                timestamp,
            },
        };

        self.message_pusher
            .broadcast(targets.clone(), &event)
            .await
            .map_err(|e| RelayError::BroadcastFailed(e.to_string()))?;

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Member, MockMessagePusher, MessagePushError, UserId, Username},
        infrastructure::repository::InMemoryRoomRepository,
        usecase::test_support::{Harness, START_MILLIS, drain},
    };
    use atelier_shared::{protocol::ServerEnvelope, time::FixedClock};

    fn create_usecase(harness: &Harness) -> RelayMessageUseCase {
        RelayMessageUseCase::new(
            harness.repository.clone(),
            harness.message_pusher.clone(),
            harness.sequencer.clone(),
            harness.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_relay_reaches_others_but_not_sender() {
        // テスト項目: 中継は送信者以外の全参加者に届き、送信者には届かない
        // given (前提条件):
        let harness = Harness::new();
        let mut connections = harness
            .seat(&[(1, "alice"), (2, "bob"), (3, "charlie")], 42)
            .await;
        let usecase = create_usecase(&harness);
        let alice = connections[0].0;
        harness.clock.advance(1_500);

        // when (操作):
        let targets = usecase
            .execute(
                alice,
                ExerciseId::new(42),
                RelayPayload::Solution("x=1".to_string()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(targets, vec![connections[1].0, connections[2].0]);
        assert!(drain(&mut connections[0].1).is_empty());
        for (_, rx) in connections.iter_mut().skip(1) {
            let received = drain(rx);
            assert_eq!(received.len(), 1);
            match &received[0] {
                ServerEnvelope::SolutionUpdated(relayed) => {
                    assert_eq!(relayed.user_id, 1);
                    assert_eq!(relayed.username, "alice");
                    assert_eq!(relayed.exercise_id, 42);
                    assert_eq!(relayed.solution, "x=1");
                    assert_eq!(relayed.timestamp, START_MILLIS + 1_500);
                }
                other => panic!("unexpected envelope: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_relay_does_not_cross_rooms() {
        // テスト項目: 別の Room の参加者にはコメントが届かない
        // given (前提条件):
        let harness = Harness::new();
        let mut room_a = harness.seat(&[(1, "alice"), (2, "bob")], 1).await;
        let mut room_b = harness.seat(&[(3, "charlie")], 2).await;
        let usecase = create_usecase(&harness);

        // when (操作):
        usecase
            .execute(
                room_a[0].0,
                ExerciseId::new(1),
                RelayPayload::Comment("hello".to_string()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let bob_received = drain(&mut room_a[1].1);
        assert_eq!(bob_received.len(), 1);
        assert!(matches!(bob_received[0], ServerEnvelope::NewComment(_)));
        assert!(drain(&mut room_b[0].1).is_empty());
    }

    #[tokio::test]
    async fn test_relay_preserves_sender_order() {
        // テスト項目: 同じ送信者からのメッセージは送信順に届く
        // given (前提条件):
        let harness = Harness::new();
        let mut connections = harness.seat(&[(1, "alice"), (2, "bob")], 42).await;
        let usecase = create_usecase(&harness);
        let alice = connections[0].0;

        // when (操作):
        for i in 0..20 {
            usecase
                .execute(
                    alice,
                    ExerciseId::new(42),
                    RelayPayload::Comment(format!("comment {}", i)),
                )
                .await
                .unwrap();
        }

        // then (期待する結果):
        let comments: Vec<String> = drain(&mut connections[1].1)
            .into_iter()
            .map(|envelope| match envelope {
                ServerEnvelope::NewComment(relayed) => relayed.comment,
                other => panic!("unexpected envelope: {:?}", other),
            })
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("comment {}", i)).collect();
        assert_eq!(comments, expected);
    }

    #[tokio::test]
    async fn test_relay_from_inert_connection_is_rejected() {
        // テスト項目: join していない接続からの送信はどこにも届かない
        // given (前提条件):
        let harness = Harness::new();
        let mut connections = harness.seat(&[(1, "alice")], 42).await;
        let usecase = create_usecase(&harness);
        let (inert, _rx) = harness.connect().await;

        // when (操作):
        let result = usecase
            .execute(
                inert,
                ExerciseId::new(42),
                RelayPayload::Comment("hi".to_string()),
            )
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RelayError::NotAMember));
        assert!(drain(&mut connections[0].1).is_empty());
    }

    #[tokio::test]
    async fn test_relay_to_other_room_is_rejected() {
        // テスト項目: 所属していない Room 宛てのメッセージは中継されない
        // given (前提条件):
        let harness = Harness::new();
        let mut room_a = harness.seat(&[(1, "alice")], 1).await;
        let mut room_b = harness.seat(&[(2, "bob")], 2).await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let result = usecase
            .execute(
                room_a[0].0,
                ExerciseId::new(2),
                RelayPayload::Solution("x".to_string()),
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RelayError::RoomMismatch {
                requested: ExerciseId::new(2),
                actual: ExerciseId::new(1),
            })
        );
        assert!(drain(&mut room_a[0].1).is_empty());
        assert!(drain(&mut room_b[0].1).is_empty());
    }

    #[tokio::test]
    async fn test_relay_in_single_member_room() {
        // テスト項目: 送信者しかいない Room では誰にも送らずに成功する
        // given (前提条件):
        let harness = Harness::new();
        let mut connections = harness.seat(&[(1, "alice")], 42).await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let targets = usecase
            .execute(
                connections[0].0,
                ExerciseId::new(42),
                RelayPayload::Comment("alone".to_string()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert!(targets.is_empty());
        assert!(drain(&mut connections[0].1).is_empty());
    }

    #[tokio::test]
    async fn test_relay_broadcast_failure() {
        // テスト項目: ブロードキャストに失敗した場合はエラーが返される（Mock 使用）
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::new());
        let sender = ConnectionId::from_uuid(uuid::Uuid::new_v4());
        let receiver = ConnectionId::from_uuid(uuid::Uuid::new_v4());
        for (connection_id, user_id, username) in [(sender, 1, "alice"), (receiver, 2, "bob")] {
            repository
                .add_member(
                    ExerciseId::new(42),
                    Member::new(
                        connection_id,
                        UserId::new(user_id),
                        Username::new(username.to_string()).unwrap(),
                        Timestamp::new(START_MILLIS),
                    ),
                )
                .await
                .unwrap();
        }

        let mut mock_pusher = MockMessagePusher::new();
        mock_pusher
            .expect_broadcast()
            .withf(move |targets, event| {
                targets == &vec![receiver] && matches!(event, GatewayEvent::NewComment { .. })
            })
            .times(1)
            .returning(|_, _| Err(MessagePushError::PushFailed("channel closed".to_string())));

        let usecase = RelayMessageUseCase::new(
            repository,
            Arc::new(mock_pusher),
            RelaySequencer::new(),
            Arc::new(FixedClock::new(START_MILLIS)),
        );

        // when (操作):
        let result = usecase
            .execute(
                sender,
                ExerciseId::new(42),
                RelayPayload::Comment("hi".to_string()),
            )
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(RelayError::BroadcastFailed(_))));
    }
}
