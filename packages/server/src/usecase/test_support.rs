//! UseCase テスト用の共通ヘルパー

use std::sync::Arc;

use atelier_shared::{protocol::ServerEnvelope, time::FixedClock};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionIdFactory, ExerciseId, MessagePusher, UserId, Username,
    },
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
};

use super::{JoinRequest, JoinRoomUseCase, RelaySequencer};

/// テスト開始時点の時刻（2023-01-01T00:00:00Z）
pub const START_MILLIS: i64 = 1_672_531_200_000;

pub struct Harness {
    pub repository: Arc<InMemoryRoomRepository>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    pub sequencer: RelaySequencer,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryRoomRepository::new()),
            message_pusher: Arc::new(WebSocketMessagePusher::new()),
            sequencer: RelaySequencer::new(),
            clock: Arc::new(FixedClock::new(START_MILLIS)),
        }
    }

    /// 接続を受け付けた状態を作る（まだどの Room にも参加していない）
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionIdFactory::generate();
        self.message_pusher.register_client(connection_id, tx).await;
        (connection_id, rx)
    }

    pub fn join_usecase(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.repository.clone(),
            self.message_pusher.clone(),
            self.sequencer.clone(),
            self.clock.clone(),
        )
    }

    /// 参加者を順に join させ、join 時の通知を読み捨てた状態を作る
    pub async fn seat(
        &self,
        members: &[(u64, &str)],
        exercise_id: u64,
    ) -> Vec<(ConnectionId, mpsc::UnboundedReceiver<String>)> {
        let join = self.join_usecase();
        let mut connections = Vec::new();
        for (user_id, username) in members {
            let (connection_id, rx) = self.connect().await;
            join.execute(connection_id, join_request(*user_id, username, exercise_id))
                .await
                .unwrap();
            connections.push((connection_id, rx));
        }
        for (_, rx) in connections.iter_mut() {
            drain(rx);
        }
        connections
    }
}

pub fn join_request(user_id: u64, username: &str, exercise_id: u64) -> JoinRequest {
    JoinRequest {
        user_id: UserId::new(user_id),
        username: Username::new(username.to_string()).unwrap(),
        exercise_id: ExerciseId::new(exercise_id),
    }
}

/// 受信済みのメッセージを全て取り出してデコードする
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<ServerEnvelope> {
    let mut envelopes = Vec::new();
    while let Ok(raw) = rx.try_recv() {
        envelopes.push(serde_json::from_str(&raw).unwrap());
    }
    envelopes
}

/// 名簿を (user_id, username) の組に変換する
pub fn users(envelope: &ServerEnvelope) -> Vec<(u64, String)> {
    let entries = match envelope {
        ServerEnvelope::Joined(snapshot) => &snapshot.users,
        ServerEnvelope::UserJoined(change) | ServerEnvelope::UserLeft(change) => &change.users,
        other => panic!("envelope has no roster: {:?}", other),
    };
    entries
        .iter()
        .map(|entry| (entry.user_id, entry.username.clone()))
        .collect()
}
