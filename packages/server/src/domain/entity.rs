//! Entity 定義
//!
//! - `Member`: 1 つの接続が 1 つの Room に参加している状態
//! - `Room`: 演習ごとの参加者の集合

use serde::Serialize;

use super::value_object::{ConnectionId, ExerciseId, Timestamp, UserId, Username};

/// Room の参加者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub username: Username,
    /// join を受け付けた時刻
    pub joined_at: Timestamp,
    /// 最後にこの接続からフレームを受信した時刻
    pub last_seen: Timestamp,
}

impl Member {
    pub fn new(
        connection_id: ConnectionId,
        user_id: UserId,
        username: Username,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            user_id,
            username,
            joined_at,
            last_seen: joined_at,
        }
    }

    pub fn roster_member(&self) -> RosterMember {
        RosterMember {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}

/// 名簿の 1 行（接続ハンドルを含まない公開用の情報）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RosterMember {
    pub user_id: UserId,
    pub username: Username,
}

/// 演習ごとの Room
///
/// 参加者は登録順に保持され、ブロードキャストもこの順序で行われます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub exercise_id: ExerciseId,
    pub members: Vec<Member>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(exercise_id: ExerciseId, created_at: Timestamp) -> Self {
        Self {
            exercise_id,
            members: Vec::new(),
            created_at,
        }
    }

    /// 参加者を追加する。同じ接続の古い参加情報があれば置き換える。
    pub fn add_member(&mut self, member: Member) {
        self.members
            .retain(|existing| existing.connection_id != member.connection_id);
        self.members.push(member);
    }

    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|member| &member.connection_id == connection_id)?;
        Some(self.members.remove(index))
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| &member.connection_id == connection_id)
    }

    pub fn member_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut Member> {
        self.members
            .iter_mut()
            .find(|member| &member.connection_id == connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 指定した接続以外の全参加者の接続ハンドル（登録順）
    pub fn connection_ids_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.members
            .iter()
            .map(|member| member.connection_id)
            .filter(|connection_id| connection_id != exclude)
            .collect()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.members
            .iter()
            .map(|member| member.connection_id)
            .collect()
    }

    /// 現在の名簿
    ///
    /// 登録順。同じユーザーが複数の接続で参加している場合は最初の 1 件だけを残す。
    pub fn roster(&self) -> Vec<RosterMember> {
        let mut roster: Vec<RosterMember> = Vec::with_capacity(self.members.len());
        for member in &self.members {
            if !roster.iter().any(|entry| entry.user_id == member.user_id) {
                roster.push(member.roster_member());
            }
        }
        roster
    }
}
