//! ゲートウェイが参加者へ通知するイベント
//!
//! ワイヤ形式（JSON）への変換は Infrastructure 層が担当します。

use super::{
    entity::RosterMember,
    value_object::{ExerciseId, Timestamp},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// join した本人への応答。`roster` は本人が加わる前の名簿。
    Joined {
        exercise_id: ExerciseId,
        roster: Vec<RosterMember>,
    },
    /// 誰かが参加した。`roster` は更新後の名簿。
    UserJoined {
        exercise_id: ExerciseId,
        member: RosterMember,
        roster: Vec<RosterMember>,
    },
    /// 誰かが退出した。`roster` は残りの参加者の名簿。
    UserLeft {
        exercise_id: ExerciseId,
        member: RosterMember,
        roster: Vec<RosterMember>,
    },
    SolutionUpdated {
        exercise_id: ExerciseId,
        author: RosterMember,
        solution: String,
        timestamp: Timestamp,
    },
    NewComment {
        exercise_id: ExerciseId,
        author: RosterMember,
        comment: String,
        timestamp: Timestamp,
    },
    Pong,
}
