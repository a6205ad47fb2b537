//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ConnectionId, ExerciseId, Member, RepositoryError, Room, Timestamp};

/// 接続ハンドルと、その接続が所属している Room の組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub exercise_id: ExerciseId,
    pub member: Member,
}

/// Room Repository trait
///
/// Room の登録簿（exercise_id → 参加者の集合）へのインターフェース。
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には依存しない。
///
/// ## 不変条件
///
/// - 1 つの接続ハンドルが所属できる Room は高々 1 つ
/// - 参加者がいない Room は存在しない（最後の参加者が抜けた時点で破棄される）
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// 参加者を Room に追加する。Room がなければ作成する。
    ///
    /// 接続がすでにどこかの Room に所属している場合は `AlreadyMember` を返す。
    async fn add_member(
        &self,
        exercise_id: ExerciseId,
        member: Member,
    ) -> Result<(), RepositoryError>;

    /// 接続の参加情報を削除する。Room が空になった場合は Room も破棄する。
    async fn remove_member(&self, connection_id: &ConnectionId) -> Option<Membership>;

    /// 接続の参加情報を取得
    async fn find_membership(&self, connection_id: &ConnectionId) -> Option<Membership>;

    /// Room を取得
    async fn get_room(&self, exercise_id: ExerciseId) -> Option<Room>;

    /// 全ての Room を exercise_id の昇順で取得
    async fn get_rooms(&self) -> Vec<Room>;

    /// 参加者の最終受信時刻を更新する。参加者でなければ `false`。
    async fn touch_member(&self, connection_id: &ConnectionId, at: Timestamp) -> bool;

    /// `deadline` より前から何も受信していない参加者の接続ハンドルを取得
    async fn find_stale_members(&self, deadline: Timestamp) -> Vec<ConnectionId>;
}
