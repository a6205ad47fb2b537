//! 退出処理の共通部分
//!
//! 明示的な leave・切断・期限切れ削除・別 Room への再 join は、
//! いずれも「参加情報を削除して残りの参加者に user-left を通知する」点で同じです。
//! 呼び出し側は [`RelaySequencer`](super::RelaySequencer) の区間内で呼び出します。

use crate::domain::{ConnectionId, GatewayEvent, Membership, MessagePusher, RoomRepository};

/// 退出の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// 削除された参加情報
    pub membership: Membership,
    /// user-left を通知した接続（登録順）
    pub notified: Vec<ConnectionId>,
}

pub(super) async fn remove_and_announce(
    repository: &dyn RoomRepository,
    message_pusher: &dyn MessagePusher,
    connection_id: &ConnectionId,
) -> Option<Departure> {
    let membership = repository.remove_member(connection_id).await?;

    let (roster, notified) = match repository.get_room(membership.exercise_id).await {
        Some(room) => (room.roster(), room.connection_ids()),
        None => (Vec::new(), Vec::new()),
    };

    if !notified.is_empty() {
        let event = GatewayEvent::UserLeft {
            exercise_id: membership.exercise_id,
            member: membership.member.roster_member(),
            roster,
        };
        if let Err(e) = message_pusher.broadcast(notified.clone(), &event).await {
            tracing::warn!("Failed to broadcast user-left: {}", e);
        }
    }

    tracing::info!(
        "User {} ('{}') left room {} (connection '{}')",
        membership.member.user_id,
        membership.member.username,
        membership.exercise_id,
        connection_id
    );

    Some(Departure {
        membership,
        notified,
    })
}
