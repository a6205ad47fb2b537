//! Shared application state.

use std::sync::Arc;

use atelier_shared::time::Clock;

use crate::{
    config::GatewayConfig,
    domain::{MessagePusher, RoomRepository},
    usecase::{
        CloseConnectionUseCase, EvictStaleMembersUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, KeepaliveUseCase, LeaveRoomUseCase, OpenConnectionUseCase,
        RelayMessageUseCase, RelaySequencer,
    },
};

/// Shared application state
pub struct AppState {
    /// OpenConnectionUseCase（接続受け付けのユースケース）
    pub open_connection_usecase: OpenConnectionUseCase,
    /// JoinRoomUseCase（Room 参加のユースケース）
    pub join_room_usecase: JoinRoomUseCase,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    pub leave_room_usecase: LeaveRoomUseCase,
    /// RelayMessageUseCase（解答・コメント中継のユースケース）
    pub relay_message_usecase: RelayMessageUseCase,
    /// KeepaliveUseCase（生存確認のユースケース）
    pub keepalive_usecase: KeepaliveUseCase,
    /// CloseConnectionUseCase（接続終了のユースケース）
    pub close_connection_usecase: CloseConnectionUseCase,
    /// EvictStaleMembersUseCase（期限切れ参加者削除のユースケース）
    pub evict_stale_members_usecase: EvictStaleMembersUseCase,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: GetRoomsUseCase,
    /// GetRoomDetailUseCase（Room 詳細取得のユースケース）
    pub get_room_detail_usecase: GetRoomDetailUseCase,
}

impl AppState {
    /// Repository と MessagePusher から全てのユースケースを組み立てる
    ///
    /// Room を変更するユースケースは同じ [`RelaySequencer`] を共有する。
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        config: &GatewayConfig,
    ) -> Self {
        let sequencer = RelaySequencer::new();

        Self {
            open_connection_usecase: OpenConnectionUseCase::new(message_pusher.clone()),
            join_room_usecase: JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
                clock.clone(),
            ),
            leave_room_usecase: LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
            ),
            relay_message_usecase: RelayMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
                clock.clone(),
            ),
            keepalive_usecase: KeepaliveUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            ),
            close_connection_usecase: CloseConnectionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sequencer.clone(),
            ),
            evict_stale_members_usecase: EvictStaleMembersUseCase::new(
                repository.clone(),
                message_pusher,
                sequencer,
                clock,
                config.liveness_timeout(),
            ),
            get_rooms_usecase: GetRoomsUseCase::new(repository.clone()),
            get_room_detail_usecase: GetRoomDetailUseCase::new(repository),
        }
    }
}
