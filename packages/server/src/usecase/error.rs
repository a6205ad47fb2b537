//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::ExerciseId;

/// 参加（join）処理のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinError {
    #[error("failed to register membership: {0}")]
    RegistrationFailed(String),
}

/// 退出（leave）処理のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LeaveError {
    #[error("connection is not a member of any room")]
    NotAMember,

    #[error("leave requested for room {requested} but connection is in room {actual}")]
    RoomMismatch {
        requested: ExerciseId,
        actual: ExerciseId,
    },
}

/// 中継（update-solution / comment）処理のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("connection is not a member of any room")]
    NotAMember,

    #[error("message addressed to room {requested} but connection is in room {actual}")]
    RoomMismatch {
        requested: ExerciseId,
        actual: ExerciseId,
    },

    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
}

/// Room 詳細取得のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetRoomDetailError {
    #[error("room {0} not found")]
    RoomNotFound(ExerciseId),
}
