//! ドメイン層のエラー型

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username is {length} characters long (max {max})")]
    UsernameTooLong { length: usize, max: usize },
}

/// Repository 操作のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// 接続がすでにどこかの Room に所属している
    #[error("connection '{0}' already holds a membership")]
    AlreadyMember(String),

    #[error("connection '{0}' is not a member of any room")]
    MemberNotFound(String),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode message: {0}")]
    EncodeFailed(String),
}
