//! Value Object 定義
//!
//! 識別子や名前など、不変条件を持つ値を型で表現します。
//! 生成時に検証を行い、不正な値がドメイン層に入り込まないようにします。

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::ValueObjectError;

/// ユーザー名の最大長（文字数）
pub const MAX_USERNAME_CHARS: usize = 64;

/// ユーザー ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UserId(u64);

impl UserId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 演習 ID（Room のキー）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExerciseId(u64);

impl ExerciseId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザー名
///
/// 前後の空白を取り除いたうえで空でないこと、[`MAX_USERNAME_CHARS`] 文字以下であることを保証します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if length > MAX_USERNAME_CHARS {
            return Err(ValueObjectError::UsernameTooLong {
                length,
                max: MAX_USERNAME_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続ハンドル
///
/// WebSocket 接続を受け付けた時点でサーバー側が採番します。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ConnectionId の生成器
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4())
    }
}

/// Unix タイムスタンプ（UTC、ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_trimmed() {
        // テスト項目: ユーザー名の前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  alice  ".to_string();

        // when (操作):
        let result = Username::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "alice");
    }

    #[test]
    fn test_username_rejects_blank() {
        // テスト項目: 空白のみのユーザー名はエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = Username::try_from(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyUsername));
    }

    #[test]
    fn test_username_rejects_too_long() {
        // テスト項目: 最大長を超えるユーザー名はエラーになる
        // given (前提条件):
        let raw = "あ".repeat(MAX_USERNAME_CHARS + 1);

        // when (操作):
        let result = Username::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::UsernameTooLong {
                length: MAX_USERNAME_CHARS + 1,
                max: MAX_USERNAME_CHARS,
            })
        );
    }

    #[test]
    fn test_username_accepts_max_length_multibyte() {
        // テスト項目: マルチバイト文字でも文字数で長さを判定する
        // given (前提条件):
        let raw = "あ".repeat(MAX_USERNAME_CHARS);

        // when (操作):
        let result = Username::new(raw);

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_connection_id_factory_generates_unique_ids() {
        // テスト項目: 接続ハンドルは毎回異なる値が生成される
        // when (操作):
        let first = ConnectionIdFactory::generate();
        let second = ConnectionIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
    }
}
