//! Reconnection policy.

/// Check if the session should attempt another reconnection.
///
/// # Arguments
///
/// * `attempts_made` - Reconnections already attempted since the last successful open
/// * `max_attempts` - The maximum number of reconnection attempts allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(attempts_made: u32, max_attempts: u32) -> bool {
    attempts_made < max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_attempt_reconnect_first_attempt() {
        // テスト項目: 初回の再接続試行では再接続すべきと判定される
        // given (前提条件):
        let attempts_made = 0;

        // when (操作):
        let result = should_attempt_reconnect(attempts_made, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_one_before_limit() {
        // テスト項目: 上限の1回前の再接続試行では再接続すべきと判定される
        // given (前提条件):
        let attempts_made = 4;

        // when (操作):
        let result = should_attempt_reconnect(attempts_made, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let attempts_made = 5;

        // when (操作):
        let result = should_attempt_reconnect(attempts_made, 5);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_not_reconnect_when_disabled() {
        // テスト項目: 上限が 0 の場合は再接続しない
        // given (前提条件):
        let attempts_made = 0;

        // when (操作):
        let result = should_attempt_reconnect(attempts_made, 0);

        // then (期待する結果):
        assert!(!result);
    }
}
