//! Gateway configuration.

use std::time::Duration;

pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_MISSED_KEEPALIVES: u32 = 3;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// 生存確認に関する設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// クライアントが ping を送る間隔
    pub keepalive_interval: Duration,
    /// 何回分の ping を受信しなければ参加者を削除するか
    pub missed_keepalives: u32,
    /// 期限切れの参加者を探す間隔
    pub sweep_interval: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            missed_keepalives: DEFAULT_MISSED_KEEPALIVES,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl GatewayConfig {
    /// 最後のフレームを受信してから参加者を削除するまでの時間
    pub fn liveness_timeout(&self) -> Duration {
        self.keepalive_interval
            .saturating_mul(self.missed_keepalives.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_liveness_timeout() {
        // テスト項目: デフォルトのタイムアウトは 30 秒 × 3 回
        // given (前提条件):
        let config = GatewayConfig::default();

        // when (操作):
        let timeout = config.liveness_timeout();

        // then (期待する結果):
        assert_eq!(timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_zero_missed_keepalives_counts_as_one() {
        // テスト項目: missed_keepalives が 0 でも少なくとも 1 回分は待つ
        // given (前提条件):
        let config = GatewayConfig {
            keepalive_interval: Duration::from_secs(5),
            missed_keepalives: 0,
            sweep_interval: Duration::from_secs(1),
        };

        // when (操作):
        let timeout = config.liveness_timeout();

        // then (期待する結果):
        assert_eq!(timeout, Duration::from_secs(5));
    }
}
