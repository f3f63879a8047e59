//! 扫描节流
//! 两次被接受扫描之间强制一个最小间隔，过快的重复直接拒绝、不做任何状态变更

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

use crate::scan::error::ScanError;

/// 扫描节流器
/// 只在扫描被接受时记录时间戳，被拒绝的尝试不影响窗口
pub struct ScanThrottle {
    min_interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl ScanThrottle {
    /// 创建节流器，间隔为 0 时关闭节流
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: Mutex::new(None),
        }
    }

    /// 关闭节流（测试与批量导入场景）
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// 检查是否允许本次扫描；允许则推进窗口
    pub async fn check(&self) -> Result<(), ScanError> {
        if self.min_interval.is_zero() {
            return Ok(());
        }

        let mut last = self.last_accepted.lock().await;
        let now = Instant::now();

        if let Some(previous) = *last {
            let elapsed = now.duration_since(previous);
            if elapsed < self.min_interval {
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    min_interval_ms = self.min_interval.as_millis() as u64,
                    "Scan rejected by throttle"
                );
                return Err(ScanError::TooFast {
                    min_interval_ms: self.min_interval.as_millis() as u64,
                });
            }
        }

        *last = Some(now);
        Ok(())
    }

    /// 重置窗口（清单重置或会话切换时）
    pub async fn reset(&self) {
        *self.last_accepted.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_throttle_rejects_fast_repeat() {
        let throttle = ScanThrottle::new(Duration::from_millis(1000));

        // 第一次扫描通过
        assert!(throttle.check().await.is_ok());

        // 0.3 秒后的第二次扫描被拒绝
        tokio::time::sleep(Duration::from_millis(300)).await;
        let result = throttle.check().await;
        assert!(matches!(result, Err(ScanError::TooFast { min_interval_ms: 1000 })));

        // 间隔满一秒后恢复
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(throttle.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_attempt_does_not_extend_window() {
        let throttle = ScanThrottle::new(Duration::from_millis(400));

        assert!(throttle.check().await.is_ok());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(throttle.check().await.is_err());

        // 距离上次被接受的扫描已超过 400ms，即使中间有被拒绝的尝试
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(throttle.check().await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_throttle_accepts_everything() {
        let throttle = ScanThrottle::disabled();
        for _ in 0..10 {
            assert!(throttle.check().await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_reset_clears_window() {
        let throttle = ScanThrottle::new(Duration::from_millis(1000));
        assert!(throttle.check().await.is_ok());

        throttle.reset().await;
        assert!(throttle.check().await.is_ok());
    }
}
