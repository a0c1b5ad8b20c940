//! 发布链路指标
//!
//! 原子计数器，发布线程写，任意线程读，无锁。

use std::sync::atomic::{AtomicU64, Ordering};

/// 发布线程实时指标
#[derive(Debug, Default)]
pub struct PublishMetrics {
    /// 发布循环迭代次数（每个周期一次）
    pub ticks: AtomicU64,
    /// 成功发送的帧数
    pub frames_sent: AtomicU64,
    /// 发送失败次数（已记录日志，循环继续）
    pub send_errors: AtomicU64,
    /// 从插槽接收到的新命令数
    pub commands_received: AtomicU64,
}

impl PublishMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取快照（`Relaxed`，不同计数器之间可能有微小时间差）
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            commands_received: self.commands_received.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub ticks: u64,
    pub frames_sent: u64,
    pub send_errors: u64,
    pub commands_received: u64,
}

impl MetricsSnapshot {
    /// 发送失败率（百分比）；没有发送尝试时为 0
    pub fn send_error_rate(&self) -> f64 {
        let attempts = self.frames_sent + self.send_errors;
        if attempts == 0 {
            return 0.0;
        }
        (self.send_errors as f64 / attempts as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let metrics = PublishMetrics::new();
        metrics.ticks.fetch_add(4, Ordering::Relaxed);
        metrics.frames_sent.fetch_add(3, Ordering::Relaxed);
        metrics.send_errors.fetch_add(1, Ordering::Relaxed);
        metrics.commands_received.fetch_add(2, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                ticks: 4,
                frames_sent: 3,
                send_errors: 1,
                commands_received: 2,
            }
        );
        assert!((snapshot.send_error_rate() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_send_error_rate_empty() {
        assert_eq!(MetricsSnapshot::default().send_error_rate(), 0.0);
    }
}
