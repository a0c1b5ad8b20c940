//! Mock CAN 适配器
//!
//! 无硬件依赖，记录每次发送的帧和时间，用于测试和 CLI dry-run。
//!
//! `MockBus` 是共享的观察端，`MockCanAdapter` 是交给驱动的发送端；
//! 适配器被 drop 时记录"关闭"时间，用于验证关闭之后没有任何发送。

use crate::{CanAdapter, CanError, IntermodeFrame};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// 一次成功发送的记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentFrame {
    pub frame: IntermodeFrame,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockBusState {
    sent: Vec<SentFrame>,
    failures_pending: usize,
    failed_sends: usize,
    closed_at: Option<Instant>,
}

/// Mock 总线（观察端，可 Clone）
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<MockBusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建连接到此总线的适配器
    pub fn adapter(&self) -> MockCanAdapter {
        MockCanAdapter {
            state: self.state.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockBusState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 让接下来的 `n` 次发送失败
    pub fn fail_next(&self, n: usize) {
        self.lock().failures_pending = n;
    }

    /// 所有成功发送的记录
    pub fn sent(&self) -> Vec<SentFrame> {
        self.lock().sent.clone()
    }

    /// 所有成功发送的帧
    pub fn sent_frames(&self) -> Vec<IntermodeFrame> {
        self.lock().sent.iter().map(|s| s.frame).collect()
    }

    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    pub fn last_sent(&self) -> Option<IntermodeFrame> {
        self.lock().sent.last().map(|s| s.frame)
    }

    /// 注入失败导致的发送次数
    pub fn failed_sends(&self) -> usize {
        self.lock().failed_sends
    }

    /// 适配器被 drop 的时间
    pub fn closed_at(&self) -> Option<Instant> {
        self.lock().closed_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at().is_some()
    }

    /// 等待直到满足条件或超时（1ms 轮询）
    pub fn wait_until(
        &self,
        timeout: Duration,
        mut predicate: impl FnMut(&[SentFrame]) -> bool,
    ) -> bool {
        let start = Instant::now();
        loop {
            if predicate(&self.lock().sent) {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Mock CAN 适配器（发送端）
#[derive(Debug)]
pub struct MockCanAdapter {
    state: Arc<Mutex<MockBusState>>,
}

impl MockCanAdapter {
    /// 创建独立的适配器及其观察端
    pub fn pair() -> (Self, MockBus) {
        let bus = MockBus::new();
        (bus.adapter(), bus)
    }
}

impl CanAdapter for MockCanAdapter {
    fn send(&mut self, frame: IntermodeFrame) -> Result<(), CanError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.closed_at.is_some() {
            return Err(CanError::NotStarted);
        }
        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            state.failed_sends += 1;
            return Err(CanError::Io(std::io::Error::other("injected send failure")));
        }
        state.sent.push(SentFrame {
            frame,
            at: Instant::now(),
        });
        Ok(())
    }
}

impl Drop for MockCanAdapter {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed_at.get_or_insert_with(Instant::now);
    }
}
