//! 协作式取消
//!
//! `CancelToken` 由驱动实例持有一份，发布线程和所有调用方线程共享。
//! 取消时丢弃内部唯一的 `Sender`，所有阻塞在 `receiver()` 上的 `select!`
//! 立即看到 Disconnected，因此取消能同时唤醒发布线程和阻塞中的 `push`。

use crate::error::DriverError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    /// 取消前为 `Some`；从不发送，只在取消时被 drop
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

/// 取消令牌（可 Clone，所有克隆共享同一状态）
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// 触发取消（幂等）
    ///
    /// 返回 `true` 表示本次调用完成了取消，`false` 表示之前已取消。
    pub fn cancel(&self) -> bool {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return false;
        }
        let trigger = self
            .inner
            .trigger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(trigger);
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// 取消信号接收端
    ///
    /// 永远不会收到消息；取消后 `recv` 返回 `Err(RecvError)`。
    /// 用于 `crossbeam_channel::select!`。
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.signal
    }

    /// 睡眠 `timeout`，期间被取消则提前返回 `Err(DriverError::Cancelled)`
    pub fn wait_timeout(&self, timeout: Duration) -> Result<(), DriverError> {
        if self.is_cancelled() {
            return Err(DriverError::Cancelled);
        }
        match self.inner.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(DriverError::Cancelled),
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
