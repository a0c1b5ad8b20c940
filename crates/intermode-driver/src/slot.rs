//! 命令插槽（单槽汇合点）
//!
//! 容量为 0 的 crossbeam 通道：`push` 一直阻塞到发布线程取走该帧，
//! 或者取消发生。任意时刻最多只有一帧在交接中，没有排队。

use crate::cancel::CancelToken;
use crate::error::DriverError;
use crossbeam_channel::{Receiver, Sender, bounded, select};
use intermode_can::IntermodeFrame;
use std::time::Duration;

/// 创建一对插槽端点，两端共享同一个取消令牌
pub fn command_slot(cancel: CancelToken) -> (CommandSlot, SlotReceiver) {
    let (tx, rx) = bounded(0);
    (
        CommandSlot {
            tx,
            cancel: cancel.clone(),
        },
        SlotReceiver { rx, cancel },
    )
}

/// 调用方一侧（可 Clone，任意线程 push）
#[derive(Debug, Clone)]
pub struct CommandSlot {
    tx: Sender<IntermodeFrame>,
    cancel: CancelToken,
}

impl CommandSlot {
    /// 交出一帧，阻塞到发布线程接收
    ///
    /// # 错误
    /// - `DriverError::Cancelled`: 调用前或阻塞期间被取消
    /// - `DriverError::ChannelClosed`: 发布线程已退出（接收端被 drop）
    pub fn push(&self, frame: IntermodeFrame) -> Result<(), DriverError> {
        if self.cancel.is_cancelled() {
            return Err(DriverError::Cancelled);
        }
        select! {
            send(self.tx, frame) -> res => res.map_err(|_| DriverError::ChannelClosed),
            recv(self.cancel.receiver()) -> _ => Err(DriverError::Cancelled),
        }
    }
}

/// 一次等待的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEvent {
    /// 收到新帧
    Frame(IntermodeFrame),
    /// 超时，没有新帧
    Timeout,
    /// 已取消，或所有 `CommandSlot` 都已 drop
    Cancelled,
}

/// 发布线程一侧
#[derive(Debug)]
pub struct SlotReceiver {
    rx: Receiver<IntermodeFrame>,
    cancel: CancelToken,
}

impl SlotReceiver {
    /// 最多等待 `timeout`：取消、新帧、超时三者先到者胜出
    pub fn recv_timeout(&self, timeout: Duration) -> SlotEvent {
        if self.cancel.is_cancelled() {
            return SlotEvent::Cancelled;
        }
        select! {
            recv(self.cancel.receiver()) -> _ => SlotEvent::Cancelled,
            recv(self.rx) -> msg => match msg {
                Ok(frame) => SlotEvent::Frame(frame),
                Err(_) => SlotEvent::Cancelled,
            },
            default(timeout) => SlotEvent::Timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DEFAULT_PUBLISH_PERIOD;
    use intermode_protocol::DriveCommand;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_push_hands_over_to_receiver() {
        let (slot, rx) = command_slot(CancelToken::new());
        let frame = DriveCommand::drive(50.0, 0.0).to_frame();

        let handle = thread::spawn(move || slot.push(frame));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)), SlotEvent::Frame(frame));
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_push_blocks_until_taken() {
        let (slot, rx) = command_slot(CancelToken::new());
        let frame = DriveCommand::stop().to_frame();

        let start = Instant::now();
        let handle = thread::spawn(move || {
            slot.push(frame).unwrap();
            Instant::now()
        });

        thread::sleep(Duration::from_millis(30));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)), SlotEvent::Frame(frame));
        let pushed_at = handle.join().unwrap();
        assert!(pushed_at.duration_since(start) >= Duration::from_millis(30));
    }

    #[test]
    fn test_recv_timeout_without_push() {
        let (_slot, rx) = command_slot(CancelToken::new());
        let start = Instant::now();
        assert_eq!(rx.recv_timeout(Duration::from_millis(10)), SlotEvent::Timeout);
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_cancel_unblocks_push() {
        let cancel = CancelToken::new();
        let (slot, _rx) = command_slot(cancel.clone());

        let handle = thread::spawn(move || {
            let result = slot.push(DriveCommand::stop().to_frame());
            (result, Instant::now())
        });
        thread::sleep(Duration::from_millis(20));
        let cancelled_at = Instant::now();
        cancel.cancel();

        let (result, returned_at) = handle.join().unwrap();
        assert!(matches!(result, Err(DriverError::Cancelled)));
        // 阻塞中的 push 必须在一个发布周期内返回
        let latency = returned_at.duration_since(cancelled_at);
        assert!(latency < DEFAULT_PUBLISH_PERIOD, "latency {:?}", latency);
    }

    #[test]
    fn test_push_after_cancel_fails_fast() {
        let cancel = CancelToken::new();
        let (slot, _rx) = command_slot(cancel.clone());
        cancel.cancel();
        assert!(matches!(
            slot.push(DriveCommand::stop().to_frame()),
            Err(DriverError::Cancelled)
        ));
    }

    #[test]
    fn test_receiver_dropped_closes_channel() {
        let (slot, rx) = command_slot(CancelToken::new());
        drop(rx);
        assert!(matches!(
            slot.push(DriveCommand::stop().to_frame()),
            Err(DriverError::ChannelClosed)
        ));
    }

    #[test]
    fn test_senders_dropped_reports_cancelled() {
        let (slot, rx) = command_slot(CancelToken::new());
        drop(slot);
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)), SlotEvent::Cancelled);
    }
}
