//! # Intermode CAN Adapter Layer
//!
//! CAN 硬件抽象层。驱动只需要"发"：底盘不回 ACK，所有发送都是 best-effort。

use thiserror::Error;

pub use intermode_protocol::IntermodeFrame;

#[cfg(target_os = "linux")]
pub mod socketcan;

#[cfg(target_os = "linux")]
pub use socketcan::SocketCanAdapter;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBus, MockCanAdapter, SentFrame};

/// CAN 适配层统一错误类型
#[derive(Error, Debug)]
pub enum CanError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(String),
    #[error("Write timeout")]
    Timeout,
    #[error("Device not started")]
    NotStarted,
}

/// CAN 发送适配器
///
/// 构造即绑定（例如 `SocketCanAdapter::new("can0")`），drop 即关闭。
/// 发布线程独占适配器，因此只要求 `Send`。
pub trait CanAdapter {
    /// 发送一帧（Fire-and-Forget，无重试）
    fn send(&mut self, frame: IntermodeFrame) -> Result<(), CanError>;
}

impl<T: CanAdapter + ?Sized> CanAdapter for Box<T> {
    fn send(&mut self, frame: IntermodeFrame) -> Result<(), CanError> {
        (**self).send(frame)
    }
}
