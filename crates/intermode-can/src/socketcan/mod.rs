//! SocketCAN CAN 适配器实现
//!
//! 支持 Linux 平台下的 SocketCAN，使用内核级的 CAN 通讯接口。
//!
//! ## 限制
//!
//! - **仅限 Linux 平台**：SocketCAN 是 Linux 内核特性
//! - **接口配置**：波特率等配置由系统工具（`ip link`）完成，不在应用层设置
//! - **权限要求**：可能需要 `dialout` 组权限或 `sudo`

use crate::{CanAdapter, CanError, IntermodeFrame};
use socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Socket, StandardId};
use std::io;
use std::time::Duration;
use tracing::trace;

mod interface_check;

use interface_check::check_interface_status;

/// 默认写超时，与发布周期一致：总线拥塞时单次发送最多占用一个周期
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(10);

/// SocketCAN 适配器
///
/// # 示例
///
/// ```no_run
/// use intermode_can::{CanAdapter, IntermodeFrame, SocketCanAdapter};
///
/// let mut adapter = SocketCanAdapter::new("can0").unwrap();
/// let frame = IntermodeFrame::new_standard(0x220, &[0, 0, 0x40, 0x06, 0, 0, 0, 2]);
/// adapter.send(frame).unwrap();
/// ```
#[derive(Debug)]
pub struct SocketCanAdapter {
    socket: CanSocket,
    /// 接口名称（如 "can0"）
    interface: String,
    write_timeout: Duration,
}

impl SocketCanAdapter {
    /// 绑定到 CAN 接口
    ///
    /// 在打开 socket 之前，会检查接口是否存在且已启动（UP 状态）。
    ///
    /// # 错误
    /// - `CanError::Device`: 接口不存在、未启动或无法打开
    /// - `CanError::Io`: 系统调用失败
    pub fn new(interface: impl Into<String>) -> Result<Self, CanError> {
        Self::with_write_timeout(interface, DEFAULT_WRITE_TIMEOUT)
    }

    /// 绑定到 CAN 接口，并指定写超时
    pub fn with_write_timeout(
        interface: impl Into<String>,
        write_timeout: Duration,
    ) -> Result<Self, CanError> {
        let interface = interface.into();

        if !check_interface_status(&interface)? {
            return Err(CanError::Device(format!(
                "CAN interface '{}' exists but is not UP. Please start it first:\n  sudo ip link set up {}",
                interface, interface
            )));
        }

        let socket = CanSocket::open(&interface).map_err(|e| {
            CanError::Device(format!("Failed to open CAN interface '{}': {}", interface, e))
        })?;
        socket.set_write_timeout(write_timeout).map_err(CanError::Io)?;

        trace!(
            "SocketCAN interface '{}' opened (write timeout {:?})",
            interface, write_timeout
        );

        Ok(Self {
            socket,
            interface,
            write_timeout,
        })
    }

    /// 获取接口名称
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// 获取写超时时间
    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }
}

/// IntermodeFrame -> socketcan::CanFrame
fn to_can_frame(frame: &IntermodeFrame) -> Result<CanFrame, CanError> {
    let data = frame.data_slice();
    let converted = if frame.is_extended {
        ExtendedId::new(frame.id).and_then(|id| CanFrame::new(id, data))
    } else {
        u16::try_from(frame.id)
            .ok()
            .and_then(StandardId::new)
            .and_then(|id| CanFrame::new(id, data))
    };

    converted.ok_or_else(|| {
        CanError::Device(format!(
            "Failed to create {} frame with ID 0x{:X}",
            if frame.is_extended { "extended" } else { "standard" },
            frame.id
        ))
    })
}

/// 发送失败 -> CanError
///
/// 写超时（`SO_SNDTIMEO` 到期，内核报 `EAGAIN`）单独映射为 `CanError::Timeout`，
/// 其余保留原始 `io::ErrorKind`。
fn transmit_error(e: io::Error) -> CanError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => CanError::Timeout,
        kind => CanError::Io(io::Error::new(
            kind,
            format!("SocketCAN transmit error: {}", e),
        )),
    }
}

impl CanAdapter for SocketCanAdapter {
    /// 发送帧（Fire-and-Forget）
    ///
    /// # 错误
    /// - `CanError::Device`: 创建帧失败（如 ID 无效）
    /// - `CanError::Timeout`: 写超时（发送队列满，总线拥塞或无人应答）
    /// - `CanError::Io`: 其他发送失败（如 `ENETDOWN`、`ENOBUFS`）
    fn send(&mut self, frame: IntermodeFrame) -> Result<(), CanError> {
        let can_frame = to_can_frame(&frame)?;

        self.socket.write_frame(&can_frame).map_err(transmit_error)?;

        trace!("Sent CAN frame: ID=0x{:X}, len={}", frame.id, frame.len);
        Ok(())
    }
}
