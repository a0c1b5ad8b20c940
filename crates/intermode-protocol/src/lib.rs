//! # Intermode Protocol
//!
//! Intermode 底盘 CAN 总线驱动指令协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: CAN ID 常量定义
//! - `constants`: 协议常量定义（量化比例、限幅、刹车常量）
//! - `control`: 驱动指令帧构建与解析
//!
//! ## 字节序
//!
//! 与多数 Motorola 协议不同，Intermode 底盘使用 **小端字节序**（低位在前）。
//! 本模块提供了字节序转换工具函数。

pub mod constants;
pub mod control;
pub mod ids;

// 重新导出常用类型
pub use constants::*;
pub use control::*;
pub use ids::*;

/// CAN 2.0 帧的统一抽象
///
/// `IntermodeFrame` 是协议层和硬件层之间的中间抽象：
///
/// ```text
/// Protocol Layer (intermode-protocol)
///     ↓ DriveCommand::to_frame() 构建 / TryFrom<IntermodeFrame> 解析
/// IntermodeFrame (此类型)
///     ↓ 转换逻辑在 CAN 层实现
/// CAN Layer (intermode-can)
///     ↓ SocketCAN / Mock 适配器
/// Hardware
/// ```
///
/// - **Copy trait**：零成本复制，发布线程每 10ms 重发一次
/// - **固定 8 字节**：避免堆分配
///
/// # 示例
///
/// ```rust
/// use intermode_protocol::IntermodeFrame;
///
/// let frame = IntermodeFrame::new_standard(0x220, &[1, 2, 3, 4]);
/// assert_eq!(frame.id(), 0x220);
/// assert_eq!(frame.data_slice(), &[1, 2, 3, 4]);
/// assert!(!frame.is_extended);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntermodeFrame {
    /// CAN ID（标准帧或扩展帧）
    pub id: u32,

    /// 帧数据（固定 8 字节，未使用部分为 0）
    pub data: [u8; 8],

    /// 有效数据长度 (0-8)
    pub len: u8,

    /// 是否为扩展帧（29-bit ID）
    pub is_extended: bool,
}

impl IntermodeFrame {
    /// 创建标准帧
    pub fn new_standard(id: u16, data: &[u8]) -> Self {
        Self::new(id as u32, data, false)
    }

    /// 创建扩展帧
    pub fn new_extended(id: u32, data: &[u8]) -> Self {
        Self::new(id, data, true)
    }

    fn new(id: u32, data: &[u8], is_extended: bool) -> Self {
        let mut fixed_data = [0u8; 8];
        let len = data.len().min(8);
        fixed_data[..len].copy_from_slice(&data[..len]);

        Self {
            id,
            data: fixed_data,
            len: len as u8,
            is_extended,
        }
    }

    /// 获取数据切片（只包含有效数据）
    pub fn data_slice(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// 获取 CAN ID
    pub fn id(&self) -> u32 {
        self.id
    }

    /// 获取完整数据（8字节固定数组）
    pub fn data(&self) -> &[u8; 8] {
        &self.data
    }
}

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid CAN ID: 0x{id:X}")]
    InvalidCanId { id: u32 },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },
}

/// 小端字节序转 i16
pub fn bytes_to_i16_le(bytes: [u8; 2]) -> i16 {
    i16::from_le_bytes(bytes)
}

/// 小端字节序转 u16
pub fn bytes_to_u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// i16 转小端字节序
pub fn i16_to_bytes_le(value: i16) -> [u8; 2] {
    value.to_le_bytes()
}

/// u16 转小端字节序
pub fn u16_to_bytes_le(value: u16) -> [u8; 2] {
    value.to_le_bytes()
}
