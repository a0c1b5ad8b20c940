//! 硬件相关常量定义
//!
//! 来自 Intermode 数据手册，集中定义避免在代码中散落"魔法数"。

/// 转向角量化单位（度 / LSB），即 1/128 度
pub const STEERING_ANGLE_SCALE: f64 = 0.0078125;

/// 转向角限幅（度），正为左转，负为右转
pub const STEERING_ANGLE_LIMIT_DEG: f64 = 90.0;

/// 油门量化单位（% / LSB）
pub const ACCELERATION_SCALE: f64 = 0.0625;

/// 油门降额系数：所有非零油门请求都缩小到 1/5
pub const ACCELERATION_DERATE: f64 = 5.0;

/// 零油门时发送的油门/刹车字段：油门 0，刹车 100%（1600 步 = 0x0640，小端）
pub const BRAKE_FULL_PATTERN: [u8; 4] = [0x00, 0x00, 0x40, 0x06];

/// 驱动指令帧长度
pub const DRIVE_FRAME_LEN: usize = 8;

pub use crate::ids::ID_DRIVE_COMMAND;
