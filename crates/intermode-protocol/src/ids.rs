//! CAN ID 常量定义
//!
//! Intermode 底盘只接收一类控制帧：驱动指令帧。

/// 驱动指令（油门/刹车、转向角、档位、转向模式）
pub const ID_DRIVE_COMMAND: u32 = 0x220;

/// 默认 CAN 接口名称
pub const DEFAULT_CAN_INTERFACE: &str = "can0";
