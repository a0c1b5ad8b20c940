//! 驱动指令帧定义
//!
//! 包含档位、转向模式枚举，驱动指令结构体，
//! 以及油门/刹车、转向角的量化编码与解码。

use crate::constants::*;
use crate::ids::ID_DRIVE_COMMAND;
use crate::{
    IntermodeFrame, ProtocolError, bytes_to_i16_le, bytes_to_u16_le, i16_to_bytes_le,
    u16_to_bytes_le,
};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

// ============================================================================
// 档位与转向模式
// ============================================================================

/// 档位（Byte 6）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Gear {
    /// 驻车
    Park,
    /// 倒档
    Reverse,
    /// 空档
    Neutral,
    /// 前进档
    Drive,
    /// 紧急停止
    EmergencyStop,
}

impl Gear {
    /// 协议编码
    pub const fn code(self) -> u8 {
        match self {
            Gear::Park => 0,
            Gear::Reverse => 1,
            Gear::Neutral => 2,
            Gear::Drive => 3,
            Gear::EmergencyStop => 4,
        }
    }

    /// 数据手册中的名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Gear::Park => "park",
            Gear::Reverse => "reverse",
            Gear::Neutral => "neutral",
            Gear::Drive => "drive",
            Gear::EmergencyStop => "emergency_stop",
        }
    }
}

impl TryFrom<u8> for Gear {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Gear::Park),
            1 => Ok(Gear::Reverse),
            2 => Ok(Gear::Neutral),
            3 => Ok(Gear::Drive),
            4 => Ok(Gear::EmergencyStop),
            _ => Err(ProtocolError::InvalidValue {
                field: "Gear".to_string(),
                value,
            }),
        }
    }
}

impl FromStr for Gear {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "park" => Ok(Gear::Park),
            "reverse" => Ok(Gear::Reverse),
            "neutral" => Ok(Gear::Neutral),
            "drive" => Ok(Gear::Drive),
            "emergency_stop" => Ok(Gear::EmergencyStop),
            other => Err(ProtocolError::ParseError(format!("unknown gear: {}", other))),
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 转向模式（Byte 7）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SteerMode {
    /// 前轮转向
    FrontWheelDrive,
    /// 后轮转向
    RearWheelDrive,
    /// 四轮转向
    FourWheelDrive,
    /// 蟹行
    CrabSteering,
}

impl SteerMode {
    /// 协议编码
    pub const fn code(self) -> u8 {
        match self {
            SteerMode::FrontWheelDrive => 0,
            SteerMode::RearWheelDrive => 1,
            SteerMode::FourWheelDrive => 2,
            SteerMode::CrabSteering => 3,
        }
    }

    /// 数据手册中的名称
    pub const fn as_str(self) -> &'static str {
        match self {
            SteerMode::FrontWheelDrive => "front-wheel-drive",
            SteerMode::RearWheelDrive => "rear-wheel-drive",
            SteerMode::FourWheelDrive => "four-wheel-drive",
            SteerMode::CrabSteering => "crab-steering",
        }
    }
}

impl TryFrom<u8> for SteerMode {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SteerMode::FrontWheelDrive),
            1 => Ok(SteerMode::RearWheelDrive),
            2 => Ok(SteerMode::FourWheelDrive),
            3 => Ok(SteerMode::CrabSteering),
            _ => Err(ProtocolError::InvalidValue {
                field: "SteerMode".to_string(),
                value,
            }),
        }
    }
}

impl FromStr for SteerMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front-wheel-drive" => Ok(SteerMode::FrontWheelDrive),
            "rear-wheel-drive" => Ok(SteerMode::RearWheelDrive),
            "four-wheel-drive" => Ok(SteerMode::FourWheelDrive),
            "crab-steering" => Ok(SteerMode::CrabSteering),
            other => Err(ProtocolError::ParseError(format!(
                "unknown steer mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SteerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// 字段编码
// ============================================================================

/// 计算转向角字段（Byte 4-5）
///
/// - 输入范围 -90° ~ 90°，正为左转，负为右转
/// - 超出范围时饱和到最近的边界（保留符号）
/// - 量化：`round(angle / 0.0078125)`，i16 小端
pub fn encode_steering_angle(angle_deg: f64) -> [u8; 2] {
    let angle = angle_deg.clamp(-STEERING_ANGLE_LIMIT_DEG, STEERING_ANGLE_LIMIT_DEG);
    // NaN 经 `as` 转换为 0
    let value = (angle / STEERING_ANGLE_SCALE).round() as i16;
    i16_to_bytes_le(value)
}

/// 解码转向角字段（度）
pub fn decode_steering_angle(bytes: [u8; 2]) -> f64 {
    bytes_to_i16_le(bytes) as f64 * STEERING_ANGLE_SCALE
}

/// 计算油门/刹车字段（Byte 0-3）
///
/// - `0` 或非有限值（NaN、±∞）：油门 0、刹车 100%，固定为 [`BRAKE_FULL_PATTERN`]
/// - 非零：取绝对值并降额到 1/5，`round(v / 0.0625)` 写入 Byte 0-1（u16 小端，饱和），
///   Byte 2-3 为 0。油门与刹车互斥，非零路径不编码刹车。
///
/// 方向（前进/倒车）不在这里编码，由档位字段表达，见 [`DriveCommand::to_frame`]。
pub fn encode_acceleration(accel_pct: f64) -> [u8; 4] {
    if accel_pct == 0.0 || !accel_pct.is_finite() {
        return BRAKE_FULL_PATTERN;
    }

    let derated = accel_pct.abs() / ACCELERATION_DERATE;
    let value = (derated / ACCELERATION_SCALE).round() as u16;

    let mut bytes = [0u8; 4];
    bytes[..2].copy_from_slice(&u16_to_bytes_le(value));
    bytes
}

/// 油门/刹车字段的解码结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccelerationField {
    /// 全刹车（零油门）
    Brake,
    /// 油门（原始量化值）
    Accelerate { raw: u16 },
}

impl AccelerationField {
    /// 降额后的油门百分比（即设备实际收到的值）
    pub fn derated_pct(&self) -> f64 {
        match self {
            AccelerationField::Brake => 0.0,
            AccelerationField::Accelerate { raw } => *raw as f64 * ACCELERATION_SCALE,
        }
    }

    /// 降额前的油门百分比（绝对值）
    pub fn requested_pct(&self) -> f64 {
        self.derated_pct() * ACCELERATION_DERATE
    }
}

/// 解码油门/刹车字段
///
/// # 错误
/// - `ProtocolError::ParseError`: Byte 2-3 既不是 0 也不是刹车常量
pub fn decode_acceleration(bytes: [u8; 4]) -> Result<AccelerationField, ProtocolError> {
    if bytes == BRAKE_FULL_PATTERN {
        return Ok(AccelerationField::Brake);
    }
    if bytes[2..4] != [0, 0] {
        return Err(ProtocolError::ParseError(format!(
            "unexpected brake bytes: {:02X?}",
            &bytes[2..4]
        )));
    }
    Ok(AccelerationField::Accelerate {
        raw: bytes_to_u16_le([bytes[0], bytes[1]]),
    })
}

// ============================================================================
// 驱动指令
// ============================================================================

/// 驱动指令（0x220）
///
/// 值类型，构造后不修改。`accelerator` 的符号表达前进/倒车意图，
/// 编码时才换算到档位字段，因此调用方可以先构造中间值再统一编码。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriveCommand {
    /// 油门百分比（带符号）
    pub accelerator: f64,
    /// 刹车百分比（目前只有 0 或 100 有意义）
    pub brake: f64,
    /// 转向角（度）
    pub steering_angle: f64,
    pub gear: Gear,
    pub steer_mode: SteerMode,
}

impl DriveCommand {
    /// 前进档、四轮转向的行驶指令
    pub fn drive(accelerator: f64, steering_angle: f64) -> Self {
        Self {
            accelerator,
            brake: 0.0,
            steering_angle,
            gear: Gear::Drive,
            steer_mode: SteerMode::FourWheelDrive,
        }
    }

    /// 标准停车指令：油门 0，刹车 100，转向 0，驻车档，四轮转向
    pub const fn stop() -> Self {
        Self {
            accelerator: 0.0,
            brake: 100.0,
            steering_angle: 0.0,
            gear: Gear::Park,
            steer_mode: SteerMode::FourWheelDrive,
        }
    }

    /// 实际写入帧的档位：油门为负时强制为倒档
    pub fn effective_gear(&self) -> Gear {
        if self.accelerator < 0.0 {
            Gear::Reverse
        } else {
            self.gear
        }
    }

    /// 转换为 CAN 帧
    ///
    /// 纯函数，不修改 `self`，不做 I/O。
    pub fn to_frame(&self) -> IntermodeFrame {
        let mut data = [0u8; DRIVE_FRAME_LEN];
        data[0..4].copy_from_slice(&encode_acceleration(self.accelerator));
        data[4..6].copy_from_slice(&encode_steering_angle(self.steering_angle));
        data[6] = self.effective_gear().code();
        data[7] = self.steer_mode.code();

        debug!(data = ?data, "drive frame");

        IntermodeFrame::new_standard(ID_DRIVE_COMMAND as u16, &data)
    }
}

/// 解码后的驱动指令帧
///
/// 用于检查总线上（或 Mock 录下来的）驱动帧。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommandFrame {
    pub acceleration: AccelerationField,
    /// 转向角（度，1/128 精度）
    pub steering_angle: f64,
    pub gear: Gear,
    pub steer_mode: SteerMode,
}

impl DriveCommandFrame {
    /// 是否为全刹车帧
    pub fn is_braking(&self) -> bool {
        matches!(self.acceleration, AccelerationField::Brake)
    }
}

impl TryFrom<IntermodeFrame> for DriveCommandFrame {
    type Error = ProtocolError;

    fn try_from(frame: IntermodeFrame) -> Result<Self, Self::Error> {
        if frame.id != ID_DRIVE_COMMAND || frame.is_extended {
            return Err(ProtocolError::InvalidCanId { id: frame.id });
        }
        if frame.len as usize != DRIVE_FRAME_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: DRIVE_FRAME_LEN,
                actual: frame.len as usize,
            });
        }

        let d = frame.data;
        Ok(Self {
            acceleration: decode_acceleration([d[0], d[1], d[2], d[3]])?,
            steering_angle: decode_steering_angle([d[4], d[5]]),
            gear: Gear::try_from(d[6])?,
            steer_mode: SteerMode::try_from(d[7])?,
        })
    }
}

impl fmt::Display for DriveCommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.acceleration {
            AccelerationField::Brake => write!(f, "brake")?,
            accel => write!(f, "accel {:.4}%", accel.derated_pct())?,
        }
        write!(
            f,
            ", steer {:.4}°, gear {}, mode {}",
            self.steering_angle, self.gear, self.steer_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // 枚举测试
    // ========================================================================

    #[test]
    fn test_gear_codes() {
        assert_eq!(Gear::Park.code(), 0);
        assert_eq!(Gear::Reverse.code(), 1);
        assert_eq!(Gear::Neutral.code(), 2);
        assert_eq!(Gear::Drive.code(), 3);
        assert_eq!(Gear::EmergencyStop.code(), 4);
        for code in 0..=4u8 {
            assert_eq!(Gear::try_from(code).unwrap().code(), code);
        }
        assert!(matches!(
            Gear::try_from(5),
            Err(ProtocolError::InvalidValue { value: 5, .. })
        ));
    }

    #[test]
    fn test_steer_mode_codes() {
        assert_eq!(SteerMode::FrontWheelDrive.code(), 0);
        assert_eq!(SteerMode::RearWheelDrive.code(), 1);
        assert_eq!(SteerMode::FourWheelDrive.code(), 2);
        assert_eq!(SteerMode::CrabSteering.code(), 3);
        assert!(SteerMode::try_from(4).is_err());
    }

    #[test]
    fn test_names_roundtrip() {
        for gear in [
            Gear::Park,
            Gear::Reverse,
            Gear::Neutral,
            Gear::Drive,
            Gear::EmergencyStop,
        ] {
            assert_eq!(gear.as_str().parse::<Gear>().unwrap(), gear);
        }
        assert_eq!(
            "crab-steering".parse::<SteerMode>().unwrap(),
            SteerMode::CrabSteering
        );
        assert!("sideways".parse::<SteerMode>().is_err());
        assert!("Drive".parse::<Gear>().is_err());
    }

    // ========================================================================
    // 转向角编码
    // ========================================================================

    #[test]
    fn test_steering_angle_zero() {
        assert_eq!(encode_steering_angle(0.0), [0x00, 0x00]);
    }

    #[test]
    fn test_steering_angle_one_degree() {
        // 1° / (1/128) = 128 = 0x0080
        assert_eq!(encode_steering_angle(1.0), [0x80, 0x00]);
        assert_eq!(encode_steering_angle(-1.0), [0x80, 0xFF]);
    }

    #[test]
    fn test_steering_angle_saturates() {
        assert_eq!(encode_steering_angle(120.0), encode_steering_angle(90.0));
        assert_eq!(encode_steering_angle(-400.0), encode_steering_angle(-90.0));
        assert_eq!(encode_steering_angle(f64::INFINITY), encode_steering_angle(90.0));
        assert_eq!(decode_steering_angle(encode_steering_angle(-95.0)), -90.0);
    }

    #[test]
    fn test_steering_angle_rounds_to_nearest_step() {
        // 0.01° / 0.0078125 = 1.28 → 1
        assert_eq!(encode_steering_angle(0.01), [0x01, 0x00]);
        // 0.006° / 0.0078125 = 0.768 → 1
        assert_eq!(encode_steering_angle(0.006), [0x01, 0x00]);
    }

    #[test]
    fn test_steering_angle_nan_is_zero() {
        assert_eq!(encode_steering_angle(f64::NAN), [0x00, 0x00]);
    }

    // ========================================================================
    // 油门编码
    // ========================================================================

    #[test]
    fn test_acceleration_zero_is_brake_pattern() {
        assert_eq!(encode_acceleration(0.0), [0x00, 0x00, 0x40, 0x06]);
        assert_eq!(encode_acceleration(-0.0), BRAKE_FULL_PATTERN);
    }

    #[test]
    fn test_acceleration_non_finite_is_brake_pattern() {
        assert_eq!(encode_acceleration(f64::NAN), BRAKE_FULL_PATTERN);
        assert_eq!(encode_acceleration(f64::INFINITY), BRAKE_FULL_PATTERN);
        assert_eq!(encode_acceleration(f64::NEG_INFINITY), BRAKE_FULL_PATTERN);

        let frame = DriveCommand::drive(f64::NAN, 0.0).to_frame();
        assert_eq!(&frame.data[0..4], &BRAKE_FULL_PATTERN);
        assert_eq!(
            decode_acceleration(BRAKE_FULL_PATTERN).unwrap(),
            AccelerationField::Brake
        );
    }

    #[test]
    fn test_acceleration_fifty_percent() {
        // 50 / 5 = 10, 10 / 0.0625 = 160 = 0x00A0
        assert_eq!(encode_acceleration(50.0), [0xA0, 0x00, 0x00, 0x00]);
        // 方向不影响幅值
        assert_eq!(encode_acceleration(-50.0), [0xA0, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_acceleration_saturates_to_u16() {
        assert_eq!(encode_acceleration(1.0e9), [0xFF, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_acceleration() {
        assert_eq!(
            decode_acceleration(BRAKE_FULL_PATTERN).unwrap(),
            AccelerationField::Brake
        );
        let field = decode_acceleration(encode_acceleration(100.0)).unwrap();
        assert_eq!(field, AccelerationField::Accelerate { raw: 320 });
        assert_eq!(field.derated_pct(), 20.0);
        assert_eq!(field.requested_pct(), 100.0);
        assert!(decode_acceleration([0x01, 0x00, 0x40, 0x00]).is_err());
    }

    // ========================================================================
    // 帧构建
    // ========================================================================

    #[test]
    fn test_stop_frame_layout() {
        let frame = DriveCommand::stop().to_frame();
        assert_eq!(frame.id, ID_DRIVE_COMMAND);
        assert!(!frame.is_extended);
        assert_eq!(frame.len, 8);
        assert_eq!(frame.data, [0x00, 0x00, 0x40, 0x06, 0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn test_drive_frame_layout() {
        let frame = DriveCommand::drive(50.0, 1.0).to_frame();
        assert_eq!(frame.data, [0xA0, 0x00, 0x00, 0x00, 0x80, 0x00, 0x03, 0x02]);
    }

    #[test]
    fn test_negative_accelerator_forces_reverse() {
        let cmd = DriveCommand::drive(-50.0, 0.0);
        let frame = cmd.to_frame();
        assert_eq!(frame.data[6], Gear::Reverse.code());
        // 原指令不变
        assert_eq!(cmd.gear, Gear::Drive);
        assert_eq!(cmd.effective_gear(), Gear::Reverse);
    }

    #[test]
    fn test_reverse_not_forced_for_non_negative_accelerator() {
        let mut cmd = DriveCommand::drive(30.0, 0.0);
        cmd.gear = Gear::Neutral;
        assert_eq!(cmd.to_frame().data[6], Gear::Neutral.code());
        assert_eq!(DriveCommand::stop().to_frame().data[6], Gear::Park.code());
    }

    #[test]
    fn test_decode_drive_frame() {
        let frame = DriveCommand::drive(-50.0, -12.5).to_frame();
        let decoded = DriveCommandFrame::try_from(frame).unwrap();
        assert_eq!(decoded.acceleration, AccelerationField::Accelerate { raw: 160 });
        assert_eq!(decoded.steering_angle, -12.5);
        assert_eq!(decoded.gear, Gear::Reverse);
        assert_eq!(decoded.steer_mode, SteerMode::FourWheelDrive);
        assert!(!decoded.is_braking());
    }

    #[test]
    fn test_decode_rejects_foreign_frames() {
        let frame = IntermodeFrame::new_standard(0x221, &[0; 8]);
        assert!(matches!(
            DriveCommandFrame::try_from(frame),
            Err(ProtocolError::InvalidCanId { id: 0x221 })
        ));

        let frame = IntermodeFrame::new_standard(0x220, &[0; 4]);
        assert!(matches!(
            DriveCommandFrame::try_from(frame),
            Err(ProtocolError::InvalidLength {
                expected: 8,
                actual: 4
            })
        ));

        let frame = IntermodeFrame::new_standard(0x220, &[0, 0, 0, 0, 0, 0, 9, 0]);
        assert!(matches!(
            DriveCommandFrame::try_from(frame),
            Err(ProtocolError::InvalidValue { value: 9, .. })
        ));
    }

    #[test]
    fn test_display_stop_frame() {
        let decoded = DriveCommandFrame::try_from(DriveCommand::stop().to_frame()).unwrap();
        assert_eq!(
            decoded.to_string(),
            "brake, steer 0.0000°, gear park, mode four-wheel-drive"
        );
    }
}
