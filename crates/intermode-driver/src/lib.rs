//! # Intermode Driver
//!
//! Intermode 底盘驱动层：
//! - 发布线程（固定周期重发当前驱动帧，无命令时发送停车帧）
//! - 单槽命令插槽（调用方线程与发布线程的唯一交接点）
//! - 协作式取消与关闭
//! - 运动 API（直行、原地转向、功率/速度、停车、扩展命令）
//!
//! # 示例
//!
//! ```no_run
//! use intermode_driver::IntermodeBaseBuilder;
//! use nalgebra::Vector3;
//!
//! let base = IntermodeBaseBuilder::new().interface("can0").build()?;
//! base.move_straight(1000, 200.0)?;
//! base.set_power(Vector3::new(0.0, 0.3, 0.0), Vector3::zeros())?;
//! base.stop()?;
//! base.close();
//! # Ok::<(), intermode_driver::DriverError>(())
//! ```

mod base;
mod builder;
pub mod cancel;
pub mod config;
mod error;
pub mod extended;
pub mod metrics;
pub mod pipeline;
pub mod slot;

pub use base::{
    DEFAULT_BASE_NAME, IntermodeBase, TIMED_MOTION_ACCELERATOR, spin_duration, straight_duration,
};
pub use builder::IntermodeBaseBuilder;
pub use cancel::CancelToken;
pub use config::BaseConfig;
pub use error::DriverError;
pub use extended::ExtendedCommand;
pub use metrics::{MetricsSnapshot, PublishMetrics};
pub use pipeline::{DEFAULT_PUBLISH_PERIOD, PipelineConfig, publish_loop};
pub use slot::{CommandSlot, SlotEvent, SlotReceiver, command_slot};
