//! 底盘驱动对外 API
//!
//! `IntermodeBase` 封装发布线程、命令插槽和取消令牌。
//! 所有运动方法都只取 `&self`，可以用 `Arc` 在多个线程间共享。

use crate::cancel::CancelToken;
use crate::error::DriverError;
use crate::extended::ExtendedCommand;
use crate::metrics::{MetricsSnapshot, PublishMetrics};
use crate::pipeline::{PipelineConfig, publish_loop};
use crate::slot::{CommandSlot, command_slot};
use arc_swap::ArcSwapOption;
use intermode_can::{CanAdapter, IntermodeFrame};
use intermode_protocol::DriveCommand;
use nalgebra::Vector3;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

/// 定时运动（直行、原地转向）使用的固定油门百分比
pub const TIMED_MOTION_ACCELERATOR: f64 = 50.0;

/// 默认实例名
pub const DEFAULT_BASE_NAME: &str = "intermode-base";

/// 直行持续时间：`|distance_mm| / |mm_per_sec|` 秒
///
/// 速度或距离为 0、结果非有限值时返回 0。
pub fn straight_duration(distance_mm: i64, mm_per_sec: f64) -> Duration {
    ratio_duration(distance_mm as f64, mm_per_sec)
}

/// 原地转向持续时间：`|angle_deg| / |degs_per_sec|` 秒
pub fn spin_duration(angle_deg: f64, degs_per_sec: f64) -> Duration {
    ratio_duration(angle_deg, degs_per_sec)
}

fn ratio_duration(amount: f64, rate: f64) -> Duration {
    Duration::try_from_secs_f64((amount / rate).abs()).unwrap_or(Duration::ZERO)
}

/// Intermode 底盘驱动
///
/// 创建即启动发布线程：没有任何命令时，每个周期发送停车帧。
/// `close()`（或 drop）取消并等待发布线程退出，之后总线上不会再有发送。
pub struct IntermodeBase {
    /// 实例名（日志用）
    name: String,
    /// 命令插槽发送端
    slot: CommandSlot,
    /// 全局取消令牌
    cancel: CancelToken,
    /// 发布线程句柄；`close` 时持锁 join，保证并发调用者都等到线程退出
    publish_thread: Mutex<Option<JoinHandle<()>>>,
    /// 发布指标
    metrics: Arc<PublishMetrics>,
    /// 最近一次成功发送的帧
    last_frame: Arc<ArcSwapOption<IntermodeFrame>>,
    config: PipelineConfig,
}

impl IntermodeBase {
    /// 创建驱动实例并启动发布线程
    ///
    /// # 参数
    /// - `can`: CAN 适配器（移动到发布线程，线程退出时 drop）
    /// - `config`: Pipeline 配置
    ///
    /// # 错误
    /// - `DriverError::InvalidInput`: 发布周期为 0
    /// - `DriverError::IoThread`: 线程创建失败
    pub fn new(
        can: impl CanAdapter + Send + 'static,
        config: PipelineConfig,
    ) -> Result<Self, DriverError> {
        if config.publish_period.is_zero() {
            return Err(DriverError::InvalidInput(
                "publish period must be greater than zero".to_string(),
            ));
        }

        let cancel = CancelToken::new();
        let (slot, slot_rx) = command_slot(cancel.clone());
        let metrics = Arc::new(PublishMetrics::new());
        let last_frame = Arc::new(ArcSwapOption::empty());

        let handle = {
            let cancel = cancel.clone();
            let metrics = metrics.clone();
            let last_frame = last_frame.clone();
            std::thread::Builder::new()
                .name("intermode-publish".to_string())
                .spawn(move || publish_loop(can, slot_rx, cancel, config, metrics, last_frame))
                .map_err(|e| DriverError::IoThread(format!("failed to spawn publish thread: {}", e)))?
        };

        info!(
            "Intermode base started (publish period {:?})",
            config.publish_period
        );

        Ok(Self {
            name: DEFAULT_BASE_NAME.to_string(),
            slot,
            cancel,
            publish_thread: Mutex::new(Some(handle)),
            metrics,
            last_frame,
            config,
        })
    }

    /// 设置实例名（内部方法，由 Builder 调用）
    pub(crate) fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// 交出一条驱动指令，阻塞到发布线程接收（最多约一个发布周期）
    ///
    /// # 错误
    /// - `DriverError::Cancelled`: 驱动已关闭或正在关闭
    /// - `DriverError::ChannelClosed`: 发布线程异常退出
    pub fn send_command(&self, command: DriveCommand) -> Result<(), DriverError> {
        self.slot.push(command.to_frame())
    }

    /// 直行 `distance_mm` 毫米
    ///
    /// 以固定油门前进（任一参数为负则倒车），等待
    /// [`straight_duration`] 后发送停车指令。等待可被 `close` 打断，
    /// 此时仍会尝试停车，并返回 `DriverError::Cancelled`。
    pub fn move_straight(&self, distance_mm: i64, mm_per_sec: f64) -> Result<(), DriverError> {
        let accelerator = if distance_mm < 0 || mm_per_sec < 0.0 {
            -TIMED_MOTION_ACCELERATOR
        } else {
            TIMED_MOTION_ACCELERATOR
        };
        self.run_for(
            DriveCommand::drive(accelerator, 0.0),
            straight_duration(distance_mm, mm_per_sec),
        )
    }

    /// 以 `angle_deg` 转向角行驶 `|angle_deg| / |degs_per_sec|` 秒后停车
    pub fn spin(&self, angle_deg: f64, degs_per_sec: f64) -> Result<(), DriverError> {
        self.run_for(
            DriveCommand::drive(TIMED_MOTION_ACCELERATOR, angle_deg),
            spin_duration(angle_deg, degs_per_sec),
        )
    }

    /// 持续功率指令：油门 `linear.y * 100`，转向角 `angular.z * 100`
    ///
    /// 指令会一直被重发，直到下一条指令或 `stop()`。
    pub fn set_power(&self, linear: Vector3<f64>, angular: Vector3<f64>) -> Result<(), DriverError> {
        self.send_command(DriveCommand::drive(linear.y * 100.0, angular.z * 100.0))
    }

    /// 持续速度指令：油门 `linear.y`，转向角 `angular.z * 100`
    pub fn set_velocity(
        &self,
        linear: Vector3<f64>,
        angular: Vector3<f64>,
    ) -> Result<(), DriverError> {
        self.send_command(DriveCommand::drive(linear.y, angular.z * 100.0))
    }

    /// 发送标准停车指令
    pub fn stop(&self) -> Result<(), DriverError> {
        self.send_command(DriveCommand::stop())
    }

    /// 保持当前指令 `duration`，期间 `close` 会提前返回 `DriverError::Cancelled`
    pub fn hold(&self, duration: Duration) -> Result<(), DriverError> {
        self.cancel.wait_timeout(duration)
    }

    /// 底盘没有反馈通道，无法判断是否在运动
    pub fn is_moving(&self) -> Result<bool, DriverError> {
        Err(DriverError::NotImplemented(
            "is_moving: the base provides no motion feedback".to_string(),
        ))
    }

    /// 执行扩展命令
    ///
    /// `args` 必须包含 `"command"` 键。
    pub fn do_command(&self, args: &Map<String, Value>) -> Result<Map<String, Value>, DriverError> {
        let command = ExtendedCommand::from_args(args)?;
        match command {}
    }

    /// 发布指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 最近一次成功发送到总线的帧（启动后第一个周期之前为 `None`）
    pub fn last_published(&self) -> Option<IntermodeFrame> {
        self.last_frame.load().as_deref().copied()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// 取消所有进行中的操作并等待发布线程退出（无超时，幂等）
    ///
    /// 返回后总线适配器已被 drop，不会再有任何发送。
    pub fn close(&self) {
        let first = self.cancel.cancel();

        let mut guard = self
            .publish_thread
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = guard.take()
            && handle.join().is_err()
        {
            warn!("Publish thread of '{}' panicked", self.name);
        }
        drop(guard);

        if first {
            info!("Intermode base '{}' closed", self.name);
        }
    }

    /// 发送指令，等待 `duration`，然后停车
    fn run_for(&self, command: DriveCommand, duration: Duration) -> Result<(), DriverError> {
        self.send_command(command)?;
        let waited = self.hold(duration);
        let stopped = self.stop();
        waited.and(stopped)
    }
}

impl Drop for IntermodeBase {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for IntermodeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntermodeBase")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}
