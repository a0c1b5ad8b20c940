//! Pipeline 发布逻辑
//!
//! 发布线程按固定周期把"当前帧"写到总线上。没有新命令时重复上一帧，
//! 保证下游控制器永远不会因为指令静默而触发超时。

use crate::cancel::CancelToken;
use crate::metrics::PublishMetrics;
use crate::slot::{SlotEvent, SlotReceiver};
use arc_swap::ArcSwapOption;
use intermode_can::{CanAdapter, IntermodeFrame};
use intermode_protocol::DriveCommand;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, trace};

/// 默认发布周期
pub const DEFAULT_PUBLISH_PERIOD: Duration = Duration::from_millis(10);

/// Pipeline 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 发布周期：无新命令时，每隔这么久重发一次当前帧
    pub publish_period: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            publish_period: DEFAULT_PUBLISH_PERIOD,
        }
    }
}

/// 发布线程主循环
///
/// 初始帧为停车帧。每次迭代：
/// 1. 已取消则退出
/// 2. 最多等待 `publish_period`：取消（立即退出，不再发送）、新帧（采用）、超时（保持）
/// 3. 发送当前帧；失败只记录日志并计数，循环继续
///
/// 适配器随函数返回被 drop（即总线关闭）。
///
/// # 参数
/// - `can`: CAN 适配器（独占）
/// - `slot_rx`: 命令插槽接收端
/// - `cancel`: 取消令牌
/// - `config`: Pipeline 配置
/// - `metrics`: 发布指标
/// - `last_frame`: 最近一次成功发送的帧（供其他线程观察）
pub fn publish_loop(
    mut can: impl CanAdapter,
    slot_rx: SlotReceiver,
    cancel: CancelToken,
    config: PipelineConfig,
    metrics: Arc<PublishMetrics>,
    last_frame: Arc<ArcSwapOption<IntermodeFrame>>,
) {
    let mut current = DriveCommand::stop().to_frame();

    loop {
        if cancel.is_cancelled() {
            trace!("Publish thread: cancelled, exiting");
            break;
        }

        match slot_rx.recv_timeout(config.publish_period) {
            SlotEvent::Cancelled => {
                trace!("Publish thread: cancelled while waiting, exiting");
                break;
            },
            SlotEvent::Frame(frame) => {
                metrics.commands_received.fetch_add(1, Ordering::Relaxed);
                current = frame;
            },
            SlotEvent::Timeout => {},
        }

        metrics.ticks.fetch_add(1, Ordering::Relaxed);

        match can.send(current) {
            Ok(()) => {
                metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
                last_frame.store(Some(Arc::new(current)));
            },
            Err(e) => {
                error!("Publish thread: failed to send drive frame: {}", e);
                metrics.send_errors.fetch_add(1, Ordering::Relaxed);
            },
        }
    }

    trace!("Publish thread: loop exited");
}
