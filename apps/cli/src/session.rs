//! 一次 CLI 调用的驱动会话
//!
//! 打开底盘（真实 SocketCAN 或 dry-run 的 Mock 总线），安装 Ctrl-C 处理，
//! 命令执行完后关闭。

use anyhow::{Context, Result};
use intermode_can::{IntermodeFrame, MockBus, MockCanAdapter, SentFrame};
use intermode_driver::{BaseConfig, IntermodeBase, IntermodeBaseBuilder, MetricsSnapshot};
use intermode_protocol::DriveCommandFrame;
use std::sync::Arc;
use tracing::info;

pub struct Session {
    pub base: Arc<IntermodeBase>,
    /// dry-run 时的 Mock 总线
    bus: Option<MockBus>,
}

impl Session {
    pub fn open(config: &BaseConfig, dry_run: bool) -> Result<Self> {
        let builder = IntermodeBaseBuilder::from_config(config);

        let (base, bus) = if dry_run {
            let (adapter, bus) = MockCanAdapter::pair();
            (builder.build_with_adapter(adapter)?, Some(bus))
        } else {
            let base = builder
                .build()
                .with_context(|| format!("failed to open CAN interface '{}'", config.interface))?;
            (base, None)
        };
        let base = Arc::new(base);

        info!(
            "Opened '{}' on {}{}",
            config.name,
            config.interface,
            if dry_run { " (dry-run)" } else { "" }
        );

        let handler_base = base.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nReceived interrupt signal. Stopping...");
            handler_base.close();
        })
        .context("failed to set Ctrl-C handler")?;

        Ok(Self { base, bus })
    }

    /// 关闭底盘；dry-run 时打印总线上的帧
    pub fn close(self) {
        self.base.close();

        if let Some(bus) = self.bus {
            let sent = bus.sent();
            println!("{} frames published:", sent.len());
            for (frame, count) in summarize(&sent) {
                println!("{:>6} x {}", count, describe(&frame));
            }
            println!("{}", describe_metrics(&self.base.metrics()));
        }
    }
}

/// 连续相同的帧合并为 (帧, 次数)
pub fn summarize(sent: &[SentFrame]) -> Vec<(IntermodeFrame, usize)> {
    let mut runs: Vec<(IntermodeFrame, usize)> = Vec::new();
    for s in sent {
        match runs.last_mut() {
            Some((frame, count)) if *frame == s.frame => *count += 1,
            _ => runs.push((s.frame, 1)),
        }
    }
    runs
}

fn describe(frame: &IntermodeFrame) -> String {
    match DriveCommandFrame::try_from(*frame) {
        Ok(decoded) => format!("{} [{:02X?}]", decoded, frame.data_slice()),
        Err(e) => format!("undecodable frame 0x{:03X} ({})", frame.id, e),
    }
}

fn describe_metrics(metrics: &MetricsSnapshot) -> String {
    format!(
        "sent {}, send errors {} ({:.1}%), commands {}",
        metrics.frames_sent,
        metrics.send_errors,
        metrics.send_error_rate(),
        metrics.commands_received
    )
}
