//! 持续驱动命令（功率、速度）
//!
//! 底盘会一直重发该指令，CLI 保持 `--hold-ms` 毫秒后发送停车指令再退出。

use anyhow::{Result, bail};
use clap::Args;
use intermode_driver::IntermodeBase;
use nalgebra::Vector3;
use std::time::Duration;

/// 功率命令参数
#[derive(Args, Debug)]
pub struct PowerCommand {
    /// 前向功率（-1.0 ~ 1.0，对应油门 ±100%）
    #[arg(long, allow_hyphen_values = true)]
    pub linear: f64,

    /// 转向（-0.9 ~ 0.9，对应转向角 ±90°）
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    pub angular: f64,

    /// 保持时间（毫秒）
    #[arg(long, default_value_t = 1000)]
    pub hold_ms: u64,
}

impl PowerCommand {
    pub fn execute(&self, base: &IntermodeBase) -> Result<()> {
        check_finite(self.linear, self.angular)?;
        println!(
            "Power linear={} angular={} for {} ms",
            self.linear, self.angular, self.hold_ms
        );
        base.set_power(
            Vector3::new(0.0, self.linear, 0.0),
            Vector3::new(0.0, 0.0, self.angular),
        )?;
        hold_then_stop(base, self.hold_ms)
    }
}

/// 速度命令参数
#[derive(Args, Debug)]
pub struct VelocityCommand {
    /// 前向速度（直接作为油门百分比）
    #[arg(long, allow_hyphen_values = true)]
    pub linear: f64,

    /// 转向（-0.9 ~ 0.9，对应转向角 ±90°）
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    pub angular: f64,

    /// 保持时间（毫秒）
    #[arg(long, default_value_t = 1000)]
    pub hold_ms: u64,
}

impl VelocityCommand {
    pub fn execute(&self, base: &IntermodeBase) -> Result<()> {
        check_finite(self.linear, self.angular)?;
        println!(
            "Velocity linear={} angular={} for {} ms",
            self.linear, self.angular, self.hold_ms
        );
        base.set_velocity(
            Vector3::new(0.0, self.linear, 0.0),
            Vector3::new(0.0, 0.0, self.angular),
        )?;
        hold_then_stop(base, self.hold_ms)
    }
}

fn check_finite(linear: f64, angular: f64) -> Result<()> {
    if !linear.is_finite() || !angular.is_finite() {
        bail!("--linear and --angular must be finite numbers");
    }
    Ok(())
}

/// 保持当前指令，然后停车；被中断时仍尝试停车
fn hold_then_stop(base: &IntermodeBase, hold_ms: u64) -> Result<()> {
    let held = base.hold(Duration::from_millis(hold_ms));
    let stopped = base.stop();
    held.and(stopped)?;
    println!("Stopped");
    Ok(())
}
