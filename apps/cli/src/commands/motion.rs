//! 定时运动命令（直行、原地转向）
//!
//! 两者都会阻塞到运动结束并自动停车；Ctrl-C 会提前结束。

use anyhow::{Result, bail};
use clap::Args;
use intermode_driver::{IntermodeBase, spin_duration, straight_duration};

/// 直行命令参数
#[derive(Args, Debug)]
pub struct MoveStraightCommand {
    /// 距离（毫米），负数为倒车
    #[arg(long, allow_hyphen_values = true)]
    pub distance_mm: i64,

    /// 速度（毫米/秒）
    #[arg(long, allow_hyphen_values = true)]
    pub speed: f64,
}

impl MoveStraightCommand {
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed == 0.0 {
            bail!("--speed must be a finite, non-zero number (got {})", self.speed);
        }
        Ok(())
    }

    pub fn execute(&self, base: &IntermodeBase) -> Result<()> {
        self.validate()?;
        let duration = straight_duration(self.distance_mm, self.speed);
        println!(
            "Moving {} mm at {} mm/s ({:.2}s)...",
            self.distance_mm,
            self.speed,
            duration.as_secs_f64()
        );
        base.move_straight(self.distance_mm, self.speed)?;
        println!("Done");
        Ok(())
    }
}

/// 原地转向命令参数
#[derive(Args, Debug)]
pub struct SpinCommand {
    /// 转向角（度）
    #[arg(long, allow_hyphen_values = true)]
    pub angle: f64,

    /// 角速度（度/秒）
    #[arg(long, allow_hyphen_values = true)]
    pub rate: f64,
}

impl SpinCommand {
    pub fn validate(&self) -> Result<()> {
        if !self.angle.is_finite() {
            bail!("--angle must be a finite number (got {})", self.angle);
        }
        if !self.rate.is_finite() || self.rate == 0.0 {
            bail!("--rate must be a finite, non-zero number (got {})", self.rate);
        }
        Ok(())
    }

    pub fn execute(&self, base: &IntermodeBase) -> Result<()> {
        self.validate()?;
        let duration = spin_duration(self.angle, self.rate);
        println!(
            "Spinning {}° at {}°/s ({:.2}s)...",
            self.angle,
            self.rate,
            duration.as_secs_f64()
        );
        base.spin(self.angle, self.rate)?;
        println!("Done");
        Ok(())
    }
}
