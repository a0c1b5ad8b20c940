//! 停车命令

use anyhow::Result;
use clap::Args;
use intermode_driver::IntermodeBase;

/// 停车命令参数
#[derive(Args, Debug, Default)]
pub struct StopCommand {}

impl StopCommand {
    /// 发送标准停车指令
    pub fn execute(&self, base: &IntermodeBase) -> Result<()> {
        base.stop()?;
        println!("Stop command published");
        Ok(())
    }
}
