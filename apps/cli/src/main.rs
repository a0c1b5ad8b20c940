//! # Intermode CLI
//!
//! Command-line interface for Intermode rover base control.
//!
//! ```bash
//! # 直行 1 米（200 mm/s，约 5 秒后自动停车）
//! intermode-cli --interface can0 move-straight --distance-mm 1000 --speed 200
//!
//! # 不接硬件，打印将要发送的帧
//! intermode-cli --dry-run spin --angle 30 --rate 15
//!
//! # 使用配置文件
//! intermode-cli --config rover.toml set-power --linear 0.3 --hold-ms 2000
//! ```
//!
//! 日志级别由 `RUST_LOG` 控制，默认 `intermode_cli=info`。

use anyhow::Result;
use clap::{Parser, Subcommand};
use intermode_driver::{BaseConfig, DriverError};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod session;

use commands::{MoveStraightCommand, PowerCommand, SpinCommand, StopCommand, VelocityCommand};
use session::Session;

/// Intermode CLI - 底盘命令行工具
#[derive(Parser, Debug)]
#[command(name = "intermode-cli")]
#[command(about = "Command-line interface for Intermode rover base control", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// CAN 接口（覆盖配置）
    #[arg(short, long, global = true)]
    interface: Option<String>,

    /// 使用 Mock 总线，不访问硬件，结束时打印发送的帧
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 直行指定距离后停车
    MoveStraight {
        #[command(flatten)]
        args: MoveStraightCommand,
    },

    /// 以指定转向角行驶，转完后停车
    Spin {
        #[command(flatten)]
        args: SpinCommand,
    },

    /// 持续功率指令
    SetPower {
        #[command(flatten)]
        args: PowerCommand,
    },

    /// 持续速度指令
    SetVelocity {
        #[command(flatten)]
        args: VelocityCommand,
    },

    /// 停车
    Stop {
        #[command(flatten)]
        args: StopCommand,
    },
}

impl Cli {
    /// 配置文件（或默认值）加上命令行覆盖
    fn base_config(&self) -> Result<BaseConfig> {
        let mut config = match &self.config {
            Some(path) => BaseConfig::load(path)?,
            None => BaseConfig::default(),
        };
        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.base_config()?;
    let session = Session::open(&config, cli.dry_run)?;

    let result = {
        let base = &session.base;
        match &cli.command {
            Commands::MoveStraight { args } => args.execute(base),
            Commands::Spin { args } => args.execute(base),
            Commands::SetPower { args } => args.execute(base),
            Commands::SetVelocity { args } => args.execute(base),
            Commands::Stop { args } => args.execute(base),
        }
    };

    session.close();
    result
}

fn is_interrupted(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DriverError>(),
        Some(DriverError::Cancelled)
    )
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intermode_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_interrupted(&e) => {
            eprintln!("Interrupted");
            ExitCode::from(130)
        },
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}
