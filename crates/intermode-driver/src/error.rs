//! 驱动层错误类型定义

use intermode_can::CanError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// CAN 驱动错误（只在构建时出现；发布线程的发送错误只记日志）
    #[error("CAN driver error: {0}")]
    Can(#[from] CanError),

    /// 操作被取消（驱动正在关闭或已关闭）
    #[error("Operation cancelled")]
    Cancelled,

    /// 命令通道已关闭（发布线程退出）
    #[error("Command channel closed")]
    ChannelClosed,

    /// 功能未实现
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// 扩展命令名不存在
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// 缺少必需参数
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// 无效输入
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 配置错误（读取或解析失败、取值非法）
    #[error("Config error: {0}")]
    Config(String),

    /// 发布线程错误（启动失败或 panic）
    #[error("IO thread error: {0}")]
    IoThread(String),
}
