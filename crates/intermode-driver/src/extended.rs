//! 扩展命令（`do_command` 的入口）
//!
//! 命令名在边界处解析为枚举，分发用穷尽 `match`。
//! 目前没有任何扩展命令，因此 `ExtendedCommand` 是空枚举：
//! 任何命令名都返回 `UnknownCommand`，分发代码在类型上不可达。

use crate::error::DriverError;
use serde_json::{Map, Value};
use std::str::FromStr;

/// 参数字典中命令名的键
pub const COMMAND_KEY: &str = "command";

/// 扩展命令集合（当前为空）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedCommand {}

impl ExtendedCommand {
    /// 所有支持的命令名
    pub const NAMES: &'static [&'static str] = &[];

    /// 从 `do_command` 的参数字典解析命令
    ///
    /// # 错误
    /// - `DriverError::MissingArgument`: 没有 `"command"` 键
    /// - `DriverError::InvalidInput`: `"command"` 不是字符串
    /// - `DriverError::UnknownCommand`: 命令名不存在
    pub fn from_args(args: &Map<String, Value>) -> Result<Self, DriverError> {
        let value = args
            .get(COMMAND_KEY)
            .ok_or_else(|| DriverError::MissingArgument(COMMAND_KEY.to_string()))?;
        let name = value.as_str().ok_or_else(|| {
            DriverError::InvalidInput(format!("`{}` must be a string, got {}", COMMAND_KEY, value))
        })?;
        name.parse()
    }
}

impl FromStr for ExtendedCommand {
    type Err = DriverError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Err(DriverError::UnknownCommand(name.to_string()))
    }
}
