//! TOML 配置
//!
//! ```toml
//! name = "rover-1"
//! interface = "can0"
//! publish_period_ms = 10
//! ```
//!
//! 所有字段都可省略，省略时使用默认值。

use crate::base::DEFAULT_BASE_NAME;
use crate::error::DriverError;
use crate::pipeline::PipelineConfig;
use intermode_protocol::DEFAULT_CAN_INTERFACE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 底盘实例配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BaseConfig {
    /// 实例名
    pub name: String,
    /// SocketCAN 接口名
    pub interface: String,
    /// 发布周期（毫秒），必须大于 0
    pub publish_period_ms: u64,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_BASE_NAME.to_string(),
            interface: DEFAULT_CAN_INTERFACE.to_string(),
            publish_period_ms: 10,
        }
    }
}

impl BaseConfig {
    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(s: &str) -> Result<Self, DriverError> {
        let config: Self =
            toml::from_str(s).map_err(|e| DriverError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件读取
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DriverError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, DriverError> {
        toml::to_string_pretty(self).map_err(|e| DriverError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        if self.publish_period_ms == 0 {
            return Err(DriverError::Config(
                "publish_period_ms must be greater than 0".to_string(),
            ));
        }
        if self.interface.is_empty() {
            return Err(DriverError::Config("interface must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            publish_period: Duration::from_millis(self.publish_period_ms),
        }
    }
}
