//! Builder 模式实现
//!
//! 提供链式构造 `IntermodeBase` 实例的便捷方式。

use crate::base::{DEFAULT_BASE_NAME, IntermodeBase};
use crate::config::BaseConfig;
use crate::error::DriverError;
use crate::pipeline::PipelineConfig;
#[cfg(target_os = "linux")]
use intermode_can::SocketCanAdapter;
#[cfg(not(target_os = "linux"))]
use intermode_can::CanError;
use intermode_can::CanAdapter;
use intermode_protocol::DEFAULT_CAN_INTERFACE;

/// IntermodeBase Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use intermode_driver::{IntermodeBaseBuilder, PipelineConfig};
/// use std::time::Duration;
///
/// // 默认配置：can0，10ms 发布周期
/// let base = IntermodeBaseBuilder::new().build().unwrap();
///
/// let base = IntermodeBaseBuilder::new()
///     .name("rover-1")
///     .interface("vcan0")
///     .pipeline_config(PipelineConfig {
///         publish_period: Duration::from_millis(20),
///     })
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct IntermodeBaseBuilder {
    /// 实例名（默认 "intermode-base"）
    name: Option<String>,
    /// SocketCAN 接口名（默认 "can0"）
    interface: Option<String>,
    pipeline_config: Option<PipelineConfig>,
}

impl IntermodeBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从配置文件内容初始化全部字段
    pub fn from_config(config: &BaseConfig) -> Self {
        Self {
            name: Some(config.name.clone()),
            interface: Some(config.interface.clone()),
            pipeline_config: Some(config.pipeline_config()),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置 CAN 接口（如 "can0"、"vcan0"）
    pub fn interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline_config = Some(config);
        self
    }

    /// 打开 SocketCAN 接口并启动驱动
    ///
    /// 写超时与发布周期一致。
    ///
    /// # 错误
    /// - `DriverError::Can`: 接口不存在、未启动或无法打开；非 Linux 平台
    pub fn build(self) -> Result<IntermodeBase, DriverError> {
        #[cfg(target_os = "linux")]
        {
            let interface = self.interface.as_deref().unwrap_or(DEFAULT_CAN_INTERFACE);
            let config = self.pipeline_config.unwrap_or_default();
            let can = SocketCanAdapter::with_write_timeout(interface, config.publish_period)?;
            self.build_with_adapter(can)
        }

        #[cfg(not(target_os = "linux"))]
        {
            Err(DriverError::Can(CanError::Device(format!(
                "SocketCAN is only available on Linux (interface '{}')",
                self.interface.as_deref().unwrap_or(DEFAULT_CAN_INTERFACE)
            ))))
        }
    }

    /// 使用调用方提供的适配器启动驱动（测试、dry-run）
    pub fn build_with_adapter(
        self,
        can: impl CanAdapter + Send + 'static,
    ) -> Result<IntermodeBase, DriverError> {
        let config = self.pipeline_config.unwrap_or_default();
        let name = self.name.unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());
        Ok(IntermodeBase::new(can, config)?.with_name(name))
    }
}
