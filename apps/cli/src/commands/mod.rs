//! 命令定义和实现

pub mod drive;
pub mod motion;
pub mod stop;

pub use drive::{PowerCommand, VelocityCommand};
pub use motion::{MoveStraightCommand, SpinCommand};
pub use stop::StopCommand;
