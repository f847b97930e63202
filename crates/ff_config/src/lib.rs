// crates/ff_config/src/lib.rs

//! FerroFlow 配置层
//!
//! 定义求解器的全部运行时配置，JSON 序列化，无泛型。
//! 配置在构建求解器时一次性读入并校验，之后只读。
//!
//! # 模块概览
//!
//! - [`solver_config`]: 顶层 [`SolverConfig`] 与各子节
//! - [`error`]: 配置层错误类型

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod solver_config;

pub use error::ConfigError;
pub use solver_config::{
    AleMode, CombustionModel, PhysicalModels, SolverConfig, TimeStepMode, TimeStepOptions,
    TurbomachineryModel, TurbulenceModel, WallFunction,
};

/// 日志是否强制输出到标准流
///
/// 环境变量 `FF_LOG_TO_STDOUT` 非空且非 "0" 时为真。
pub fn log_to_stdout() -> bool {
    match std::env::var("FF_LOG_TO_STDOUT") {
        Ok(v) => !v.is_empty() && v != "0",
        Err(_) => false,
    }
}
