// crates/ff_config/src/error.rs

//! 配置层错误类型

use std::path::PathBuf;
use thiserror::Error;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 设置文件不存在
    #[error("设置文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 设置文件解析失败
    #[error("设置文件解析失败: {path}: {message}")]
    Parse {
        /// 文件路径
        path: PathBuf,
        /// 解析错误信息
        message: String,
    },

    /// 配置值无效
    #[error("配置值无效: {key}={value}, 原因: {reason}")]
    InvalidValue {
        /// 配置键名
        key: &'static str,
        /// 配置值
        value: String,
        /// 无效原因
        reason: String,
    },

    /// 模型组合不一致
    #[error("模型组合不一致: {message}")]
    Inconsistent {
        /// 具体说明
        message: String,
    },
}

impl ConfigError {
    /// 配置值无效
    pub fn invalid(key: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// 模型组合不一致
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::Inconsistent {
            message: message.into(),
        }
    }
}
