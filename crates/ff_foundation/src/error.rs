// crates/ff_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `FfError` 枚举和 `FfResult` 类型别名，用于整个求解器的错误处理。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，物理相关错误在 ff_physics 中扩展
//! 2. **两条传播路径**: 配置错误交给 [`crate::barrier::SetupErrorBarrier`]
//!    收集延迟上报；迭代中的不变量破坏立即通过 `FfResult` 传播并中止
//! 3. **可定位**: 错误信息携带面号 / 单元号 / 字段名，便于并行环境下排查

use thiserror::Error;

/// 统一结果类型
pub type FfResult<T> = Result<T, FfError>;

/// FerroFlow 错误类型
///
/// 核心错误类型。物理模型相关的细分错误应在 `ff_physics` 中扩展。
#[derive(Error, Debug)]
pub enum FfError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Config {
        /// 具体错误信息
        message: String,
    },

    /// 缺少必需的配置项
    #[error("缺少必需的配置项: {key}")]
    MissingConfig {
        /// 配置键名
        key: String,
    },

    /// 字段未找到
    #[error("字段未找到: {name}")]
    FieldNotFound {
        /// 字段名
        name: String,
    },

    /// 字段时间层不足
    #[error("字段 '{name}' 仅保存 {n_layers} 个时间层，无法访问前一时刻值")]
    MissingTimeLayer {
        /// 字段名
        name: String,
        /// 实际时间层数
        n_layers: usize,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("索引越界: {index_type} 索引 {index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别描述
        index_type: &'static str,
        /// 访问的索引
        index: usize,
        /// 上界（长度）
        len: usize,
    },

    /// 无效网格拓扑
    #[error("无效的网格拓扑: {message}")]
    InvalidMesh {
        /// 具体错误信息
        message: String,
    },

    /// 迭代中的不变量破坏（立即中止）
    #[error("不变量破坏: 面 {face_id}, 字段 '{field}': {message}")]
    InvariantViolation {
        /// 边界面号
        face_id: usize,
        /// 字段名
        field: String,
        /// 具体错误信息
        message: String,
    },

    /// 非有限系数
    #[error("非有限系数: 面 {face_id}, 字段 '{field}', 分量 {component}")]
    NonFiniteCoefficient {
        /// 边界面号
        face_id: usize,
        /// 字段名
        field: String,
        /// 分量号
        component: usize,
    },

    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        /// 可选的底层 IO 错误
        #[source]
        source: Option<std::io::Error>,
    },

    /// 序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        /// 序列化失败原因
        message: String,
    },

    /// 耦合对端退出
    #[error("耦合对端请求在第 {nt_max} 步后结束计算")]
    CouplingStop {
        /// 对端协商出的最大步数
        nt_max: usize,
    },

    /// 功能未实现
    #[error("功能未实现: {feature}")]
    NotImplemented {
        /// 未实现的功能描述
        feature: String,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl FfError {
    /// 配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// 缺少配置
    pub fn missing_config(key: impl Into<String>) -> Self {
        Self::MissingConfig { key: key.into() }
    }

    /// 字段未找到
    pub fn field_not_found(name: impl Into<String>) -> Self {
        Self::FieldNotFound { name: name.into() }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 无效网格
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// 不变量破坏
    pub fn invariant(face_id: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            face_id,
            field: field.into(),
            message: message.into(),
        }
    }

    /// IO 错误
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 序列化错误
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl FfError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> FfResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 检查索引是否在范围内
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> FfResult<()> {
        if index >= len {
            Err(Self::IndexOutOfBounds {
                index_type,
                index,
                len,
            })
        } else {
            Ok(())
        }
    }
}

impl From<std::io::Error> for FfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

// ========================================================================
// 测试
// ========================================================================
