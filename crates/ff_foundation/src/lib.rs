// crates/ff_foundation/src/lib.rs

//! FerroFlow Foundation Layer
//!
//! 基础层，提供整个求解器的公共抽象：
//!
//! - [`error`]: 统一错误类型 `FfError` / `FfResult`
//! - [`index`]: 强类型网格索引（单元 / 面 / 顶点）
//! - [`barrier`]: 延迟配置错误屏障（收集后统一中止）
//! - [`tolerance`]: 数值容差常量
//!
//! # 设计原则
//!
//! 1. **最小依赖**: 仅依赖 serde 与 thiserror
//! 2. **类型安全**: 编译期防止单元索引与面索引混用
//! 3. **两类错误**: 配置错误可收集延迟上报（见 [`barrier`]），
//!    迭代中的不变量破坏立即返回 `FfError` 并中止

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier;
pub mod error;
pub mod index;
pub mod tolerance;

pub use barrier::SetupErrorBarrier;
pub use error::{FfError, FfResult};
pub use index::{CellIndex, FaceIndex, VertexIndex};
pub use tolerance::EPZERO;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::barrier::SetupErrorBarrier;
    pub use crate::error::{FfError, FfResult};
    pub use crate::index::{CellIndex, FaceIndex, VertexIndex};
    pub use crate::tolerance::EPZERO;
}
