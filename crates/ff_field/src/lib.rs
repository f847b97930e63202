// crates/ff_field/src/lib.rs

//! FerroFlow 字段层
//!
//! 每个求解变量是一个字段：名称、维度（1/3/6/9）、一至三个时间层、
//! 方程参数记录与边界条件系数记录。字段由中心注册表统一持有，
//! 核心通过稳定的 [`FieldId`] 句柄访问，避免指针图。
//!
//! # 模块概览
//!
//! - [`equation`]: 方程参数 [`EquationParams`]（扩散张量形状、
//!   对流/扩散开关、梯度类型与限制器、时间格式权重）
//! - [`bc_coeffs`]: 边界条件系数记录 [`BcCoeffs`]
//!   （icodcl / rcodcl 输入 + a/b/af/bf 输出 + 面值缓存）
//! - [`field`]: 字段本体与元数据
//! - [`registry`]: 中心注册表与常用字段名

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bc_coeffs;
pub mod equation;
pub mod field;
pub mod registry;

pub use bc_coeffs::BcCoeffs;
pub use equation::{
    BoundaryReconstruction, DiffusionTensorShape, EquationParams, GradientLimiter, GradientType,
};
pub use field::{Field, FieldMetadata};
pub use registry::{names, FieldId, FieldRegistry};
