// crates/ff_physics/src/lib.rs

//! FerroFlow 物理核心
//!
//! 边界条件翻译核心与时间步控制。每个外层非线性迭代按固定阶段
//! 执行：重置 → 收集 → 分类 → 模型补充 → I′ 重构 → 壁面/对称闭合
//! → 翻译 → 后处理；时间步控制器在 Navier-Stokes 预测前独立运行。
//!
//! # 模块概览
//!
//! - [`types`]: 边界码、面类型、湍流常数
//! - [`boundary`]: 边界条件核心（系数原语、分类器、I′ 重构、
//!   壁面律、对称闭合、模型补充、逐变量翻译、面值缓存）
//! - [`gradient`]: Green-Gauss 与最小二乘梯度核
//! - [`engine`]: 时间步矩阵与 CFL-Fourier 控制器
//! - [`coupling`]: 同一网格内部的面-面耦合
//! - [`ale`]: ALE 网格运动的顶点位移记账
//! - [`thermal`]: 温度⇔焓转换回调与壁面热耦合数组

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ale;
pub mod boundary;
pub mod coupling;
pub mod engine;
pub mod gradient;
pub mod math;
pub mod pipeline;
pub mod thermal;
pub mod types;

pub use boundary::classifier::{classify_boundary_faces, ClassifyPhase};
pub use boundary::translate::{translate_boundary_conditions, TranslateContext};
pub use engine::timestep::{LocalTimeStep, TimeStepReport};
pub use types::{BcCode, BoundaryFaceType, BoundaryState, TurbulenceConstants};
