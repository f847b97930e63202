// crates/ff_physics/src/coupling/mod.rs

//! 同一网格内部的面-面耦合
//!
//! 把一张网格中两个不相连的体区域经用户指定的内部界面耦合起来
//! （典型场景：共轭传热的固/流界面）。

pub mod internal;

pub use internal::{InternalCoupling, MatrixContribution};
