// crates/ff_physics/src/engine/mod.rs

//! 时间步引擎
//!
//! - [`matrix`]: 面粘性插值与时间步矩阵行和
//! - [`timestep`]: 局部时间步 / CFL-Fourier 控制器

pub mod matrix;
pub mod timestep;

pub use matrix::{face_viscosity, matrix_time_step, TimeStepBc, ViscosityInterpolation};
pub use timestep::{LocalTimeStep, TimeStepReport};
