// crates/ff_runtime/src/lib.rs

//! FerroFlow 运行时层
//!
//! 提供计算调度与通信的统一抽象：
//!
//! - [`backend`]: 调度上下文 `Backend` trait 与 CPU 实现，
//!   每个逐面 / 逐单元循环都通过 `parallel_for` 下发，
//!   阶段边界处调用 `wait()` 同步
//! - [`comm`]: 进程间集合通信接口（最小值归约、计数求和、
//!   外部耦合程序的时间步协商）
//!
//! GPU 后端通过同一 trait 接入；本 crate 仅提供 CPU 实现。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod comm;

pub use backend::{Backend, CpuBackend, MinMaxLoc};
pub use comm::{Communicator, CouplingSync, SingleRank, SyncOutcome};
