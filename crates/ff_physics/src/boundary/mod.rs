// crates/ff_physics/src/boundary/mod.rs

//! 边界条件翻译核心
//!
//! 每外层非线性迭代的阶段流水线（各阶段全局完成后进入下一阶段）：
//!
//! 1. 重置 — 全部逐面系数数组回到"未设置"
//! 2. 收集 — 界面 / 用户函数 / 耦合写入各变量的边界数据
//! 3. 分类 — 派生跨物理一致的逐面类型码（[`classifier`]）
//! 4. 模型补充 — 激活的物理模型钩子（[`models`]）
//! 5. I′ 重构 — 求变量在投影点 I′ 的值（[`reconstruct`]）
//! 6. 壁面/对称闭合 — 壁面律与对称投影系数（[`wall_law`]、[`symmetry`]）
//! 7. 翻译 — 逐面逐变量映射到系数原语（[`translate`]、[`coeffs`]）
//! 8. 后处理 — 壁面应力、辐射交换系数、面值缓存（[`cache`]）

pub mod cache;
pub mod classifier;
pub mod coeffs;
pub mod models;
pub mod reconstruct;
pub mod symmetry;
pub mod translate;
pub mod wall_law;
