// crates/ff_foundation/src/tolerance.rs

//! 数值容差常量
//!
//! 求解器各处共用的小量阈值。与物理无关的纯数值常量放在这里，
//! 物理相关阈值（最小湍动能等）由各模型自带。

/// 通用正小量，用于避免除零
///
/// 与面粘性核和时间步矩阵行和的下限一致。
pub const EPZERO: f64 = 1e-12;

/// "无穷大" 哨兵，用于标记未使用的系数槽位
///
/// 下游消费者必须显式判断（见转子/定子耦合系数）。
pub const INFINITE_R: f64 = 1e30;

/// 判断一个值是否为未使用哨兵
#[inline]
pub fn is_unused_sentinel(v: f64) -> bool {
    v > 0.5 * INFINITE_R
}
