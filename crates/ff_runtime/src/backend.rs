// crates/ff_runtime/src/backend.rs

//! Backend - 调度上下文抽象
//!
//! 统一 CPU 线程池与设备流执行的循环下发接口。核心中的每个逐面 /
//! 逐单元核函数体都写成 `Fn(usize)` 闭包，由后端决定如何并行执行；
//! 阶段边界处调用 [`Backend::wait`] 同步。
//!
//! 归约操作（最大波速、时间步极值及其位置）在 CPU 后端用
//! 原子位型比较实现，避免逐块合并的中间分配。

use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

use rayon::prelude::*;

/// 带位置的最小 / 最大归约结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxLoc {
    /// 最小值
    pub min: f64,
    /// 最小值所在索引
    pub min_loc: usize,
    /// 最大值
    pub max: f64,
    /// 最大值所在索引
    pub max_loc: usize,
}

/// 调度上下文 Trait
///
/// 抽象循环下发与归约。实现必须保证：
/// 1. `parallel_for` 对不同索引的执行互不依赖（核函数无共享可变状态）
/// 2. `wait` 返回后，此前下发的全部工作对后续阶段可见
pub trait Backend: Send + Sync {
    /// 后端名称
    fn name(&self) -> &'static str;

    /// 逐索引并行循环
    fn parallel_for(&self, n: usize, kernel: &(dyn Fn(usize) + Send + Sync));

    /// 阶段同步（设备后端在此冲刷流）
    fn wait(&self) {}

    /// 最小值归约
    fn reduce_min(&self, n: usize, value: &(dyn Fn(usize) -> f64 + Send + Sync)) -> f64;

    /// 最大值归约
    fn reduce_max(&self, n: usize, value: &(dyn Fn(usize) -> f64 + Send + Sync)) -> f64;

    /// 求和归约（整型计数）
    fn reduce_count(&self, n: usize, pred: &(dyn Fn(usize) -> bool + Send + Sync)) -> usize;

    /// 带位置的最小 / 最大归约
    fn reduce_minmax_loc(&self, n: usize, value: &(dyn Fn(usize) -> f64 + Send + Sync))
        -> MinMaxLoc;
}

// =============================================================================
// CPU 后端
// =============================================================================

/// f64 的原子序保持位型转换
///
/// 对非负浮点，IEEE-754 位型的整数序与数值序一致；含负数时借助
/// 符号翻转映射到 i64 的全序。
#[inline]
fn f64_to_ordered_bits(v: f64) -> i64 {
    let bits = v.to_bits() as i64;
    if bits < 0 {
        i64::MIN ^ bits
    } else {
        bits
    }
}

#[inline]
fn ordered_bits_to_f64(bits: i64) -> f64 {
    let raw = if bits < 0 { i64::MIN ^ bits } else { bits };
    f64::from_bits(raw as u64)
}

/// CPU 后端（rayon 线程池）
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    /// 创建 CPU 后端
    pub fn new() -> Self {
        Self
    }
}

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu-rayon"
    }

    fn parallel_for(&self, n: usize, kernel: &(dyn Fn(usize) + Send + Sync)) {
        (0..n).into_par_iter().for_each(kernel);
    }

    fn reduce_min(&self, n: usize, value: &(dyn Fn(usize) -> f64 + Send + Sync)) -> f64 {
        if n == 0 {
            return f64::INFINITY;
        }
        let min_bits = AtomicI64::new(f64_to_ordered_bits(f64::INFINITY));
        (0..n).into_par_iter().for_each(|i| {
            min_bits.fetch_min(f64_to_ordered_bits(value(i)), Ordering::Relaxed);
        });
        ordered_bits_to_f64(min_bits.load(Ordering::Relaxed))
    }

    fn reduce_max(&self, n: usize, value: &(dyn Fn(usize) -> f64 + Send + Sync)) -> f64 {
        if n == 0 {
            return f64::NEG_INFINITY;
        }
        let max_bits = AtomicI64::new(f64_to_ordered_bits(f64::NEG_INFINITY));
        (0..n).into_par_iter().for_each(|i| {
            max_bits.fetch_max(f64_to_ordered_bits(value(i)), Ordering::Relaxed);
        });
        ordered_bits_to_f64(max_bits.load(Ordering::Relaxed))
    }

    fn reduce_count(&self, n: usize, pred: &(dyn Fn(usize) -> bool + Send + Sync)) -> usize {
        let count = AtomicU64::new(0);
        (0..n).into_par_iter().for_each(|i| {
            if pred(i) {
                count.fetch_add(1, Ordering::Relaxed);
            }
        });
        count.load(Ordering::Relaxed) as usize
    }

    fn reduce_minmax_loc(
        &self,
        n: usize,
        value: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> MinMaxLoc {
        if n == 0 {
            return MinMaxLoc {
                min: f64::INFINITY,
                min_loc: 0,
                max: f64::NEG_INFINITY,
                max_loc: 0,
            };
        }
        // 位置信息无法与极值一起原子更新，这里用两遍：先求极值，
        // 再找第一个命中的索引。n 为单元数量级，两遍可接受。
        let min = self.reduce_min(n, value);
        let max = self.reduce_max(n, value);

        let min_loc = AtomicUsize::new(usize::MAX);
        let max_loc = AtomicUsize::new(usize::MAX);
        (0..n).into_par_iter().for_each(|i| {
            let v = value(i);
            if v == min {
                min_loc.fetch_min(i, Ordering::Relaxed);
            }
            if v == max {
                max_loc.fetch_min(i, Ordering::Relaxed);
            }
        });

        MinMaxLoc {
            min,
            min_loc: min_loc.load(Ordering::Relaxed).min(n - 1),
            max,
            max_loc: max_loc.load(Ordering::Relaxed).min(n - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_for_covers_all() {
        let ctx = CpuBackend::new();
        let hits: Vec<AtomicU64> = (0..100).map(|_| AtomicU64::new(0)).collect();
        ctx.parallel_for(100, &|i| {
            hits[i].fetch_add(1, Ordering::Relaxed);
        });
        ctx.wait();
        for h in &hits {
            assert_eq!(h.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn test_reduce_min_max_with_negatives() {
        let ctx = CpuBackend::new();
        let data = vec![3.0, -7.5, 0.0, 12.25, -0.5];
        let min = ctx.reduce_min(data.len(), &|i| data[i]);
        let max = ctx.reduce_max(data.len(), &|i| data[i]);
        assert_eq!(min, -7.5);
        assert_eq!(max, 12.25);
    }

    #[test]
    fn test_reduce_empty() {
        let ctx = CpuBackend::new();
        assert_eq!(ctx.reduce_min(0, &|_| 0.0), f64::INFINITY);
        assert_eq!(ctx.reduce_max(0, &|_| 0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_reduce_count() {
        let ctx = CpuBackend::new();
        let n = ctx.reduce_count(10, &|i| i % 3 == 0);
        assert_eq!(n, 4); // 0, 3, 6, 9
    }

    #[test]
    fn test_minmax_loc() {
        let ctx = CpuBackend::new();
        let data = vec![5.0, 1.0, 9.0, 1.0, 7.0];
        let r = ctx.reduce_minmax_loc(data.len(), &|i| data[i]);
        assert_eq!(r.min, 1.0);
        assert_eq!(r.min_loc, 1); // 取第一个命中位置
        assert_eq!(r.max, 9.0);
        assert_eq!(r.max_loc, 2);
    }

    #[test]
    fn test_ordered_bits_roundtrip() {
        for v in [-1.0e30, -1.0, -0.0, 0.0, 1.0, 1.0e30] {
            assert_eq!(ordered_bits_to_f64(f64_to_ordered_bits(v)), v);
        }
        assert!(f64_to_ordered_bits(-1.0) < f64_to_ordered_bits(0.0));
        assert!(f64_to_ordered_bits(0.0) < f64_to_ordered_bits(1.0));
    }
}
