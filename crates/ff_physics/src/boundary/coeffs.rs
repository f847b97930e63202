// crates/ff_physics/src/boundary/coeffs.rs

//! 面系数原语
//!
//! 每个（变量形状 × 边界码）组合一个纯代数函数：输入面的内部交换
//! 系数 `hint`（扩散系数 / 面-单元距离，可为张量）与用户给定值，
//! 输出该面的四个系数槽位。无网格遍历、无全局状态，与面遍历顺序
//! 可交换，可在任意调度上下文中执行。
//!
//! 约定：
//! - `a`, `b`: 面值重构，φ_face = a + b·φ_I′
//! - `af`, `bf`: 扩散通量，Q_face = af + bf·φ_I′（外法向为正）
//! - 外部交换系数为 `None` 表示强 Dirichlet（hext → ∞）

use glam::{DMat3, DVec3};

use crate::math::{sym_inverse, sym_mat_vec, SymTensor};

/// 标量系数四元组
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScalarCoeffs {
    /// 面值重构截距
    pub a: f64,
    /// 面值重构斜率
    pub b: f64,
    /// 扩散通量截距
    pub af: f64,
    /// 扩散通量斜率
    pub bf: f64,
}

/// 向量系数四元组
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorCoeffs {
    /// 面值重构截距
    pub a: DVec3,
    /// 面值重构斜率（3×3 块）
    pub b: DMat3,
    /// 扩散通量截距
    pub af: DVec3,
    /// 扩散通量斜率（3×3 块）
    pub bf: DMat3,
}

impl Default for VectorCoeffs {
    fn default() -> Self {
        Self {
            a: DVec3::ZERO,
            b: DMat3::ZERO,
            af: DVec3::ZERO,
            bf: DMat3::ZERO,
        }
    }
}

/// 对称张量（6 分量）系数四元组
#[derive(Debug, Clone)]
pub struct TensorCoeffs {
    /// 面值重构截距
    pub a: [f64; 6],
    /// 面值重构斜率（6×6 块）
    pub b: [[f64; 6]; 6],
    /// 扩散通量截距
    pub af: [f64; 6],
    /// 扩散通量斜率（6×6 块）
    pub bf: [[f64; 6]; 6],
}

impl Default for TensorCoeffs {
    fn default() -> Self {
        Self {
            a: [0.0; 6],
            b: [[0.0; 6]; 6],
            af: [0.0; 6],
            bf: [[0.0; 6]; 6],
        }
    }
}

/// 除零保护下限
const HINT_FLOOR: f64 = 1e-300;

// ============================================================
// Neumann
// ============================================================

/// 标量 Neumann：施加通量 qimp
#[inline]
pub fn neumann_scalar(qimp: f64, hint: f64) -> ScalarCoeffs {
    ScalarCoeffs {
        a: -qimp / hint.max(HINT_FLOOR),
        b: 1.0,
        af: qimp,
        bf: 0.0,
    }
}

/// 向量 Neumann
#[inline]
pub fn neumann_vector(qimpv: DVec3, hint: f64) -> VectorCoeffs {
    let h = hint.max(HINT_FLOOR);
    VectorCoeffs {
        a: -qimpv / h,
        b: DMat3::IDENTITY,
        af: qimpv,
        bf: DMat3::ZERO,
    }
}

/// 对称张量 Neumann
pub fn neumann_tensor(qimpts: &[f64; 6], hint: f64) -> TensorCoeffs {
    let h = hint.max(HINT_FLOOR);
    let mut out = TensorCoeffs::default();
    for i in 0..6 {
        out.a[i] = -qimpts[i] / h;
        out.b[i][i] = 1.0;
        out.af[i] = qimpts[i];
    }
    out
}

// ============================================================
// Dirichlet
// ============================================================

/// 标量 Dirichlet
///
/// `hext` 为 `None` 时为强 Dirichlet（b = 0）；有限值时按等效
/// 交换系数 `heq = hint·hext/(hint+hext)` 组合。
#[inline]
pub fn dirichlet_scalar(pimp: f64, hint: f64, hext: Option<f64>) -> ScalarCoeffs {
    match hext {
        None => ScalarCoeffs {
            a: pimp,
            b: 0.0,
            af: -hint * pimp,
            bf: hint,
        },
        Some(hext) => {
            let denom = hint + hext;
            let heq = hint * hext / denom;
            ScalarCoeffs {
                a: hext * pimp / denom,
                b: hint / denom,
                af: -heq * pimp,
                bf: heq,
            }
        }
    }
}

/// 向量 Dirichlet（各向同性 hint，逐分量外部交换系数）
pub fn dirichlet_vector(pimpv: DVec3, hint: f64, hextv: [Option<f64>; 3]) -> VectorCoeffs {
    let mut out = VectorCoeffs::default();
    for i in 0..3 {
        let s = dirichlet_scalar(pimpv[i], hint, hextv[i]);
        out.a[i] = s.a;
        out.af[i] = s.af;
        // b 与 bf 为对角块
        *col_mut(&mut out.b, i, i) = s.b;
        *col_mut(&mut out.bf, i, i) = s.bf;
    }
    out
}

/// 向量强 Dirichlet，各向异性交换张量
///
/// 各向异性路径仅支持强形式（有限外部交换系数没有张量等效组合）。
pub fn dirichlet_vector_aniso(pimpv: DVec3, hintt: &SymTensor) -> VectorCoeffs {
    let af = -sym_mat_vec(hintt, pimpv);
    VectorCoeffs {
        a: pimpv,
        b: DMat3::ZERO,
        af,
        bf: crate::math::sym_to_mat3(hintt),
    }
}

/// 对称张量 Dirichlet（逐分量外部交换系数）
pub fn dirichlet_tensor(
    pimpts: &[f64; 6],
    hint: f64,
    hextts: &[Option<f64>; 6],
) -> TensorCoeffs {
    let mut out = TensorCoeffs::default();
    for i in 0..6 {
        let s = dirichlet_scalar(pimpts[i], hint, hextts[i]);
        out.a[i] = s.a;
        out.b[i][i] = s.b;
        out.af[i] = s.af;
        out.bf[i][i] = s.bf;
    }
    out
}

// ============================================================
// 对流出口
// ============================================================

/// 标量对流出口：参考值 pimp 随局部 Courant 数 cfl 外传
#[inline]
pub fn convective_outlet_scalar(pimp: f64, cfl: f64, hint: f64) -> ScalarCoeffs {
    let b = cfl / (1.0 + cfl);
    let a = (1.0 - b) * pimp;
    ScalarCoeffs {
        a,
        b,
        af: -hint * a,
        bf: hint * (1.0 - b),
    }
}

/// 向量对流出口
pub fn convective_outlet_vector(pimpv: DVec3, cfl: f64, hint: f64) -> VectorCoeffs {
    let mut out = VectorCoeffs::default();
    for i in 0..3 {
        let s = convective_outlet_scalar(pimpv[i], cfl, hint);
        out.a[i] = s.a;
        out.af[i] = s.af;
        *col_mut(&mut out.b, i, i) = s.b;
        *col_mut(&mut out.bf, i, i) = s.bf;
    }
    out
}

/// 对称张量对流出口
pub fn convective_outlet_tensor(pimpts: &[f64; 6], cfl: f64, hint: f64) -> TensorCoeffs {
    let mut out = TensorCoeffs::default();
    for i in 0..6 {
        let s = convective_outlet_scalar(pimpts[i], cfl, hint);
        out.a[i] = s.a;
        out.b[i][i] = s.b;
        out.af[i] = s.af;
        out.bf[i][i] = s.bf;
    }
    out
}

// ============================================================
// 仿射与混合分裂
// ============================================================

/// 标量仿射外推：φ_face = pinf + ratio·φ_I′
#[inline]
pub fn affine_scalar(pinf: f64, ratio: f64, hint: f64) -> ScalarCoeffs {
    ScalarCoeffs {
        a: pinf,
        b: ratio,
        af: -hint * pinf,
        bf: hint * (1.0 - ratio),
    }
}

/// 对流 Dirichlet + 扩散 Neumann
#[inline]
pub fn dirichlet_conv_neumann_diff_scalar(pimp: f64, qimp: f64) -> ScalarCoeffs {
    ScalarCoeffs {
        a: pimp,
        b: 0.0,
        af: qimp,
        bf: 0.0,
    }
}

/// 向量版对流 Dirichlet + 扩散 Neumann
pub fn dirichlet_conv_neumann_diff_vector(pimpv: DVec3, qimpv: DVec3) -> VectorCoeffs {
    VectorCoeffs {
        a: pimpv,
        b: DMat3::ZERO,
        af: qimpv,
        bf: DMat3::ZERO,
    }
}

/// 对流仿射 + 扩散 Neumann
#[inline]
pub fn affine_conv_neumann_diff_scalar(pinf: f64, ratio: f64, qimp: f64) -> ScalarCoeffs {
    ScalarCoeffs {
        a: pinf,
        b: ratio,
        af: qimp,
        bf: 0.0,
    }
}

/// 对流 Neumann + 零扩散
#[inline]
pub fn neumann_conv_zero_diff_scalar(qimp: f64, hint: f64) -> ScalarCoeffs {
    ScalarCoeffs {
        a: -qimp / hint.max(HINT_FLOOR),
        b: 1.0,
        af: 0.0,
        bf: 0.0,
    }
}

// ============================================================
// 广义对称 / 广义 Dirichlet
// ============================================================

/// 广义对称（各向同性）：法向 Dirichlet + 切向 Neumann
pub fn generalized_sym_vector(
    pimpv: DVec3,
    qimpv: DVec3,
    hint: f64,
    normal: DVec3,
) -> VectorCoeffs {
    generalized_sym_vector_aniso(pimpv, qimpv, &crate::math::sym_isotropic(hint), normal)
}

/// 广义对称（各向异性交换张量）
///
/// 梯度侧施加 `[I − n⊗n]`（切向保持）并在法向装配 Dirichlet 值；
/// 通量侧为 `[I − n⊗n]·Qimp` 与法向通量 `(H·n)⊗n` 的组合。
pub fn generalized_sym_vector_aniso(
    pimpv: DVec3,
    qimpv: DVec3,
    hintt: &SymTensor,
    normal: DVec3,
) -> VectorCoeffs {
    let invh = sym_inverse(hintt);
    let qshint = sym_mat_vec(&invh, qimpv);
    let hintpv = sym_mat_vec(hintt, pimpv);
    let hintnm = sym_mat_vec(hintt, normal);

    let mut out = VectorCoeffs::default();
    for i in 0..3 {
        out.a[i] = -qshint[i];
        for j in 0..3 {
            out.a[i] += normal[i] * normal[j] * (pimpv[j] + qshint[j]);
            let b_ij = if i == j {
                1.0 - normal[i] * normal[j]
            } else {
                -normal[i] * normal[j]
            };
            *col_mut(&mut out.b, i, j) = b_ij;
        }

        out.af[i] = qimpv[i];
        for j in 0..3 {
            out.af[i] -= normal[i] * normal[j] * (hintpv[j] + qimpv[j]);
            *col_mut(&mut out.bf, i, j) = hintnm[i] * normal[j];
        }
    }
    out
}

/// 广义 Dirichlet（各向同性）：切向 Dirichlet + 法向 Neumann
pub fn generalized_dirichlet_vector(
    pimpv: DVec3,
    qimpv: DVec3,
    hint: f64,
    normal: DVec3,
) -> VectorCoeffs {
    generalized_dirichlet_vector_aniso(pimpv, qimpv, &crate::math::sym_isotropic(hint), normal)
}

/// 广义 Dirichlet（各向异性交换张量）——广义对称的对偶形式
pub fn generalized_dirichlet_vector_aniso(
    pimpv: DVec3,
    qimpv: DVec3,
    hintt: &SymTensor,
    normal: DVec3,
) -> VectorCoeffs {
    let invh = sym_inverse(hintt);
    let qshint = sym_mat_vec(&invh, qimpv);
    let hintpv = sym_mat_vec(hintt, pimpv);
    let hintnm = sym_mat_vec(hintt, normal);
    let hdiag = [hintt[0], hintt[1], hintt[2]];

    let mut out = VectorCoeffs::default();
    for i in 0..3 {
        out.a[i] = pimpv[i];
        for j in 0..3 {
            out.a[i] -= normal[i] * normal[j] * (pimpv[j] + qshint[j]);
            *col_mut(&mut out.b, i, j) = normal[i] * normal[j];
        }

        out.af[i] = -hintpv[i];
        for j in 0..3 {
            out.af[i] += normal[i] * normal[j] * (qimpv[j] + hintpv[j]);
            let bf_ij = if i == j {
                hdiag[i] - hintnm[i] * normal[j]
            } else {
                -hintnm[i] * normal[j]
            };
            *col_mut(&mut out.bf, i, j) = bf_ij;
        }
    }
    out
}

/// 行列式意义下的矩阵元素可变访问（glam 列主序）
#[inline]
fn col_mut(m: &mut DMat3, row: usize, col: usize) -> &mut f64 {
    &mut m.col_mut(col)[row]
}

// ============================================================
// 测试
// ============================================================
