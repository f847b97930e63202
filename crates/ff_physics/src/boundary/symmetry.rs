// crates/ff_physics/src/boundary/symmetry.rs

//! 对称面闭合
//!
//! 对称面投影掉向量的法向分量、保持切向不变；对雷诺应力张量
//! 施加四阶投影 P·R·P（P = I − n⊗n），消去法向-法向与法向-切向
//! 分量。质量通量修正标志 `isympa` 同时清零。
//!
//! 闭合为纯函数，两次调用按位一致。

use glam::{DMat3, DVec3};

use crate::boundary::coeffs::{generalized_sym_vector_aniso, TensorCoeffs, VectorCoeffs};
use crate::math::SymTensor;

/// Voigt 编号 → 张量下标
const VOIGT: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (1, 2), (0, 2)];

/// 向量对称闭合
///
/// 法向施加 Dirichlet（壁面 / 网格速度的法向分量），切向零通量。
pub fn symmetry_vector(imposed_velocity: DVec3, hint: f64, normal: DVec3) -> VectorCoeffs {
    let hintt = crate::math::sym_isotropic(hint);
    generalized_sym_vector_aniso(imposed_velocity, DVec3::ZERO, &hintt, normal)
}

/// 各向异性交换张量的向量对称闭合（雷诺应力模型的动量方程）
pub fn symmetry_vector_aniso(
    imposed_velocity: DVec3,
    hintt: &SymTensor,
    normal: DVec3,
) -> VectorCoeffs {
    generalized_sym_vector_aniso(imposed_velocity, DVec3::ZERO, hintt, normal)
}

/// 对称张量的对称闭合
///
/// 面值系数实现 Voigt 空间的四阶投影：R_face = [P⊗P]·R_I′，
/// 通量侧按 Q = hint·(R_I′ − R_face) 闭合。
pub fn symmetry_sym_tensor(hint: f64, normal: DVec3) -> TensorCoeffs {
    let p = DMat3::IDENTITY - outer(normal, normal);

    let mut out = TensorCoeffs::default();
    for (m, &(i, j)) in VOIGT.iter().enumerate() {
        for (n, &(k, l)) in VOIGT.iter().enumerate() {
            // (P R P)_ij 中 R_kl 的系数；非对角 Voigt 分量计对称双份
            let mut c = p.col(k)[i] * p.col(l)[j];
            if k != l {
                c += p.col(l)[i] * p.col(k)[j];
            }
            out.b[m][n] = c;
        }
    }

    // a = 0（对称面无源），通量侧 af = 0, bf = hint·(I − b)
    for m in 0..6 {
        for n in 0..6 {
            let id = if m == n { 1.0 } else { 0.0 };
            out.bf[m][n] = hint * (id - out.b[m][n]);
        }
    }
    out
}

#[inline]
fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_b(b: &[[f64; 6]; 6], r: &[f64; 6]) -> [f64; 6] {
        let mut out = [0.0; 6];
        for m in 0..6 {
            for n in 0..6 {
                out[m] += b[m][n] * r[n];
            }
        }
        out
    }

    #[test]
    fn test_vector_symmetry_projects() {
        let c = symmetry_vector(DVec3::ZERO, 2.0, DVec3::Z);
        // 切向保持
        let vt = DVec3::new(1.0, -2.0, 0.0);
        assert!((c.b * vt - vt).length() < 1e-12);
        // 法向清零
        assert!((c.b * DVec3::Z).length() < 1e-12);
        assert!(c.a.length() < 1e-12);
    }

    #[test]
    fn test_tensor_projection_kills_normal_components() {
        let n = DVec3::Y;
        let c = symmetry_sym_tensor(1.5, n);
        let r = [1.0, 2.0, 3.0, 0.4, 0.5, 0.6];
        let rp = apply_b(&c.b, &r);

        // 法向-法向 (yy) 与法向-切向 (xy, yz) 分量被消去
        assert!(rp[1].abs() < 1e-12);
        assert!(rp[3].abs() < 1e-12);
        assert!(rp[4].abs() < 1e-12);
        // 切向-切向分量保持
        assert!((rp[0] - 1.0).abs() < 1e-12);
        assert!((rp[2] - 3.0).abs() < 1e-12);
        assert!((rp[5] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_tensor_projection_idempotent_operator() {
        // 投影算子幂等：B·(B·R) = B·R
        let n = DVec3::new(0.6, 0.8, 0.0);
        let c = symmetry_sym_tensor(1.0, n);
        let r = [2.0, -1.0, 0.5, 0.3, -0.2, 0.7];
        let once = apply_b(&c.b, &r);
        let twice = apply_b(&c.b, &once);
        for m in 0..6 {
            assert!((once[m] - twice[m]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tensor_closure_bitwise_idempotent() {
        let n = DVec3::new(0.0, 0.6, 0.8);
        let c1 = symmetry_sym_tensor(2.5, n);
        let c2 = symmetry_sym_tensor(2.5, n);
        assert_eq!(c1.b, c2.b);
        assert_eq!(c1.bf, c2.bf);
    }

    #[test]
    fn test_flux_consistent_with_face_value() {
        // R_I′ 已满足对称条件时通量为零
        let n = DVec3::Z;
        let c = symmetry_sym_tensor(3.0, n);
        // zz、xz、yz 为零的张量在投影下不变
        let r = [1.0, 2.0, 0.0, 0.5, 0.0, 0.0];
        let rp = apply_b(&c.b, &r);
        for m in 0..6 {
            assert!((rp[m] - r[m]).abs() < 1e-12);
        }
        let flux = apply_b(&c.bf, &r);
        for f in flux {
            assert!(f.abs() < 1e-12);
        }
    }
}
