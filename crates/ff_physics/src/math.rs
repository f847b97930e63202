// crates/ff_physics/src/math.rs

//! 对称张量小代数
//!
//! 对称 3×3 张量采用 Voigt 存储 `[xx, yy, zz, xy, yz, xz]`，
//! 与各向异性交换系数、雷诺应力与湍流粘性张量共用。

use glam::{DMat3, DVec3};

/// Voigt 对称张量
pub type SymTensor = [f64; 6];

/// 单位对称张量
pub const SYM_IDENTITY: SymTensor = [1.0, 1.0, 1.0, 0.0, 0.0, 0.0];

/// 对称张量与向量乘积 T·v
#[inline]
pub fn sym_mat_vec(t: &SymTensor, v: DVec3) -> DVec3 {
    DVec3::new(
        t[0] * v.x + t[3] * v.y + t[5] * v.z,
        t[3] * v.x + t[1] * v.y + t[4] * v.z,
        t[5] * v.x + t[4] * v.y + t[2] * v.z,
    )
}

/// 对称张量求逆（伴随矩阵法）
///
/// 交换系数张量对称正定，行列式非退化由调用方保证。
pub fn sym_inverse(t: &SymTensor) -> SymTensor {
    let mut m = [0.0; 6];
    m[0] = t[1] * t[2] - t[4] * t[4];
    m[1] = t[0] * t[2] - t[5] * t[5];
    m[2] = t[0] * t[1] - t[3] * t[3];
    m[3] = t[4] * t[5] - t[3] * t[2];
    m[4] = t[3] * t[5] - t[0] * t[4];
    m[5] = t[3] * t[4] - t[1] * t[5];

    let invdet = 1.0 / (t[0] * m[0] + t[3] * m[3] + t[5] * m[5]);

    [
        m[0] * invdet,
        m[1] * invdet,
        m[2] * invdet,
        m[3] * invdet,
        m[4] * invdet,
        m[5] * invdet,
    ]
}

/// Voigt 张量展开为 3×3 矩阵
#[inline]
pub fn sym_to_mat3(t: &SymTensor) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(t[0], t[3], t[5]),
        DVec3::new(t[3], t[1], t[4]),
        DVec3::new(t[5], t[4], t[2]),
    )
}

/// 各向同性张量 μ·I
#[inline]
pub fn sym_isotropic(mu: f64) -> SymTensor {
    [mu, mu, mu, 0.0, 0.0, 0.0]
}
