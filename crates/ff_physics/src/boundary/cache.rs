// crates/ff_physics/src/boundary/cache.rs

//! 边界面值缓存
//!
//! 每外层迭代首次请求时，为参与梯度计算的字段缓存：
//!
//! - `val_ip`: φ 在 I′ 的重构值
//! - `val_f  = a + b·val_ip`: 面值
//! - `val_f_d = af + bf·val_ip`: 扩散通量面值
//! - 扩散限制器激活时另建 `val_f_lim` / `val_f_d_lim`
//!   （由限制器约束的 I′ 值组成）
//!
//! 双重用途：把 I′ 重构在一轮迭代的多次梯度计算间摊销；
//! 给扩散核一个与边界码无关的统一面值数组。系数数组被覆盖时
//! 缓存随之失效（[`ff_field::BcCoeffs::invalidate_cache`]）。

use ff_field::{Field, GradientLimiter};
use ff_foundation::FfResult;
use ff_mesh::Mesh;

use crate::boundary::reconstruct::{self, TimeLevel};

/// 确保标量 / 向量字段的面值缓存就绪（已就绪时直接返回）
pub fn ensure_face_value_cache(mesh: &Mesh, field: &mut Field) -> FfResult<()> {
    let bc = field.bc()?;
    if bc.val_f.is_some() {
        return Ok(());
    }

    let dim = field.dim;
    let n_b = mesh.n_b_faces();
    let limiter_active = field.eqp.limiter != GradientLimiter::None;

    // I′ 值：标量直接走标量路径；向量逐分量
    let (bc_a, bc_b_diag) = {
        let bc = field.bc()?;
        (bc.a.clone(), diag_of_blocks(&bc.b, n_b, dim))
    };
    let val_ip: Vec<f64> = match dim {
        1 => reconstruct::scalar_at_iprime(mesh, field, &bc_a, &bc_b_diag, TimeLevel::Current)?,
        3 => {
            let ip =
                reconstruct::vector_at_iprime(mesh, field, &bc_a, &bc_b_diag, TimeLevel::Current)?;
            let mut flat = vec![0.0; n_b * 3];
            for f in 0..n_b {
                for c in 0..3 {
                    flat[f * 3 + c] = ip[f][c];
                }
            }
            flat
        }
        _ => {
            // 张量字段不参与统一面值缓存
            return Ok(());
        }
    };

    // 限制器约束的 I′ 值：按 climgr 把重构增量压回单元值附近
    let val_ip_lim = limiter_active.then(|| {
        let climgr = field.eqp.climgr;
        let mut lim = val_ip.clone();
        for f in 0..n_b {
            let c_id = mesh.b_face_cells[f];
            for comp in 0..dim {
                let phic = field.val()[c_id * dim + comp];
                let delta = lim[f * dim + comp] - phic;
                let bound = climgr * phic.abs().max(1e-30);
                lim[f * dim + comp] = phic + delta.clamp(-bound, bound);
            }
        }
        lim
    });

    let bc = field.bc_mut()?;
    let build = |ip: &[f64], bc: &ff_field::BcCoeffs| {
        let mut val_f = vec![0.0; n_b * dim];
        let mut val_f_d = vec![0.0; n_b * dim];
        for f in 0..n_b {
            for i in 0..dim {
                let mut vf = bc.a[f * dim + i];
                let mut vfd = bc.af[f * dim + i];
                for j in 0..dim {
                    let s = f * dim * dim + i * dim + j;
                    vf += bc.b[s] * ip[f * dim + j];
                    vfd += bc.bf[s] * ip[f * dim + j];
                }
                val_f[f * dim + i] = vf;
                val_f_d[f * dim + i] = vfd;
            }
        }
        (val_f, val_f_d)
    };

    let (val_f, val_f_d) = build(&val_ip, bc);
    bc.val_f = Some(val_f);
    bc.val_f_d = Some(val_f_d);

    if let Some(ip_lim) = val_ip_lim {
        let (val_f_lim, val_f_d_lim) = build(&ip_lim, bc);
        bc.val_f_lim = Some(val_f_lim);
        bc.val_f_d_lim = Some(val_f_d_lim);
    }

    Ok(())
}

/// 提取逐面 b 块的对角元
fn diag_of_blocks(b: &[f64], n_b: usize, dim: usize) -> Vec<f64> {
    let mut out = vec![0.0; n_b * dim];
    for f in 0..n_b {
        for i in 0..dim {
            out[f * dim + i] = b[f * dim * dim + i * dim + i];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_field::Field;
    use ff_mesh::CartesianBuilder;
    use glam::DVec3;

    fn dirichlet_scalar_field(mesh: &Mesh, g: DVec3) -> Field {
        let mut f = Field::new("temperature", 1, mesh.n_cells_ext);
        for c in 0..mesh.n_cells_ext {
            f.val_mut()[c] = g.dot(mesh.cell_cen[c]);
        }
        f.allocate_bc(mesh.n_b_faces());
        let bc = f.bc_mut().unwrap();
        for fa in 0..mesh.n_b_faces() {
            bc.a[fa] = g.dot(mesh.b_face_cog[fa]);
            bc.b[fa] = 0.0;
            bc.af[fa] = 0.0;
            bc.bf[fa] = 0.0;
        }
        f
    }

    #[test]
    fn test_cache_built_once() {
        let mesh = CartesianBuilder::new(3, 3, 1).build();
        let mut field = dirichlet_scalar_field(&mesh, DVec3::new(1.0, 0.5, 0.0));

        ensure_face_value_cache(&mesh, &mut field).unwrap();
        let first = field.bc().unwrap().val_f.clone().unwrap();

        // 第二次请求命中缓存
        ensure_face_value_cache(&mesh, &mut field).unwrap();
        assert_eq!(field.bc().unwrap().val_f.as_ref().unwrap(), &first);
    }

    #[test]
    fn test_val_f_matches_dirichlet() {
        let mesh = CartesianBuilder::new(4, 2, 1).build();
        let g = DVec3::new(2.0, -1.0, 0.0);
        let mut field = dirichlet_scalar_field(&mesh, g);

        ensure_face_value_cache(&mesh, &mut field).unwrap();
        let bc = field.bc().unwrap();
        let val_f = bc.val_f.as_ref().unwrap();
        for f in 0..mesh.n_b_faces() {
            // 强 Dirichlet: val_f = a
            assert!((val_f[f] - bc.a[f]).abs() < 1e-12);
        }
        // 无限制器时不建 lim 对
        assert!(bc.val_f_lim.is_none());
    }

    #[test]
    fn test_invalidate_rebuilds() {
        let mesh = CartesianBuilder::new(2, 2, 1).build();
        let mut field = dirichlet_scalar_field(&mesh, DVec3::X);

        ensure_face_value_cache(&mesh, &mut field).unwrap();
        {
            let bc = field.bc_mut().unwrap();
            bc.a[0] = 99.0;
            bc.invalidate_cache();
        }
        ensure_face_value_cache(&mesh, &mut field).unwrap();
        let bc = field.bc().unwrap();
        assert!((bc.val_f.as_ref().unwrap()[0] - 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_limiter_builds_second_pair() {
        let mesh = CartesianBuilder::new(2, 2, 1).build();
        let mut field = dirichlet_scalar_field(&mesh, DVec3::X);
        field.eqp.limiter = ff_field::GradientLimiter::CellBased;

        ensure_face_value_cache(&mesh, &mut field).unwrap();
        let bc = field.bc().unwrap();
        assert!(bc.val_f_lim.is_some());
        assert!(bc.val_f_d_lim.is_some());
    }
}
