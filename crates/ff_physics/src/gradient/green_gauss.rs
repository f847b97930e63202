// crates/ff_physics/src/gradient/green_gauss.rs

//! Green-Gauss 梯度
//!
//! grad φ|_c = (1/V_c) Σ_f φ_f S_f n_f
//!
//! 非正交网格上面值含梯度修正项，因此做定点迭代：上一轮梯度
//! 参与面值插值，直到增量收敛或达到 `nswrgr` 次。
//! 边界面值经 I′ 重构：φ_f = a + b·(φ_c + grad_c·diipb)。

use ff_mesh::Mesh;
use glam::DVec3;

use super::{BoundaryFaceValues, GradientMethod};

/// 迭代收敛阈值（相对增量）
const SWEEP_EPS: f64 = 1e-10;

/// Green-Gauss 梯度计算器
#[derive(Debug, Clone, Default)]
pub struct GreenGaussGradient {
    nswrgr: usize,
    initial: Option<Vec<DVec3>>,
}

impl GreenGaussGradient {
    /// 创建，指定修正迭代次数
    pub fn new(nswrgr: usize) -> Self {
        Self {
            nswrgr: nswrgr.max(1),
            initial: None,
        }
    }

    /// 以已有梯度为初值（Green-Gauss-LSQ 组合路径）
    pub fn with_initial(nswrgr: usize, initial: &[DVec3]) -> Self {
        Self {
            nswrgr: nswrgr.max(1),
            initial: Some(initial.to_vec()),
        }
    }

    fn single_sweep(
        &self,
        mesh: &Mesh,
        values: &[f64],
        bc: BoundaryFaceValues<'_>,
        prev: &[DVec3],
        grad: &mut [DVec3],
    ) {
        for g in grad.iter_mut() {
            *g = DVec3::ZERO;
        }

        // 内部面
        for (f_id, &(ci, cj)) in mesh.i_face_cells.iter().enumerate() {
            let mid = 0.5 * (mesh.cell_cen[ci] + mesh.cell_cen[cj]);
            let offset = mesh.i_face_cog[f_id] - mid;
            let phi_f = 0.5 * (values[ci] + values[cj])
                + 0.5 * (prev[ci] + prev[cj]).dot(offset);
            let flux = phi_f * mesh.i_face_surf[f_id] * mesh.i_face_u_normal[f_id];
            grad[ci] += flux;
            grad[cj] -= flux;
        }

        // 边界面（I′ 重构后的面值）
        for f_id in 0..mesh.n_b_faces() {
            let c_id = mesh.b_face_cells[f_id];
            let phi_ip = values[c_id] + prev[c_id].dot(mesh.diipb[f_id]);
            let phi_f = bc.face_value(f_id, phi_ip);
            grad[c_id] += phi_f * mesh.b_face_surf[f_id] * mesh.b_face_u_normal[f_id];
        }

        for (c_id, g) in grad.iter_mut().enumerate().take(mesh.n_cells) {
            *g /= mesh.cell_vol[c_id];
        }
    }
}

impl GradientMethod for GreenGaussGradient {
    fn scalar_gradient(
        &self,
        mesh: &Mesh,
        values: &[f64],
        bc: BoundaryFaceValues<'_>,
        grad: &mut [DVec3],
    ) {
        let mut prev = match &self.initial {
            Some(init) => init.clone(),
            None => vec![DVec3::ZERO; grad.len()],
        };

        for _sweep in 0..self.nswrgr {
            self.single_sweep(mesh, values, bc, &prev, grad);
            mesh.halo.sync_vector(grad);

            let mut delta_max: f64 = 0.0;
            let mut norm_max: f64 = 0.0;
            for c in 0..mesh.n_cells {
                delta_max = delta_max.max((grad[c] - prev[c]).length());
                norm_max = norm_max.max(grad[c].length());
            }
            prev.copy_from_slice(grad);

            if delta_max <= SWEEP_EPS * norm_max.max(1.0) {
                break;
            }
        }
    }
}
