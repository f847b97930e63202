// crates/ff_physics/src/gradient/least_squares.rs

//! 加权最小二乘梯度
//!
//! 最小化 Σ_j w_j (φ_j − φ_i − ∇φ_i · r_ij)²，权重 w = 1/|r|²。
//! 模板为经内部面相邻的单元，加上边界面的 I′ 虚拟点贡献。
//! 法方程 3×3 对称，奇异时回退单次 Green-Gauss。

use ff_mesh::Mesh;
use glam::DVec3;

use super::green_gauss::GreenGaussGradient;
use super::{BoundaryFaceValues, GradientMethod};
use crate::math::{sym_inverse, sym_mat_vec, SymTensor};

/// 最小二乘梯度计算器
#[derive(Debug, Clone)]
pub struct LeastSquaresGradient {
    /// 行列式奇异判据（相对尺度）
    pub det_min: f64,
    /// 是否计入边界面贡献
    pub boundary_contributions: bool,
}

impl Default for LeastSquaresGradient {
    fn default() -> Self {
        Self {
            det_min: 1e-12,
            boundary_contributions: true,
        }
    }
}

impl LeastSquaresGradient {
    /// 单个单元的法方程累加与求解
    ///
    /// 返回 None 表示法方程奇异（模板退化）。
    pub(crate) fn solve_cell(
        &self,
        mesh: &Mesh,
        c_id: usize,
        values: &[f64],
        bc: Option<BoundaryFaceValues<'_>>,
        b_faces_of_cell: &[usize],
    ) -> Option<DVec3> {
        let xc = mesh.cell_cen[c_id];
        let phic = values[c_id];

        let mut a: SymTensor = [0.0; 6];
        let mut rhs = DVec3::ZERO;

        let mut accumulate = |r: DVec3, dphi: f64| {
            let w = 1.0 / r.length_squared().max(1e-30);
            a[0] += w * r.x * r.x;
            a[1] += w * r.y * r.y;
            a[2] += w * r.z * r.z;
            a[3] += w * r.x * r.y;
            a[4] += w * r.y * r.z;
            a[5] += w * r.x * r.z;
            rhs += w * dphi * r;
        };

        for &n_id in mesh.cell_neighbors(c_id) {
            accumulate(mesh.cell_cen[n_id] - xc, values[n_id] - phic);
        }

        if let Some(bc) = bc {
            for &f_id in b_faces_of_cell {
                // 虚拟点取面形心，面值经系数闭合
                let phi_f = bc.face_value(f_id, phic);
                accumulate(mesh.b_face_cog[f_id] - xc, phi_f - phic);
            }
        }

        let det = a[0] * (a[1] * a[2] - a[4] * a[4]) - a[3] * (a[3] * a[2] - a[4] * a[5])
            + a[5] * (a[3] * a[4] - a[1] * a[5]);
        let scale = ((a[0] + a[1] + a[2]) / 3.0).powi(3);
        if det.abs() <= self.det_min * scale.max(1e-30) {
            return None;
        }

        Some(sym_mat_vec(&sym_inverse(&a), rhs))
    }
}

impl GradientMethod for LeastSquaresGradient {
    fn scalar_gradient(
        &self,
        mesh: &Mesh,
        values: &[f64],
        bc: BoundaryFaceValues<'_>,
        grad: &mut [DVec3],
    ) {
        // 单元 → 边界面反向索引
        let mut cell_b_faces: Vec<Vec<usize>> = vec![Vec::new(); mesh.n_cells];
        if self.boundary_contributions {
            for (f_id, &c_id) in mesh.b_face_cells.iter().enumerate() {
                cell_b_faces[c_id].push(f_id);
            }
        }

        let mut fallback_cells = Vec::new();
        for c_id in 0..mesh.n_cells {
            let bc_opt = self.boundary_contributions.then_some(bc);
            match self.solve_cell(mesh, c_id, values, bc_opt, &cell_b_faces[c_id]) {
                Some(g) => grad[c_id] = g,
                None => fallback_cells.push(c_id),
            }
        }

        // 奇异单元回退 Green-Gauss
        if !fallback_cells.is_empty() {
            log::debug!("最小二乘法方程奇异，{} 个单元回退 Green-Gauss", fallback_cells.len());
            let mut gg = vec![DVec3::ZERO; grad.len()];
            GreenGaussGradient::new(1).scalar_gradient(mesh, values, bc, &mut gg);
            for c_id in fallback_cells {
                grad[c_id] = gg[c_id];
            }
        }

        mesh.halo.sync_vector(grad);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_mesh::CartesianBuilder;

    #[test]
    fn test_quadratic_field_reasonable() {
        // 二次场的最小二乘梯度在单元中心应接近解析导数
        let mesh = CartesianBuilder::new(6, 6, 1).build();
        let values: Vec<f64> = mesh.cell_cen.iter().map(|c| c.x * c.x).collect();
        let n_b = mesh.n_b_faces();

        let mut a = vec![0.0; n_b];
        let b = vec![0.0; n_b];
        for f in 0..n_b {
            a[f] = mesh.b_face_cog[f].x * mesh.b_face_cog[f].x;
        }

        let mut grad = vec![DVec3::ZERO; mesh.n_cells_ext];
        LeastSquaresGradient::default().scalar_gradient(
            &mesh,
            &values,
            BoundaryFaceValues { a: &a, b: &b },
            &mut grad,
        );

        // 内部单元（远离边界一层）
        for c in 0..mesh.n_cells {
            let x = mesh.cell_cen[c].x;
            if x > 0.2 && x < 0.8 {
                assert!((grad[c].x - 2.0 * x).abs() < 0.05, "x={x}, g={:?}", grad[c]);
            }
        }
    }

    #[test]
    fn test_degenerate_stencil_falls_back() {
        // 1x1x1 网格无内部邻居；关闭边界贡献则模板为空，必须回退
        let mesh = CartesianBuilder::new(1, 1, 1).build();
        let values = vec![1.0; mesh.n_cells_ext];
        let n_b = mesh.n_b_faces();
        let a = vec![0.0; n_b];
        let b = vec![1.0; n_b];

        let lsq = LeastSquaresGradient {
            boundary_contributions: false,
            ..Default::default()
        };
        let mut grad = vec![DVec3::ONE; mesh.n_cells_ext];
        lsq.scalar_gradient(
            &mesh,
            &values,
            BoundaryFaceValues { a: &a, b: &b },
            &mut grad,
        );
        // 常值场回退后的梯度为零
        assert!(grad[0].length() < 1e-12);
    }
}
