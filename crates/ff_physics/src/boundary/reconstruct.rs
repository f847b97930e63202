// crates/ff_physics/src/boundary/reconstruct.rs

//! 投影点 I′ 重构
//!
//! 参与壁面律、对称闭合、辐射或热耦合的变量需要其在每个边界面
//! 投影点 I′（单元中心向面作垂线的垂足）处的值。按字段方程参数
//! 在两条路径中选择：
//!
//! - 单元梯度路径：按字段配置的梯度算法算全域梯度，
//!   φ_I′ = φ_c + ∇φ·diipb
//! - 仅边界最小二乘路径：模板限制在边界面所属单元及其面邻居，
//!   带边界专用裁剪系数 `climgr_b`，避免只需边界值时的全域梯度
//!
//! 两条路径都先做 halo 同步；向量与张量经旋转周期面时走
//! 旋转感知交换。

use ff_field::{BoundaryReconstruction, Field};
use ff_foundation::FfResult;
use ff_mesh::Mesh;
use glam::DVec3;

use crate::gradient::{self, BoundaryFaceValues, LeastSquaresGradient};

/// 取值时间层
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeLevel {
    /// 当前时刻
    #[default]
    Current,
    /// 前一时刻（字段须保存多个时间层）
    Previous,
}

/// 标量场在全部边界面 I′ 处的值
///
/// `bc_a` / `bc_b` 为该标量的面值系数（长度 = 边界面数）。
pub fn scalar_at_iprime(
    mesh: &Mesh,
    field: &Field,
    bc_a: &[f64],
    bc_b: &[f64],
    time: TimeLevel,
) -> FfResult<Vec<f64>> {
    let source = match time {
        TimeLevel::Current => field.val(),
        TimeLevel::Previous => field.val_prev()?,
    };

    // halo 同步后的工作副本
    let mut values = source.to_vec();
    mesh.halo.sync_scalar(&mut values);

    let bc = BoundaryFaceValues { a: bc_a, b: bc_b };
    let n_b = mesh.n_b_faces();
    let mut out = vec![0.0; n_b];

    match field.eqp.b_reconstruction {
        BoundaryReconstruction::CellGradient => {
            let mut grad = vec![DVec3::ZERO; mesh.n_cells_ext];
            gradient::scalar_gradient(
                field.eqp.gradient,
                field.eqp.nswrgr,
                mesh,
                &values,
                bc,
                &mut grad,
            );
            for f_id in 0..n_b {
                let c_id = mesh.b_face_cells[f_id];
                out[f_id] = values[c_id] + grad[c_id].dot(mesh.diipb[f_id]);
            }
        }
        BoundaryReconstruction::BoundaryLsq => {
            boundary_lsq_scalar(mesh, &values, bc, field.eqp.climgr_b, &mut out);
        }
    }

    Ok(out)
}

/// 向量场在全部边界面 I′ 处的值
///
/// `bc_a` / `bc_b_diag` 为逐分量面值系数（长度 = 3·边界面数）。
pub fn vector_at_iprime(
    mesh: &Mesh,
    field: &Field,
    bc_a: &[f64],
    bc_b_diag: &[f64],
    time: TimeLevel,
) -> FfResult<Vec<DVec3>> {
    let source = match time {
        TimeLevel::Current => field.val(),
        TimeLevel::Previous => field.val_prev()?,
    };

    let mut values: Vec<DVec3> = (0..mesh.n_cells_ext)
        .map(|c| DVec3::new(source[c * 3], source[c * 3 + 1], source[c * 3 + 2]))
        .collect();
    mesh.halo.sync_vector(&mut values);

    let n_b = mesh.n_b_faces();
    let n = mesh.n_cells_ext;
    let mut out = vec![DVec3::ZERO; n_b];

    // 逐分量走标量路径
    let mut comp_vals = vec![0.0; n];
    let mut comp_a = vec![0.0; n_b];
    let mut comp_b = vec![0.0; n_b];
    let mut comp_out = vec![0.0; n_b];
    for comp in 0..3 {
        for c in 0..n {
            comp_vals[c] = values[c][comp];
        }
        for f in 0..n_b {
            comp_a[f] = bc_a[f * 3 + comp];
            comp_b[f] = bc_b_diag[f * 3 + comp];
        }
        let bc = BoundaryFaceValues {
            a: &comp_a,
            b: &comp_b,
        };
        match field.eqp.b_reconstruction {
            BoundaryReconstruction::CellGradient => {
                let mut grad = vec![DVec3::ZERO; n];
                gradient::scalar_gradient(
                    field.eqp.gradient,
                    field.eqp.nswrgr,
                    mesh,
                    &comp_vals,
                    bc,
                    &mut grad,
                );
                for f_id in 0..n_b {
                    let c_id = mesh.b_face_cells[f_id];
                    comp_out[f_id] = comp_vals[c_id] + grad[c_id].dot(mesh.diipb[f_id]);
                }
            }
            BoundaryReconstruction::BoundaryLsq => {
                boundary_lsq_scalar(mesh, &comp_vals, bc, field.eqp.climgr_b, &mut comp_out);
            }
        }
        for f in 0..n_b {
            out[f][comp] = comp_out[f];
        }
    }

    Ok(out)
}

/// 对称张量场在全部边界面 I′ 处的值
pub fn sym_tensor_at_iprime(
    mesh: &Mesh,
    field: &Field,
    bc_a: &[f64],
    bc_b_diag: &[f64],
    time: TimeLevel,
) -> FfResult<Vec<[f64; 6]>> {
    let source = match time {
        TimeLevel::Current => field.val(),
        TimeLevel::Previous => field.val_prev()?,
    };

    let n = mesh.n_cells_ext;
    let mut values: Vec<[f64; 6]> = (0..n)
        .map(|c| {
            let mut t = [0.0; 6];
            t.copy_from_slice(&source[c * 6..(c + 1) * 6]);
            t
        })
        .collect();
    mesh.halo.sync_sym_tensor(&mut values);

    let n_b = mesh.n_b_faces();
    let mut out = vec![[0.0; 6]; n_b];

    let mut comp_vals = vec![0.0; n];
    let mut comp_a = vec![0.0; n_b];
    let mut comp_b = vec![0.0; n_b];
    let mut comp_out = vec![0.0; n_b];
    for comp in 0..6 {
        for c in 0..n {
            comp_vals[c] = values[c][comp];
        }
        for f in 0..n_b {
            comp_a[f] = bc_a[f * 6 + comp];
            comp_b[f] = bc_b_diag[f * 6 + comp];
        }
        let bc = BoundaryFaceValues {
            a: &comp_a,
            b: &comp_b,
        };
        // 张量只在边界闭合中使用，固定走仅边界路径
        boundary_lsq_scalar(mesh, &comp_vals, bc, field.eqp.climgr_b, &mut comp_out);
        for f in 0..n_b {
            out[f][comp] = comp_out[f];
        }
    }

    Ok(out)
}

/// 仅边界模板的最小二乘 I′ 重构
///
/// 对每个边界面：以其所属单元的面邻居 + 该单元全部边界面为模板，
/// 局部求解梯度，φ_I′ = φ_c + g·diipb，并按 `climgr_b` 裁剪在
/// 模板值范围的放大区间内。
fn boundary_lsq_scalar(
    mesh: &Mesh,
    values: &[f64],
    bc: BoundaryFaceValues<'_>,
    climgr_b: f64,
    out: &mut [f64],
) {
    // 单元 → 边界面反向索引
    let mut cell_b_faces: Vec<Vec<usize>> = vec![Vec::new(); mesh.n_cells];
    for (f_id, &c_id) in mesh.b_face_cells.iter().enumerate() {
        cell_b_faces[c_id].push(f_id);
    }

    let lsq = LeastSquaresGradient::default();

    for f_id in 0..mesh.n_b_faces() {
        let c_id = mesh.b_face_cells[f_id];
        let phic = values[c_id];

        let grad = lsq
            .solve_cell(mesh, c_id, values, Some(bc), &cell_b_faces[c_id])
            .unwrap_or(DVec3::ZERO);

        let mut phi_ip = phic + grad.dot(mesh.diipb[f_id]);

        // 裁剪：增量不得超出模板最大跳量的 climgr_b 倍
        if climgr_b > 0.0 {
            let mut dmax: f64 = 0.0;
            for &n_id in mesh.cell_neighbors(c_id) {
                dmax = dmax.max((values[n_id] - phic).abs());
            }
            for &bf in &cell_b_faces[c_id] {
                dmax = dmax.max((bc.face_value(bf, phic) - phic).abs());
            }
            let bound = climgr_b * dmax;
            phi_ip = phi_ip.clamp(phic - bound, phic + bound);
        }

        out[f_id] = phi_ip;
    }
}
