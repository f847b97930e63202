// crates/ff_physics/src/engine/matrix.rs

//! 时间步矩阵
//!
//! 时间步控制器消费的逐单元矩阵行和：
//!
//! - 对流：迎风装配，非对称，每面贡献 `max(u·n·S, 0)`
//! - 扩散：对称，每面贡献 `ν_f·S/d`
//!
//! 边界面经一对 (coefbt, cofbft) 系数闭合：入流面贡献扩散
//! （Dirichlet 型），出流面贡献对流（零梯度型）。

use ff_foundation::{FfError, FfResult};
use ff_mesh::Mesh;

/// 面粘性插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViscosityInterpolation {
    /// 算术平均
    #[default]
    Arithmetic,
    /// 调和平均
    Harmonic,
}

/// 单元粘性 → 面粘性系数
///
/// 输出已含几何因子：`i_visc[f] = ν_f·S/d`，`b_visc[f] = ν_c·S/d_b`。
pub fn face_viscosity(
    mesh: &Mesh,
    interp: ViscosityInterpolation,
    cell_visc: &[f64],
    i_visc: &mut [f64],
    b_visc: &mut [f64],
) {
    for (f_id, &(ci, cj)) in mesh.i_face_cells.iter().enumerate() {
        let vi = cell_visc[ci];
        let vj = cell_visc[cj];
        let v_f = match interp {
            ViscosityInterpolation::Arithmetic => 0.5 * (vi + vj),
            ViscosityInterpolation::Harmonic => {
                if vi + vj > 0.0 {
                    2.0 * vi * vj / (vi + vj)
                } else {
                    0.0
                }
            }
        };
        i_visc[f_id] = v_f * mesh.i_face_surf[f_id] / mesh.i_dist[f_id];
    }

    for f_id in 0..mesh.n_b_faces() {
        let c = mesh.b_face_cells[f_id];
        b_visc[f_id] = cell_visc[c] * mesh.b_face_surf[f_id] / mesh.b_dist[f_id];
    }
}

/// 时间步矩阵的边界系数对
#[derive(Debug, Clone)]
pub struct TimeStepBc {
    /// 面值斜率（对流闭合）
    pub coefbt: Vec<f64>,
    /// 通量斜率（扩散闭合），量纲为 ν/d
    pub cofbft: Vec<f64>,
}

impl TimeStepBc {
    /// 变时间步路径：入流面 Dirichlet 型（0, hint），其余零梯度（1, 0）
    pub fn from_inflow(
        mesh: &Mesh,
        b_mass_flux: &[f64],
        viscl: &[f64],
        visct: &[f64],
        idiff: bool,
        idifft: bool,
    ) -> Self {
        let n_b = mesh.n_b_faces();
        let mut coefbt = vec![1.0; n_b];
        let mut cofbft = vec![0.0; n_b];

        for f_id in 0..n_b {
            if b_mass_flux[f_id] < 0.0 {
                let c = mesh.b_face_cells[f_id];
                let hint = if idiff {
                    (viscl[c] + if idifft { visct[c] } else { 0.0 }) / mesh.b_dist[f_id]
                } else {
                    0.0
                };
                coefbt[f_id] = 0.0;
                cofbft[f_id] = hint;
            }
        }
        Self { coefbt, cofbft }
    }

    /// 稳态路径：取速度 3×3 系数块迹的三分之一
    pub fn from_velocity_trace(vel_b: &[f64], vel_bf: &[f64], n_b_faces: usize) -> Self {
        let mult = 1.0 / 3.0;
        let mut coefbt = vec![0.0; n_b_faces];
        let mut cofbft = vec![0.0; n_b_faces];
        for f_id in 0..n_b_faces {
            let base = f_id * 9;
            coefbt[f_id] = (vel_b[base] + vel_b[base + 4] + vel_b[base + 8]) * mult;
            cofbft[f_id] = (vel_bf[base] + vel_bf[base + 4] + vel_bf[base + 8]) * mult;
        }
        Self { coefbt, cofbft }
    }
}

/// 时间步矩阵行和
///
/// `dam[c]` 累加对流与扩散的对角贡献；`i_mass_flux` / `b_mass_flux`
/// 为带密度与面积的质量通量 [kg/s]，`i_visc` 已含几何因子。
pub fn matrix_time_step(
    mesh: &Mesh,
    iconv: bool,
    idiff: bool,
    bc: &TimeStepBc,
    i_mass_flux: &[f64],
    b_mass_flux: &[f64],
    i_visc: &[f64],
    dam: &mut [f64],
) -> FfResult<()> {
    FfError::check_size("i_mass_flux", mesh.n_i_faces(), i_mass_flux.len())?;
    FfError::check_size("b_mass_flux", mesh.n_b_faces(), b_mass_flux.len())?;
    FfError::check_size("dam", mesh.n_cells_ext, dam.len())?;

    dam.fill(0.0);

    // 内部面
    for (f_id, &(ci, cj)) in mesh.i_face_cells.iter().enumerate() {
        let flux = i_mass_flux[f_id];
        if iconv {
            // 迎风对角：i 侧出流 max(flux,0)，j 侧出流 max(-flux,0)
            dam[ci] += flux.max(0.0);
            dam[cj] += (-flux).max(0.0);
        }
        if idiff {
            dam[ci] += i_visc[f_id];
            dam[cj] += i_visc[f_id];
        }
    }

    // 边界面
    for f_id in 0..mesh.n_b_faces() {
        let c = mesh.b_face_cells[f_id];
        let flux = b_mass_flux[f_id];
        if iconv {
            dam[c] += flux.max(0.0) + flux.min(0.0) * bc.coefbt[f_id];
        }
        if idiff {
            dam[c] += bc.cofbft[f_id] * mesh.b_face_surf[f_id];
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_mesh::CartesianBuilder;

    #[test]
    fn test_face_viscosity_arithmetic_vs_harmonic() {
        let mesh = CartesianBuilder::new(2, 1, 1).build();
        let mut cell_visc = vec![1.0; mesh.n_cells_ext];
        cell_visc[1] = 3.0;

        let mut i_visc = vec![0.0; mesh.n_i_faces()];
        let mut b_visc = vec![0.0; mesh.n_b_faces()];

        face_viscosity(
            &mesh,
            ViscosityInterpolation::Arithmetic,
            &cell_visc,
            &mut i_visc,
            &mut b_visc,
        );
        let geom = mesh.i_face_surf[0] / mesh.i_dist[0];
        assert!((i_visc[0] - 2.0 * geom).abs() < 1e-12);

        face_viscosity(
            &mesh,
            ViscosityInterpolation::Harmonic,
            &cell_visc,
            &mut i_visc,
            &mut b_visc,
        );
        assert!((i_visc[0] - 1.5 * geom).abs() < 1e-12);
    }

    #[test]
    fn test_inflow_bc_pair() {
        let mesh = CartesianBuilder::new(2, 1, 1).build();
        let n_b = mesh.n_b_faces();
        // 面 0 入流，其余出流
        let mut b_flux = vec![1.0; n_b];
        b_flux[0] = -1.0;

        let viscl = vec![2.0; mesh.n_cells_ext];
        let visct = vec![1.0; mesh.n_cells_ext];
        let bc = TimeStepBc::from_inflow(&mesh, &b_flux, &viscl, &visct, true, true);

        assert_eq!(bc.coefbt[0], 0.0);
        assert!((bc.cofbft[0] - 3.0 / mesh.b_dist[0]).abs() < 1e-12);
        assert_eq!(bc.coefbt[1], 1.0);
        assert_eq!(bc.cofbft[1], 0.0);
    }

    #[test]
    fn test_convection_upwind_asymmetric() {
        let mesh = CartesianBuilder::new(2, 1, 1).build();
        let n_b = mesh.n_b_faces();
        let bc = TimeStepBc {
            coefbt: vec![1.0; n_b],
            cofbft: vec![0.0; n_b],
        };
        // 内部面 0→1 正通量
        let i_flux = vec![2.0; mesh.n_i_faces()];
        let b_flux = vec![0.0; n_b];
        let i_visc = vec![0.0; mesh.n_i_faces()];

        let mut dam = vec![0.0; mesh.n_cells_ext];
        matrix_time_step(&mesh, true, false, &bc, &i_flux, &b_flux, &i_visc, &mut dam).unwrap();

        // 迎风：出流侧（单元 0）计入，下游侧不计
        assert!((dam[0] - 2.0).abs() < 1e-12);
        assert!(dam[1].abs() < 1e-12);
    }

    #[test]
    fn test_diffusion_symmetric() {
        let mesh = CartesianBuilder::new(2, 1, 1).build();
        let n_b = mesh.n_b_faces();
        let bc = TimeStepBc {
            coefbt: vec![1.0; n_b],
            cofbft: vec![0.0; n_b],
        };
        let i_flux = vec![0.0; mesh.n_i_faces()];
        let b_flux = vec![0.0; n_b];
        let i_visc = vec![5.0; mesh.n_i_faces()];

        let mut dam = vec![0.0; mesh.n_cells_ext];
        matrix_time_step(&mesh, false, true, &bc, &i_flux, &b_flux, &i_visc, &mut dam).unwrap();

        assert!((dam[0] - 5.0).abs() < 1e-12);
        assert!((dam[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_inflow_no_convection_diag() {
        let mesh = CartesianBuilder::new(1, 1, 1).build();
        let n_b = mesh.n_b_faces();
        let viscl = vec![1.0; 1];
        let visct = vec![0.0; 1];
        let mut b_flux = vec![0.0; n_b];
        b_flux[0] = -3.0; // 入流
        b_flux[1] = 3.0; // 出流

        let bc = TimeStepBc::from_inflow(&mesh, &b_flux, &viscl, &visct, false, false);
        let mut dam = vec![0.0; 1];
        matrix_time_step(&mesh, true, false, &bc, &[], &b_flux, &[], &mut dam).unwrap();

        // 入流面被 coefbt=0 抵消，只剩出流面贡献
        assert!((dam[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_steady_trace_bc() {
        let n_b = 1usize;
        let mut vel_b = vec![0.0; 9];
        let mut vel_bf = vec![0.0; 9];
        // b = diag(1, 1, 0)，bf = diag(3, 3, 3)
        vel_b[0] = 1.0;
        vel_b[4] = 1.0;
        vel_bf[0] = 3.0;
        vel_bf[4] = 3.0;
        vel_bf[8] = 3.0;

        let bc = TimeStepBc::from_velocity_trace(&vel_b, &vel_bf, n_b);
        assert!((bc.coefbt[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((bc.cofbft[0] - 3.0).abs() < 1e-12);
    }
}
