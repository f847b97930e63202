// crates/ff_physics/src/engine/timestep.rs

//! 局部时间步 / CFL-Fourier 控制器
//!
//! 每时间步在 Navier-Stokes 预测前调用一次：
//!
//! 1. 由速度质量通量与面粘性装配时间步矩阵行和
//!    （对流 U/Δx，扩散 2ν/Δx²）
//! 2. 求满足 Courant ≤ coumax、Fourier ≤ foumax 的逐单元上界；
//!    可压缩时另加质量 CFL ≤ cflmmx；VOF 激活时体积 Courant
//!    （密度除出）替换质量 Courant
//! 3. 密度梯度（浮力）尺度 1/√(∇ρ·g/ρ) 限制（可选）
//! 4. 渐进放大：增大时 dt ≤ (1+varrdt)·dt_old，减小立即生效
//! 5. 裁剪到 [dtmin, dtmax] 并统计裁剪单元数
//! 6. 自适应统一模式归约出全域单值，与外部耦合程序协商后写回
//!    每个单元；稳态算法改为 dt = relaxv·ρ·V/max(行和, ε)
//!
//! 全部归约经调度上下文与通信器。

use glam::DVec3;

use ff_config::{SolverConfig, TimeStepMode};
use ff_field::{registry::names, FieldRegistry};
use ff_foundation::{FfResult, EPZERO};
use ff_mesh::Mesh;
use ff_runtime::{Backend, Communicator, CouplingSync};

use crate::engine::matrix::{self, TimeStepBc, ViscosityInterpolation};
use crate::gradient::{self, BoundaryFaceValues};

/// 时间步控制器
pub struct LocalTimeStep<'a> {
    /// 网格只读视图
    pub mesh: &'a Mesh,
    /// 求解器配置
    pub config: &'a SolverConfig,
    /// 调度上下文
    pub backend: &'a dyn Backend,
    /// 进程间通信器
    pub comm: &'a dyn Communicator,
    /// 外部耦合协商
    pub coupling: &'a dyn CouplingSync,
}

/// 单步报告
#[derive(Debug, Clone, Default)]
pub struct TimeStepReport {
    /// 协商后的最大步数
    pub nt_max: usize,
    /// 统一模式的全域时间步
    pub dt_uniform: Option<f64>,
    /// 下限裁剪单元数
    pub n_clip_min: usize,
    /// 上限裁剪单元数
    pub n_clip_max: usize,
    /// 浮力尺度裁剪单元数
    pub n_clip_buoyancy: usize,
    /// 裁剪前极小值
    pub dt_min: f64,
    /// 裁剪前极大值
    pub dt_max: f64,
    /// 最大 Courant 数及所在单元
    pub courant_max: Option<(f64, usize)>,
    /// 最大 Fourier 数及所在单元
    pub fourier_max: Option<(f64, usize)>,
}

impl LocalTimeStep<'_> {
    /// 计算本步时间步数组
    ///
    /// `wcf` 为可压缩模块预先算好的质量 CFL 密度数组（1/s）。
    pub fn compute(
        &self,
        registry: &mut FieldRegistry,
        nt_cur: usize,
        nt_max: usize,
        wcf: Option<&[f64]>,
    ) -> FfResult<TimeStepReport> {
        let mesh = self.mesh;
        let opts = &self.config.time_step;
        let mode = self.config.time_step_mode;
        let n_cells = mesh.n_cells;

        let mut report = TimeStepReport {
            nt_max,
            ..Default::default()
        };

        let vel_id = registry.id_by_name(names::VELOCITY)?;
        let (iconv, idiff, idifft, relaxv) = {
            let eqp = &registry.field(vel_id).eqp;
            (eqp.iconv, eqp.idiff, eqp.idifft, eqp.relaxv)
        };

        let viscl: Vec<f64> = registry.by_name(names::MOLECULAR_VISCOSITY)?.val().to_vec();
        let visct: Vec<f64> = registry.by_name(names::TURBULENT_VISCOSITY)?.val().to_vec();
        let rho: Vec<f64> = registry.by_name(names::DENSITY)?.val().to_vec();

        // 质量通量（VOF 时另备体积通量）
        let (i_flux, b_flux) = self.mass_fluxes(registry, vel_id, &rho)?;
        let vol_fluxes = self
            .config
            .models
            .vof
            .then(|| self.volume_fluxes(registry, vel_id))
            .transpose()?;

        // 面扩散系数
        let mut i_visc = vec![0.0; mesh.n_i_faces()];
        let mut b_visc = vec![0.0; mesh.n_b_faces()];
        if idiff {
            let w1: Vec<f64> = (0..mesh.n_cells_ext)
                .map(|c| viscl[c] + if idifft { visct[c] } else { 0.0 })
                .collect();
            matrix::face_viscosity(
                mesh,
                ViscosityInterpolation::Arithmetic,
                &w1,
                &mut i_visc,
                &mut b_visc,
            );
        }

        // 边界闭合系数
        let bc = if mode.is_steady() {
            let vel_bc = registry.field(vel_id).bc()?;
            TimeStepBc::from_velocity_trace(&vel_bc.b, &vel_bc.bf, mesh.n_b_faces())
        } else {
            TimeStepBc::from_inflow(mesh, &b_flux, &viscl, &visct, idiff, idifft)
        };

        let mut dam = vec![0.0; mesh.n_cells_ext];

        if mode.is_steady() {
            // 稳态伪时间步：dt = relaxv·ρ·V / max(行和, ε)
            matrix::matrix_time_step(mesh, iconv, idiff, &bc, &i_flux, &b_flux, &i_visc, &mut dam)?;
            let dt_id = registry.id_by_name(names::DT)?;
            let dt = registry.field_mut(dt_id).val_mut();
            for c in 0..n_cells {
                dt[c] = relaxv * rho[c] * mesh.cell_vol[c] / dam[c].max(EPZERO);
            }
            self.backend.wait();
            return Ok(report);
        }

        // 浮力尺度限制（变时间步与常时间步都计算，供显示）
        let dt_rho_max = if opts.clip_by_density_scale {
            Some(self.density_scale_limit(registry, &rho)?)
        } else {
            None
        };

        if mode.is_variable() {
            let mut bound: Option<Vec<f64>> = None;

            // Courant 限制
            if opts.coumax > 0.0 && iconv {
                let (ci_flux, cb_flux) = match &vol_fluxes {
                    Some((vi, vb)) => (vi, vb),
                    None => (&i_flux, &b_flux),
                };
                matrix::matrix_time_step(
                    mesh, iconv, false, &bc, ci_flux, cb_flux, &i_visc, &mut dam,
                )?;
                let mut w: Vec<f64> = (0..n_cells)
                    .map(|c| {
                        // VOF 体积 Courant 不含密度
                        let rate = if vol_fluxes.is_some() {
                            dam[c] / mesh.cell_vol[c]
                        } else {
                            dam[c] / mesh.cell_vol[c] / rho[c]
                        };
                        opts.coumax / rate.max(EPZERO)
                    })
                    .collect();
                self.uniformize(mode, &mut w);
                bound = Some(w);
            }

            // Fourier 限制
            if opts.foumax > 0.0 && idiff {
                matrix::matrix_time_step(
                    mesh, false, idiff, &bc, &i_flux, &b_flux, &i_visc, &mut dam,
                )?;
                let mut w: Vec<f64> = (0..n_cells)
                    .map(|c| {
                        let rate = dam[c] / mesh.cell_vol[c] / rho[c];
                        opts.foumax / rate.max(EPZERO)
                    })
                    .collect();
                self.uniformize(mode, &mut w);
                bound = Some(match bound {
                    Some(b) => b.iter().zip(&w).map(|(x, y)| x.min(*y)).collect(),
                    None => w,
                });
            }

            // 可压缩质量 CFL
            if opts.coumax > 0.0 && self.config.models.compressible {
                if let Some(wcf) = wcf {
                    let mut w: Vec<f64> = (0..n_cells)
                        .map(|c| opts.cflmmx / wcf[c].max(EPZERO))
                        .collect();
                    self.uniformize(mode, &mut w);
                    bound = Some(match bound {
                        Some(b) => b.iter().zip(&w).map(|(x, y)| x.min(*y)).collect(),
                        None => w,
                    });
                }
            }

            let dt_id = registry.id_by_name(names::DT)?;
            let dt_field = registry.field_mut(dt_id);
            let dt = dt_field.val_mut();

            // 渐进放大，立即缩小
            if let Some(bound) = &bound {
                let unpvdt = 1.0 + opts.varrdt;
                for c in 0..n_cells {
                    dt[c] = if bound[c] >= dt[c] {
                        (unpvdt * dt[c]).min(bound[c])
                    } else {
                        bound[c]
                    };
                }
            }

            // 浮力尺度裁剪
            if let Some(w3) = &dt_rho_max {
                let mut n_clip = 0usize;
                for c in 0..n_cells {
                    if dt[c] > w3[c] {
                        dt[c] = w3[c];
                        n_clip += 1;
                    }
                }
                let mut counts = [n_clip];
                self.comm.allreduce_sum_counts(&mut counts);
                report.n_clip_buoyancy = counts[0];
                if report.n_clip_buoyancy > 0 {
                    log::warn!("时间步被密度尺度裁剪: {} 个单元", report.n_clip_buoyancy);
                }
            }

            report.dt_min = dt[..n_cells].iter().cloned().fold(f64::INFINITY, f64::min);
            report.dt_max = dt[..n_cells]
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);

            if mode == TimeStepMode::Adaptive {
                // 统一模式：单值裁剪、全域归约、外部协商、写回
                let mut dtloc = dt[0];
                if dtloc > opts.dtmax {
                    dtloc = opts.dtmax;
                    report.n_clip_max = n_cells;
                }
                if dtloc < opts.dtmin {
                    dtloc = opts.dtmin;
                    report.n_clip_min = n_cells;
                }

                dtloc = self.comm.allreduce_min(dtloc);
                let outcome = self.coupling.sync_coupled_apps(nt_cur, nt_max, dtloc);
                report.nt_max = outcome.nt_max;
                let dtloc = outcome.dt;

                dt[..n_cells].fill(dtloc);
                report.dt_uniform = Some(dtloc);

                log::info!("时间步 {}: dt = {:.6e}", nt_cur, dtloc);
            } else {
                // 局部模式：逐单元裁剪并计数
                let mut n_min = 0usize;
                let mut n_max = 0usize;
                for c in 0..n_cells {
                    if dt[c] > opts.dtmax {
                        dt[c] = opts.dtmax;
                        n_max += 1;
                    }
                    if dt[c] < opts.dtmin {
                        dt[c] = opts.dtmin;
                        n_min += 1;
                    }
                }
                let mut counts = [n_min, n_max];
                self.comm.allreduce_sum_counts(&mut counts);
                report.n_clip_min = counts[0];
                report.n_clip_max = counts[1];
                if counts[0] + counts[1] > 0 {
                    log::warn!(
                        "时间步裁剪: {} 个单元至 {:.4e}，{} 个单元至 {:.4e}",
                        counts[0],
                        opts.dtmin,
                        counts[1],
                        opts.dtmax
                    );
                }
            }
        }

        // Courant / Fourier 诊断（常数模式也输出）
        self.diagnostics(
            registry,
            &bc,
            &i_flux,
            &b_flux,
            &i_visc,
            &rho,
            iconv,
            idiff,
            &mut report,
        )?;

        self.backend.wait();
        Ok(report)
    }

    /// 自适应统一模式下把约束数组压成全域最小值
    fn uniformize(&self, mode: TimeStepMode, w: &mut [f64]) {
        if mode != TimeStepMode::Adaptive {
            return;
        }
        let local_min = self.backend.reduce_min(w.len(), &|i| w[i]);
        let global_min = self.comm.allreduce_min(local_min);
        w.fill(global_min);
    }

    /// 由速度与密度组装质量通量
    fn mass_fluxes(
        &self,
        registry: &FieldRegistry,
        vel_id: ff_field::FieldId,
        rho: &[f64],
    ) -> FfResult<(Vec<f64>, Vec<f64>)> {
        let mesh = self.mesh;
        let vel = registry.field(vel_id);

        // 质量通量字段已注册时直接取用
        if let (Some(i_id), Some(b_id)) = (vel.meta.inner_mass_flux, vel.meta.boundary_mass_flux) {
            return Ok((
                registry.field(i_id).val().to_vec(),
                registry.field(b_id).val().to_vec(),
            ));
        }

        let v = vel.val();
        let vel_at = |c: usize| DVec3::new(v[c * 3], v[c * 3 + 1], v[c * 3 + 2]);

        let i_flux = (0..mesh.n_i_faces())
            .map(|f| {
                let (ci, cj) = mesh.i_face_cells[f];
                let u_f = 0.5 * (vel_at(ci) + vel_at(cj));
                let rho_f = 0.5 * (rho[ci] + rho[cj]);
                rho_f * u_f.dot(mesh.i_face_u_normal[f]) * mesh.i_face_surf[f]
            })
            .collect();

        let b_flux = (0..mesh.n_b_faces())
            .map(|f| {
                let c = mesh.b_face_cells[f];
                rho[c] * vel_at(c).dot(mesh.b_face_u_normal[f]) * mesh.b_face_surf[f]
            })
            .collect();

        Ok((i_flux, b_flux))
    }

    /// VOF 体积通量（密度除出）
    fn volume_fluxes(
        &self,
        registry: &FieldRegistry,
        vel_id: ff_field::FieldId,
    ) -> FfResult<(Vec<f64>, Vec<f64>)> {
        let mesh = self.mesh;
        let vel = registry.field(vel_id);
        let v = vel.val();
        let vel_at = |c: usize| DVec3::new(v[c * 3], v[c * 3 + 1], v[c * 3 + 2]);

        let i_flux = (0..mesh.n_i_faces())
            .map(|f| {
                let (ci, cj) = mesh.i_face_cells[f];
                let u_f = 0.5 * (vel_at(ci) + vel_at(cj));
                u_f.dot(mesh.i_face_u_normal[f]) * mesh.i_face_surf[f]
            })
            .collect();
        let b_flux = (0..mesh.n_b_faces())
            .map(|f| {
                let c = mesh.b_face_cells[f];
                vel_at(c).dot(mesh.b_face_u_normal[f]) * mesh.b_face_surf[f]
            })
            .collect();
        Ok((i_flux, b_flux))
    }

    /// 密度梯度（浮力）时间步尺度 1/√max(ε, ∇ρ·g/ρ)
    fn density_scale_limit(
        &self,
        registry: &FieldRegistry,
        rho: &[f64],
    ) -> FfResult<Vec<f64>> {
        let mesh = self.mesh;
        let n_b = mesh.n_b_faces();
        let g = DVec3::from_array(self.config.gravity);

        // 边界面密度：专用字段存在时为 Dirichlet，否则零梯度
        let (bc_a, bc_b) = match registry.try_id_by_name(names::BOUNDARY_DENSITY) {
            Some(id) => (registry.field(id).val()[..n_b].to_vec(), vec![0.0; n_b]),
            None => (vec![0.0; n_b], vec![1.0; n_b]),
        };

        let mut grad = vec![DVec3::ZERO; mesh.n_cells_ext];
        gradient::scalar_gradient(
            ff_field::GradientType::GreenGaussIter,
            1,
            mesh,
            rho,
            BoundaryFaceValues { a: &bc_a, b: &bc_b },
            &mut grad,
        );

        Ok((0..mesh.n_cells)
            .map(|c| {
                let rate = grad[c].dot(g) / rho[c];
                1.0 / rate.max(EPZERO).sqrt()
            })
            .collect())
    }

    /// Courant / Fourier 诊断极值与位置
    #[allow(clippy::too_many_arguments)]
    fn diagnostics(
        &self,
        registry: &FieldRegistry,
        bc: &TimeStepBc,
        i_flux: &[f64],
        b_flux: &[f64],
        i_visc: &[f64],
        rho: &[f64],
        iconv: bool,
        idiff: bool,
        report: &mut TimeStepReport,
    ) -> FfResult<()> {
        let mesh = self.mesh;
        let n_cells = mesh.n_cells;
        let dt: Vec<f64> = registry.by_name(names::DT)?.val().to_vec();
        let mut dam = vec![0.0; mesh.n_cells_ext];

        if iconv {
            matrix::matrix_time_step(mesh, true, false, bc, i_flux, b_flux, i_visc, &mut dam)?;
            let r = self.backend.reduce_minmax_loc(n_cells, &|c| {
                dam[c] / mesh.cell_vol[c] / rho[c] * dt[c]
            });
            report.courant_max = Some((self.comm.allreduce_max(r.max), r.max_loc));
        }
        if idiff {
            matrix::matrix_time_step(mesh, false, true, bc, i_flux, b_flux, i_visc, &mut dam)?;
            let r = self.backend.reduce_minmax_loc(n_cells, &|c| {
                dam[c] / mesh.cell_vol[c] / rho[c] * dt[c]
            });
            report.fourier_max = Some((self.comm.allreduce_max(r.max), r.max_loc));
        }

        if let Some((cmax, loc)) = report.courant_max {
            log::debug!(
                "Courant 最大 {:.4e}，单元 {}（{:?}）",
                cmax,
                loc,
                mesh.cell_cen[loc]
            );
        }
        if let Some((fmax, loc)) = report.fourier_max {
            log::debug!(
                "Fourier 最大 {:.4e}，单元 {}（{:?}）",
                fmax,
                loc,
                mesh.cell_cen[loc]
            );
        }
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================
