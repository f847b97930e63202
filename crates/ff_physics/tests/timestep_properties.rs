// crates/ff_physics/tests/timestep_properties.rs
//!
//! 时间步控制器的可测性质
//!
//! - dtmin ≤ dt ≤ dtmax 对所有单元、所有步成立（变时间步）
//! - 自适应统一模式：全域方差为零
//! - 收敛后 Courant / Fourier 不超过用户上限一个渐进放大步

use ff_config::{SolverConfig, TimeStepMode};
use ff_field::{registry::names, Field, FieldRegistry};
use ff_mesh::{CartesianBuilder, Mesh};
use ff_physics::engine::timestep::LocalTimeStep;
use ff_runtime::{CpuBackend, SingleRank};

fn setup(mesh: &Mesh, u: f64, visc: f64, dt0: f64) -> FieldRegistry {
    let mut reg = FieldRegistry::new();
    let n = mesh.n_cells_ext;

    let mut vel = Field::new(names::VELOCITY, 3, n);
    for c in 0..n {
        vel.val_mut()[c * 3] = u;
    }
    vel.allocate_bc(mesh.n_b_faces());
    reg.add(vel).unwrap();

    for (nm, v) in [
        (names::MOLECULAR_VISCOSITY, visc),
        (names::TURBULENT_VISCOSITY, 0.0),
        (names::DENSITY, 1.0),
        (names::DT, dt0),
    ] {
        let mut f = Field::new(nm, 1, n);
        f.val_mut().fill(v);
        reg.add(f).unwrap();
    }
    reg
}

#[test]
fn dt_bounds_hold_over_many_steps() {
    let mesh = CartesianBuilder::new(10, 5, 1).build();
    let mut reg = setup(&mesh, 1.5, 1e-4, 1e-5);

    let mut config = SolverConfig::default();
    config.time_step_mode = TimeStepMode::Local;
    config.time_step.coumax = 0.7;
    config.time_step.foumax = 5.0;
    config.time_step.dtmin = 1e-7;
    config.time_step.dtmax = 0.5;

    let backend = CpuBackend::new();
    let comm = SingleRank;
    let ctl = LocalTimeStep {
        mesh: &mesh,
        config: &config,
        backend: &backend,
        comm: &comm,
        coupling: &comm,
    };

    for step in 0..300 {
        ctl.compute(&mut reg, step, 10_000, None).unwrap();
        let dt = reg.by_name(names::DT).unwrap();
        for c in 0..mesh.n_cells {
            let v = dt.val()[c];
            assert!(
                (config.time_step.dtmin..=config.time_step.dtmax).contains(&v),
                "步 {step} 单元 {c}: dt = {v}"
            );
        }
    }
}

#[test]
fn adaptive_uniform_zero_spread() {
    let mesh = CartesianBuilder::new(8, 8, 1).build();
    // 非均匀速度场 → 局部约束不同，统一模式仍须单值
    let mut reg = setup(&mesh, 0.0, 1e-4, 1e-4);
    {
        let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
        let vel = reg.field_mut(vel_id);
        for c in 0..mesh.n_cells {
            vel.val_mut()[c * 3] = 0.1 + c as f64 * 0.05;
        }
    }

    let mut config = SolverConfig::default();
    config.time_step_mode = TimeStepMode::Adaptive;
    config.time_step.coumax = 0.8;

    let backend = CpuBackend::new();
    let comm = SingleRank;
    let ctl = LocalTimeStep {
        mesh: &mesh,
        config: &config,
        backend: &backend,
        comm: &comm,
        coupling: &comm,
    };

    for step in 0..50 {
        let report = ctl.compute(&mut reg, step, 1000, None).unwrap();
        let dt = reg.by_name(names::DT).unwrap();
        let first = dt.val()[0];
        let spread = dt.val()[..mesh.n_cells]
            .iter()
            .map(|v| (v - first).abs())
            .fold(0.0_f64, f64::max);
        assert_eq!(spread, 0.0, "步 {step}: 统一模式出现离散");
        assert_eq!(report.dt_uniform, Some(first));
    }
}

#[test]
fn courant_bounded_by_coumax_after_convergence() {
    let mesh = CartesianBuilder::new(10, 2, 1).build();
    let mut reg = setup(&mesh, 2.0, 0.0, 1e-6);

    let mut config = SolverConfig::default();
    config.time_step_mode = TimeStepMode::Local;
    config.time_step.coumax = 0.6;
    config.time_step.foumax = -1.0; // 关闭 Fourier 限制
    config.time_step.varrdt = 0.1;
    config.time_step.dtmax = 10.0;
    {
        // 纯对流：关闭扩散
        let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
        reg.field_mut(vel_id).eqp.idiff = false;
    }

    let backend = CpuBackend::new();
    let comm = SingleRank;
    let ctl = LocalTimeStep {
        mesh: &mesh,
        config: &config,
        backend: &backend,
        comm: &comm,
        coupling: &comm,
    };

    let mut last_courant = 0.0;
    for step in 0..400 {
        let report = ctl.compute(&mut reg, step, 10_000, None).unwrap();
        if let Some((cmax, _)) = report.courant_max {
            last_courant = cmax;
        }
    }

    // 收敛后 Courant ≤ coumax·(1+varrdt)
    let limit = config.time_step.coumax * (1.0 + config.time_step.varrdt);
    assert!(
        last_courant <= limit + 1e-9,
        "Courant {last_courant} 超过 {limit}"
    );
    assert!(last_courant > 0.0);
}

#[test]
fn buoyancy_scale_clips_and_counts() {
    let mesh = CartesianBuilder::new(4, 4, 4).build();
    let mut reg = setup(&mesh, 0.0, 1e-4, 1.0);
    {
        // 强分层：密度沿重力方向（−z）增大 → ∇ρ·g/ρ > 0
        let rho_id = reg.id_by_name(names::DENSITY).unwrap();
        let rho = reg.field_mut(rho_id);
        for c in 0..mesh.n_cells_ext {
            rho.val_mut()[c] = 1.0 + 1000.0 * (1.0 - mesh.cell_cen[c].z);
        }
    }

    let mut config = SolverConfig::default();
    config.time_step_mode = TimeStepMode::Local;
    config.time_step.clip_by_density_scale = true;
    config.time_step.varrdt = 1e6;
    config.time_step.dtmax = 1e3;

    let backend = CpuBackend::new();
    let comm = SingleRank;
    let ctl = LocalTimeStep {
        mesh: &mesh,
        config: &config,
        backend: &backend,
        comm: &comm,
        coupling: &comm,
    };

    let report = ctl.compute(&mut reg, 1, 100, None).unwrap();
    // 内部分层单元被浮力尺度裁剪
    assert!(report.n_clip_buoyancy > 0, "浮力裁剪未发生");
}

#[test]
fn constant_mode_leaves_dt_untouched() {
    let mesh = CartesianBuilder::new(4, 2, 1).build();
    let mut reg = setup(&mesh, 3.0, 1e-3, 0.123);

    let config = SolverConfig::default(); // Constant
    let backend = CpuBackend::new();
    let comm = SingleRank;
    let ctl = LocalTimeStep {
        mesh: &mesh,
        config: &config,
        backend: &backend,
        comm: &comm,
        coupling: &comm,
    };

    let report = ctl.compute(&mut reg, 1, 100, None).unwrap();
    let dt = reg.by_name(names::DT).unwrap();
    for c in 0..mesh.n_cells {
        assert_eq!(dt.val()[c], 0.123);
    }
    // 诊断仍然产出
    assert!(report.courant_max.is_some());
}
