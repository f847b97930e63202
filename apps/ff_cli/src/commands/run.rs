// apps/ff_cli/src/commands/run.rs

//! 运行计算命令
//!
//! 组装字段注册表、模型钩子与时间步控制器，按步推进：
//! 每步先运行边界条件流水线（外层迭代一次），再计算时间步。
//! 网格生产环境由前处理器导入；这里内置一个通道算例网格
//! 用于冒烟运行与调试。

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use ff_config::SolverConfig;
use ff_field::{registry::names, Field, FieldRegistry};
use ff_foundation::SetupErrorBarrier;
use ff_mesh::{CartesianBuilder, Mesh};
use ff_physics::boundary::models::ModelBcDispatch;
use ff_physics::boundary::translate::TranslateContext;
use ff_physics::engine::timestep::LocalTimeStep;
use ff_physics::pipeline::{run_outer_iteration, PipelineInputs};
use ff_physics::thermal::{ThermalConversions, WallThermalBookkeeping};
use ff_physics::types::{BcCode, BoundaryState, TurbulenceConstants};
use ff_runtime::{CpuBackend, SingleRank};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 设置文件路径（JSON）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 步数（覆盖设置文件）
    #[arg(short = 'n', long)]
    pub nt_max: Option<usize>,

    /// 通道算例网格分辨率 (nx ny nz)
    #[arg(long, num_args = 3, default_values = ["32", "16", "1"])]
    pub mesh: Vec<usize>,

    /// 入口速度 [m/s]
    #[arg(long, default_value = "1.0")]
    pub inlet_velocity: f64,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== FerroFlow 计算启动 ===");

    let mut config = match &args.config {
        Some(path) => SolverConfig::from_file(path)
            .with_context(|| format!("读入设置文件失败: {}", path.display()))?,
        None => SolverConfig::default(),
    };
    if let Some(nt) = args.nt_max {
        config.time_step.nt_max = nt;
    }

    let mesh = CartesianBuilder::new(args.mesh[0], args.mesh[1], args.mesh.get(2).copied().unwrap_or(1))
        .with_extent(4.0, 2.0, 0.2)
        .build();
    mesh.validate().context("网格自检失败")?;
    info!(
        "网格: {} 单元, {} 内部面, {} 边界面",
        mesh.n_cells,
        mesh.n_i_faces(),
        mesh.n_b_faces()
    );

    let mut registry = build_registry(&mesh, &config);
    let models = ModelBcDispatch::from_config(&config);
    if !models.hook_names().is_empty() {
        info!("激活模型钩子: {:?}", models.hook_names());
    }

    let backend = CpuBackend::new();
    let comm = SingleRank;
    let conversions = ThermalConversions::new();
    let mut state = BoundaryState::new(mesh.n_b_faces());
    let mut thermal_book = WallThermalBookkeeping::new(mesh.n_b_faces());
    let mut barrier = SetupErrorBarrier::new();

    let inlet_u = args.inlet_velocity;
    let mesh_ref = &mesh;
    let user_bc = move |reg: &mut FieldRegistry| channel_boundary_conditions(reg, mesh_ref, inlet_u);

    let controller = LocalTimeStep {
        mesh: &mesh,
        config: &config,
        backend: &backend,
        comm: &comm,
        coupling: &comm,
    };

    let start = Instant::now();
    let mut nt_max = config.time_step.nt_max;
    let mut step = 0usize;

    while step < nt_max {
        let inputs = PipelineInputs {
            ctx: TranslateContext {
                mesh: &mesh,
                config: &config,
                constants: TurbulenceConstants::default(),
                conversions: &conversions,
                turbomachinery: None,
            },
            backend: &backend,
            user_boundary_conditions: Some(&user_bc),
            user_boundary_conditions_ale: None,
            internal_coupling: None,
            models: &models,
            turbomachinery: None,
            init: step == 0,
        };

        let outcome = run_outer_iteration(
            &inputs,
            &mut registry,
            &mut state,
            &mut thermal_book,
            &mut barrier,
        )?;

        let report = controller.compute(&mut registry, step, nt_max, None)?;
        if report.nt_max < nt_max {
            warn!("耦合对端要求在第 {} 步后结束", report.nt_max);
            nt_max = report.nt_max;
        }

        if step % 10 == 0 {
            let dt = registry.by_name(names::DT)?.val()[0];
            info!(
                "步 {step}: dt = {dt:.4e}, 壁面 {} 面, 对称 {} 面, 变量 {}",
                outcome.wall_faces, outcome.symmetry_faces, outcome.variables
            );
            if let Some((cmax, _)) = report.courant_max {
                info!("         Courant 最大 {cmax:.3}");
            }
        }

        registry.rotate_all_layers();
        step += 1;
    }

    info!(
        "=== 完成 {} 步，耗时 {:.2}s ===",
        step,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// 冒烟算例的字段集
fn build_registry(mesh: &Mesh, config: &SolverConfig) -> FieldRegistry {
    let mut reg = FieldRegistry::new();
    let n = mesh.n_cells_ext;
    let n_b = mesh.n_b_faces();

    let mut vel = Field::with_layers(names::VELOCITY, 3, n, 2);
    vel.allocate_bc(n_b);
    reg.add(vel).unwrap();

    let mut p = Field::new(names::PRESSURE, 1, n);
    p.eqp = ff_field::EquationParams::diffusion_only();
    p.allocate_bc(n_b);
    reg.add(p).unwrap();

    for (nm, v) in [
        (names::MOLECULAR_VISCOSITY, config.mu0),
        (names::TURBULENT_VISCOSITY, 0.0),
        (names::DT, config.time_step.dtref),
    ] {
        let mut f = Field::new(nm, 1, n);
        f.val_mut().fill(v);
        reg.add(f).unwrap();
    }

    // 密度保留两个历史层（重启段要求）
    let mut rho = Field::with_layers(names::DENSITY, 1, n, 3);
    rho.val_mut().fill(config.rho0);
    reg.add(rho).unwrap();

    if config.turbulence != ff_config::TurbulenceModel::Laminar {
        for nm in [names::K, names::EPSILON] {
            let mut f = Field::new(nm, 1, n);
            f.val_mut().fill(1e-4);
            f.allocate_bc(n_b);
            reg.add(f).unwrap();
        }
    }

    reg
}

/// 通道算例：x- 入口，x+ 出口，y 壁面，z 对称
fn channel_boundary_conditions(reg: &mut FieldRegistry, mesh: &Mesh, inlet_u: f64) {
    let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
    let p_id = reg.id_by_name(names::PRESSURE).unwrap();

    for f_id in 0..mesh.n_b_faces() {
        let n = mesh.b_face_u_normal[f_id];
        let bc = reg.field_mut(vel_id).bc_mut().unwrap();
        if bc.icodcl[f_id] != 0 {
            continue;
        }

        if n.x < -0.5 {
            // 入口
            bc.icodcl[f_id] = BcCode::Dirichlet.as_code();
            let s = bc.slot(f_id, 0);
            bc.rcodcl1[s] = Some(inlet_u);
            let pbc = reg.field_mut(p_id).bc_mut().unwrap();
            pbc.icodcl[f_id] = BcCode::Neumann.as_code();
        } else if n.x > 0.5 {
            // 出口
            bc.icodcl[f_id] = BcCode::Neumann.as_code();
            let pbc = reg.field_mut(p_id).bc_mut().unwrap();
            pbc.icodcl[f_id] = BcCode::Dirichlet.as_code();
            pbc.rcodcl1[f_id] = Some(0.0);
        } else if n.y.abs() > 0.5 {
            bc.icodcl[f_id] = BcCode::SmoothWall.as_code();
        } else {
            bc.icodcl[f_id] = BcCode::Symmetry.as_code();
        }
    }
}
