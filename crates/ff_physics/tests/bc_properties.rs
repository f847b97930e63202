// crates/ff_physics/tests/bc_properties.rs
//!
//! 边界系数的可测性质
//!
//! 对每个面、每个变量验证：码集合合法、系数良定义、
//! Dirichlet / Neumann 的代数契约、对称幂等、转子旋转一致性。

use ff_config::{SolverConfig, TurbomachineryModel};
use ff_field::{registry::names, Field, FieldRegistry};
use ff_foundation::SetupErrorBarrier;
use ff_mesh::{CartesianBuilder, Mesh};
use ff_physics::boundary::coeffs;
use ff_physics::boundary::models::{
    HookPhase, ModelBcContext, PhysicalModelBcHook, Rotation, RotorStatorBcHook,
    TurbomachineryContext,
};
use ff_physics::boundary::translate::{translate_boundary_conditions, TranslateContext};
use ff_physics::thermal::{ThermalConversions, WallThermalBookkeeping};
use ff_physics::types::{BcCode, BoundaryFaceType, BoundaryState, TurbulenceConstants};
use glam::DVec3;

const TOL: f64 = 1e-12;

fn base_registry(mesh: &Mesh) -> FieldRegistry {
    let mut reg = FieldRegistry::new();
    let n = mesh.n_cells_ext;
    let n_b = mesh.n_b_faces();

    let mut vel = Field::new(names::VELOCITY, 3, n);
    vel.allocate_bc(n_b);
    reg.add(vel).unwrap();

    let mut p = Field::new(names::PRESSURE, 1, n);
    p.allocate_bc(n_b);
    reg.add(p).unwrap();

    for (nm, v) in [
        (names::MOLECULAR_VISCOSITY, 1e-3),
        (names::TURBULENT_VISCOSITY, 0.0),
        (names::DENSITY, 1.0),
        (names::DT, 0.01),
    ] {
        let mut f = Field::new(nm, 1, n);
        f.val_mut().fill(v);
        reg.add(f).unwrap();
    }
    reg
}

fn run_translate(
    mesh: &Mesh,
    config: &SolverConfig,
    reg: &mut FieldRegistry,
    state: &mut BoundaryState,
) {
    let conversions = ThermalConversions::new();
    let ctx = TranslateContext {
        mesh,
        config,
        constants: TurbulenceConstants::default(),
        conversions: &conversions,
        turbomachinery: None,
    };
    let mut book = WallThermalBookkeeping::new(mesh.n_b_faces());
    let mut barrier = SetupErrorBarrier::new();
    translate_boundary_conditions(&ctx, reg, state, &mut book, &mut barrier).unwrap();
}

// ============================================================
// 原语代数契约
// ============================================================

#[test]
fn dirichlet_reproduces_imposed_value_at_cell() {
    // icodcl = 1：φ_cell = pimp 时 a + b·φ_cell = pimp（任意 hext）
    for hext in [None, Some(0.5), Some(3.0), Some(1e8)] {
        let c = coeffs::dirichlet_scalar(2.75, 4.0, hext);
        assert!(
            (c.a + c.b * 2.75 - 2.75).abs() < TOL,
            "hext = {:?}",
            hext
        );
    }
}

#[test]
fn neumann_flux_independent_of_cell_value() {
    // icodcl = 3：af + bf·φ_cell = qimp 对任意 φ_cell（bf = 0）
    let c = coeffs::neumann_scalar(-1.25, 7.0);
    for phi in [-100.0, 0.0, 3.5, 1e6] {
        assert!((c.af + c.bf * phi - (-1.25)).abs() < TOL);
    }
}

#[test]
fn generalized_symmetry_bitwise_idempotent() {
    let n = DVec3::new(0.48, 0.6, 0.64).normalize();
    let hintt = [3.0, 2.0, 1.5, 0.2, -0.1, 0.05];
    let p = DVec3::new(1.0, 0.0, -0.5);
    let q = DVec3::new(0.0, 0.3, 0.0);

    let c1 = coeffs::generalized_sym_vector_aniso(p, q, &hintt, n);
    let c2 = coeffs::generalized_sym_vector_aniso(p, q, &hintt, n);

    assert!(c1.a.to_array() == c2.a.to_array());
    assert!(c1.b.to_cols_array() == c2.b.to_cols_array());
    assert!(c1.af.to_array() == c2.af.to_array());
    assert!(c1.bf.to_cols_array() == c2.bf.to_cols_array());
}

// ============================================================
// 翻译后不变量
// ============================================================

#[test]
fn every_face_well_defined_after_translation() {
    let mesh = CartesianBuilder::new(4, 4, 2).build();
    let mut reg = base_registry(&mesh);
    let mut state = BoundaryState::new(mesh.n_b_faces());

    // 全域壁面，一个入口配压力 Neumann
    state.bc_type.fill(BoundaryFaceType::SmoothWall);
    state.bc_type[0] = BoundaryFaceType::Inlet;
    {
        let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
        let bc = reg.field_mut(vel_id).bc_mut().unwrap();
        bc.icodcl[0] = BcCode::Dirichlet.as_code();
        let s = bc.slot(0, 0);
        bc.rcodcl1[s] = Some(0.8);
    }

    let config = SolverConfig::default();
    run_translate(&mesh, &config, &mut reg, &mut state);

    for name in [names::VELOCITY, names::PRESSURE] {
        let field = reg.by_name(name).unwrap();
        let bc = field.bc().unwrap();
        for f_id in 0..mesh.n_b_faces() {
            let code = bc.icodcl[f_id];
            assert!(BcCode::from_code(code).is_some(), "{name} 面 {f_id} 码 {code}");
            assert!(
                bc.find_non_finite(f_id).is_none(),
                "{name} 面 {f_id} 系数非有限"
            );
        }
    }
}

#[test]
fn symmetry_translation_projects_normal_only() {
    let mesh = CartesianBuilder::new(2, 2, 2).build();
    let mut reg = base_registry(&mesh);
    let mut state = BoundaryState::new(mesh.n_b_faces());
    state.bc_type.fill(BoundaryFaceType::Symmetry);

    let config = SolverConfig::default();
    run_translate(&mesh, &config, &mut reg, &mut state);

    let vel = reg.by_name(names::VELOCITY).unwrap();
    let bc = vel.bc().unwrap();
    for f_id in 0..mesh.n_b_faces() {
        let n = mesh.b_face_u_normal[f_id];
        // 切向向量保持：取两个与 n 正交的方向
        let t1 = n.any_orthonormal_vector();
        let t2 = n.cross(t1);
        for t in [t1, t2] {
            let mut bt = DVec3::ZERO;
            for i in 0..3 {
                for j in 0..3 {
                    bt[i] += bc.b[bc.mat_slot(f_id, i, j)] * t[j];
                }
            }
            assert!((bt - t).length() < TOL, "面 {f_id}: 切向被改变");
        }
        // 法向投影为零
        let mut bn = DVec3::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                bn[i] += bc.b[bc.mat_slot(f_id, i, j)] * n[j];
            }
        }
        assert!(bn.length() < TOL, "面 {f_id}: 法向未被投影");
        // 质量通量修正标志
        assert_eq!(state.isympa[f_id], 0);
    }
}

// ============================================================
// 转子旋转一致性
// ============================================================

#[test]
fn rotor_wall_velocity_matches_rigid_rotation() {
    let mesh = CartesianBuilder::new(3, 3, 1).with_extent(1.0, 1.0, 0.1).build();
    let mut reg = base_registry(&mesh);
    let mut state = BoundaryState::new(mesh.n_b_faces());
    state.bc_type.fill(BoundaryFaceType::SmoothWall);

    let mut config = SolverConfig::default();
    config.models.turbomachinery = TurbomachineryModel::Frozen;

    let turbo = TurbomachineryContext {
        model: TurbomachineryModel::Frozen,
        cell_rotor_num: vec![1; mesh.n_cells],
        rotations: vec![Rotation {
            origin: DVec3::new(0.5, 0.5, 0.0),
            axis: DVec3::Z,
            omega: std::f64::consts::TAU,
        }],
    };

    // 钩子传播壁速度
    {
        let hook = RotorStatorBcHook;
        let mut ctx = ModelBcContext {
            mesh: &mesh,
            state: &mut state,
            registry: &mut reg,
            config: &config,
            turbomachinery: Some(&turbo),
        };
        hook.configure_bcs(HookPhase::Iteration, &mut ctx).unwrap();
    }

    // 未被用户覆盖的面：壁速度 = ω×r
    {
        let vel = reg.by_name(names::VELOCITY).unwrap();
        let bc = vel.bc().unwrap();
        for f_id in 0..mesh.n_b_faces() {
            let vr = turbo.rotations[0].linear_velocity_at(mesh.b_face_cog[f_id]);
            for comp in 0..3 {
                let got = bc.rcodcl1[bc.slot(f_id, comp)].unwrap();
                assert!((got - vr[comp]).abs() < TOL, "面 {f_id} 分量 {comp}");
            }
        }
    }

    // 翻译后：面值在 φ_cell = v_wall 时复原 v_wall，
    // 即 (v_face − v_wall)·n = 0
    run_translate(&mesh, &config, &mut reg, &mut state);
    let vel = reg.by_name(names::VELOCITY).unwrap();
    let bc = vel.bc().unwrap();
    for f_id in 0..mesh.n_b_faces() {
        let n = mesh.b_face_u_normal[f_id];
        let vr = turbo.rotations[0].linear_velocity_at(mesh.b_face_cog[f_id]);
        let mut v_face = DVec3::ZERO;
        for i in 0..3 {
            v_face[i] = bc.a[bc.slot(f_id, i)];
            for j in 0..3 {
                v_face[i] += bc.b[bc.mat_slot(f_id, i, j)] * vr[j];
            }
        }
        assert!(
            ((v_face - vr).dot(n)).abs() < 1e-10,
            "面 {f_id}: 法向相对速度非零"
        );
    }
}
