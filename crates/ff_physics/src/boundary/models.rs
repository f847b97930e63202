// crates/ff_physics/src/boundary/models.rs

//! 物理模型边界补充钩子
//!
//! 主翻译循环前按固定顺序调用激活模型的钩子：
//!
//! 大气 → 冷却塔 → 燃烧（四选一）→ 煤粉 → 可压缩重置
//! → ALE 类型刷新 → 辐射传热 → 转子/定子壁面速度传播
//!
//! 顺序是契约：大气模块依赖冷却塔气溶胶数据已写入；辐射传热
//! 依赖壁面类型已固定。`init` 调用只运行定义新类型码的子集
//! （ALE 刷新与可压缩重置），其余钩子只在逐迭代阶段重算数值。

use glam::DVec3;

use ff_config::{SolverConfig, TurbomachineryModel};
use ff_field::{registry::names, BcCoeffs, FieldRegistry};
use ff_foundation::tolerance::INFINITE_R;
use ff_foundation::FfResult;
use ff_mesh::Mesh;

use crate::types::{BcCode, BoundaryFaceType, BoundaryState};

// ============================================================
// 旋转描述
// ============================================================

/// 刚体旋转
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    /// 轴上一点
    pub origin: DVec3,
    /// 旋转轴（无需单位化）
    pub axis: DVec3,
    /// 角速度 [rad/s]
    pub omega: f64,
}

impl Rotation {
    /// 角速度向量
    #[inline]
    pub fn angular_velocity(&self) -> DVec3 {
        self.axis.normalize() * self.omega
    }

    /// 某点处的刚体线速度 ω×r
    pub fn linear_velocity_at(&self, x: DVec3) -> DVec3 {
        self.angular_velocity().cross(x - self.origin)
    }
}

/// 转子/定子上下文
#[derive(Debug, Clone)]
pub struct TurbomachineryContext {
    /// 模式
    pub model: TurbomachineryModel,
    /// 逐单元转子编号（0 = 定子）
    pub cell_rotor_num: Vec<usize>,
    /// 转子旋转表（编号从 1 起）
    pub rotations: Vec<Rotation>,
}

impl TurbomachineryContext {
    /// 某单元的旋转（定子单元为 None）
    pub fn rotation_of_cell(&self, c_id: usize) -> Option<&Rotation> {
        match self.cell_rotor_num.get(c_id) {
            Some(&r) if r > 0 => self.rotations.get(r - 1),
            _ => None,
        }
    }
}

// ============================================================
// 钩子接口与分派
// ============================================================

/// 钩子调用阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// 初始化（定义类型码）
    Init,
    /// 逐迭代（重算数值）
    Iteration,
}

/// 模型钩子上下文
pub struct ModelBcContext<'a> {
    /// 网格只读视图
    pub mesh: &'a Mesh,
    /// 逐面边界状态
    pub state: &'a mut BoundaryState,
    /// 字段注册表
    pub registry: &'a mut FieldRegistry,
    /// 求解器配置
    pub config: &'a SolverConfig,
    /// 转子/定子上下文（激活时）
    pub turbomachinery: Option<&'a TurbomachineryContext>,
}

/// 物理模型边界补充入口
pub trait PhysicalModelBcHook: Send + Sync {
    /// 钩子名
    fn name(&self) -> &'static str;

    /// init 阶段是否运行（仅定义新类型码的钩子）
    fn runs_on_init(&self) -> bool {
        false
    }

    /// 调整面类型与 rcodcl 数组
    fn configure_bcs(&self, phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()>;
}

/// 固定顺序的模型钩子分派器
pub struct ModelBcDispatch {
    hooks: Vec<Box<dyn PhysicalModelBcHook>>,
}

impl ModelBcDispatch {
    /// 按配置装配激活的钩子（顺序固定，见模块文档）
    pub fn from_config(config: &SolverConfig) -> Self {
        let mut hooks: Vec<Box<dyn PhysicalModelBcHook>> = Vec::new();

        if config.models.atmospheric {
            hooks.push(Box::new(AtmosphericBcHook::default()));
        }
        if config.models.cooling_towers {
            hooks.push(Box::new(CoolingTowersBcHook));
        }
        if let Some(model) = config.models.combustion {
            hooks.push(Box::new(CombustionBcHook { model }));
        }
        if config.models.pulverised_coal {
            hooks.push(Box::new(PulverisedCoalBcHook));
        }
        if config.models.compressible {
            hooks.push(Box::new(CompressibleResetHook));
        }
        if config.models.ale != ff_config::AleMode::None {
            hooks.push(Box::new(AleTypeRefreshHook));
        }
        if config.models.radiative_transfer {
            hooks.push(Box::new(RadiativeTransferBcHook));
        }
        if config.models.turbomachinery != TurbomachineryModel::None {
            hooks.push(Box::new(RotorStatorBcHook));
        }

        Self { hooks }
    }

    /// 激活的钩子名（按调用顺序）
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// 按阶段分派
    pub fn dispatch(&self, phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        for hook in &self.hooks {
            if phase == HookPhase::Init && !hook.runs_on_init() {
                continue;
            }
            log::debug!("模型边界钩子: {}", hook.name());
            hook.configure_bcs(phase, ctx)?;
        }
        Ok(())
    }
}

// ============================================================
// 大气
// ============================================================

/// 大气流动：入口面未设置的速度与湍流量按中性对数廓线补齐
#[derive(Debug, Clone)]
pub struct AtmosphericBcHook {
    /// 参考高度风速 [m/s]
    pub uref: f64,
    /// 参考高度 [m]
    pub zref: f64,
    /// 地表粗糙度 [m]
    pub z0: f64,
    /// 风向（水平单位向量）
    pub direction: DVec3,
}

impl Default for AtmosphericBcHook {
    fn default() -> Self {
        Self {
            uref: 5.0,
            zref: 10.0,
            z0: 0.1,
            direction: DVec3::X,
        }
    }
}

impl PhysicalModelBcHook for AtmosphericBcHook {
    fn name(&self) -> &'static str {
        "atmospheric"
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        let kappa = 0.42;
        let ustar = self.uref * kappa / ((self.zref + self.z0) / self.z0).ln();

        let vel_id = ctx.registry.id_by_name(names::VELOCITY)?;
        let mut vel = ctx.registry.take(vel_id);
        {
            let bc = vel.bc_mut()?;
            for f_id in 0..ctx.mesh.n_b_faces() {
                if ctx.state.bc_type[f_id] != BoundaryFaceType::Inlet
                    || !bc.rcodcl1_all_unset(f_id)
                {
                    continue;
                }
                let z = ctx.mesh.b_face_cog[f_id].z.max(0.0);
                let u = ustar / kappa * ((z + self.z0) / self.z0).ln();
                let v = self.direction.normalize() * u;
                bc.icodcl[f_id] = BcCode::Dirichlet.as_code();
                for comp in 0..3 {
                    let s = bc.slot(f_id, comp);
                    bc.rcodcl1[s] = Some(v[comp]);
                }
            }
        }
        ctx.registry.put_back(vel_id, vel);

        // 湍流量廓线：k = u*²/√Cμ，ε = u*³/(κ(z+z0))
        for (name, wants) in [(names::K, true), (names::EPSILON, true)] {
            if !wants {
                continue;
            }
            let Some(id) = ctx.registry.try_id_by_name(name) else {
                continue;
            };
            let mut field = ctx.registry.take(id);
            if let Ok(bc) = field.bc_mut() {
                for f_id in 0..ctx.mesh.n_b_faces() {
                    if ctx.state.bc_type[f_id] != BoundaryFaceType::Inlet
                        || bc.icodcl[f_id] != 0
                    {
                        continue;
                    }
                    let z = ctx.mesh.b_face_cog[f_id].z.max(0.0);
                    let value = if name == names::K {
                        ustar * ustar / 0.09_f64.sqrt()
                    } else {
                        ustar.powi(3) / (kappa * (z + self.z0))
                    };
                    bc.icodcl[f_id] = BcCode::Dirichlet.as_code();
                    bc.rcodcl1[f_id] = Some(value);
                }
            }
            ctx.registry.put_back(id, field);
        }
        Ok(())
    }
}

// ============================================================
// 冷却塔 / 燃烧 / 煤粉
// ============================================================

/// 冷却塔：入口湿度标量缺省补饱和值
pub struct CoolingTowersBcHook;

impl PhysicalModelBcHook for CoolingTowersBcHook {
    fn name(&self) -> &'static str {
        "cooling_towers"
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        set_scalar_inlet_default(ctx, "humidity", 1.0)
    }
}

/// 气相燃烧：入口混合分数 / 进度变量缺省
pub struct CombustionBcHook {
    /// 激活的燃烧模型
    pub model: ff_config::CombustionModel,
}

impl PhysicalModelBcHook for CombustionBcHook {
    fn name(&self) -> &'static str {
        "combustion"
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        set_scalar_inlet_default(ctx, "mixture_fraction", 0.0)?;
        set_scalar_inlet_default(ctx, "progress_variable", 0.0)
    }
}

/// 煤粉燃烧：入口煤相标量缺省
pub struct PulverisedCoalBcHook;

impl PhysicalModelBcHook for PulverisedCoalBcHook {
    fn name(&self) -> &'static str {
        "pulverised_coal"
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        set_scalar_inlet_default(ctx, "coal_mass_fraction", 0.0)
    }
}

/// 入口面上某标量缺省 Dirichlet（已设置的面不覆盖）
fn set_scalar_inlet_default(
    ctx: &mut ModelBcContext<'_>,
    field_name: &str,
    value: f64,
) -> FfResult<()> {
    let Some(id) = ctx.registry.try_id_by_name(field_name) else {
        return Ok(());
    };
    let mut field = ctx.registry.take(id);
    if let Ok(bc) = field.bc_mut() {
        for f_id in 0..ctx.mesh.n_b_faces() {
            if matches!(
                ctx.state.bc_type[f_id],
                BoundaryFaceType::Inlet | BoundaryFaceType::ConvectiveInlet
            ) && bc.icodcl[f_id] == 0
            {
                bc.icodcl[f_id] = BcCode::Dirichlet.as_code();
                bc.rcodcl1[f_id] = Some(value);
            }
        }
    }
    ctx.registry.put_back(id, field);
    Ok(())
}

// ============================================================
// 可压缩重置
// ============================================================

/// 可压缩算法：出口压力重置为对流出口码
///
/// 定义新码，init 阶段也运行。
pub struct CompressibleResetHook;

impl PhysicalModelBcHook for CompressibleResetHook {
    fn name(&self) -> &'static str {
        "compressible_reset"
    }

    fn runs_on_init(&self) -> bool {
        true
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        let p_id = ctx.registry.id_by_name(names::PRESSURE)?;
        let mut p = ctx.registry.take(p_id);
        {
            let bc = p.bc_mut()?;
            for f_id in 0..ctx.mesh.n_b_faces() {
                if ctx.state.bc_type[f_id].is_outlet()
                    && bc.icodcl[f_id] == BcCode::Dirichlet.as_code()
                {
                    bc.icodcl[f_id] = BcCode::ConvectiveOutlet.as_code();
                    if bc.rcodcl2[f_id].is_none() {
                        bc.rcodcl2[f_id] = Some(1.0);
                    }
                }
            }
        }
        ctx.registry.put_back(p_id, p);
        Ok(())
    }
}

// ============================================================
// ALE 类型刷新
// ============================================================

/// ALE：按网格速度边界码刷新面类型
///
/// 定义新类型码，init 阶段也运行。
pub struct AleTypeRefreshHook;

impl PhysicalModelBcHook for AleTypeRefreshHook {
    fn name(&self) -> &'static str {
        "ale_type_refresh"
    }

    fn runs_on_init(&self) -> bool {
        true
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        let Some(mv_id) = ctx.registry.try_id_by_name(names::MESH_VELOCITY) else {
            return Ok(());
        };
        let disp_id = ctx.registry.try_id_by_name(names::MESH_DISPLACEMENT);

        let mv = ctx.registry.field(mv_id);
        let mv_bc = mv.bc()?;
        let disp_bc: Option<&BcCoeffs> = match disp_id {
            Some(id) => ctx.registry.field(id).bc.as_ref(),
            None => None,
        };

        for f_id in 0..ctx.mesh.n_b_faces() {
            let new_type = match BcCode::from_code(mv_bc.icodcl[f_id]) {
                Some(BcCode::Dirichlet) => {
                    // 零速度 Dirichlet 视为固定
                    let zero = (0..3).all(|c| {
                        mv_bc.rcodcl1[mv_bc.slot(f_id, c)].unwrap_or(0.0) == 0.0
                    });
                    if zero {
                        BoundaryFaceType::AleFixed
                    } else {
                        BoundaryFaceType::AleImposedVelocity
                    }
                }
                Some(BcCode::Neumann) | Some(BcCode::Symmetry) => BoundaryFaceType::AleSliding,
                _ => {
                    // 网格速度未设置：位移 Dirichlet 时为施加位移
                    match disp_bc {
                        Some(d) if d.icodcl[f_id] == BcCode::Dirichlet.as_code() => {
                            BoundaryFaceType::AleImposedDisplacement
                        }
                        _ => continue,
                    }
                }
            };
            // 只提升非 ALE 的壁面 / 未定义面，物理入出口类型保持
            if matches!(
                ctx.state.bc_type[f_id],
                BoundaryFaceType::Undefined
                    | BoundaryFaceType::SmoothWall
                    | BoundaryFaceType::RoughWall
            ) || ctx.state.bc_type[f_id].is_ale()
            {
                ctx.state.bc_type[f_id] = new_type;
            }
        }
        Ok(())
    }
}

// ============================================================
// 辐射传热
// ============================================================

/// 辐射传热：壁面对流交换系数与通量数组
///
/// 依赖壁面类型已固定（分派顺序保证）。
pub struct RadiativeTransferBcHook;

impl PhysicalModelBcHook for RadiativeTransferBcHook {
    fn name(&self) -> &'static str {
        "radiative_transfer"
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        // 对流交换系数取热闭合的 hbord，通量按壁温差
        let t_wall_id = ctx
            .registry
            .try_id_by_name(names::TEMPERATURE)
            .or_else(|| ctx.registry.try_id_by_name(names::ENTHALPY));

        for f_id in 0..ctx.mesh.n_b_faces() {
            if !ctx.state.bc_type[f_id].is_wall() {
                ctx.state.bhconv[f_id] = 0.0;
                ctx.state.bfconv[f_id] = 0.0;
                continue;
            }
            let h = ctx.state.hbord[f_id];
            ctx.state.bhconv[f_id] = h;

            let t_imposed = t_wall_id
                .and_then(|id| {
                    let field = ctx.registry.field(id);
                    field.bc.as_ref().and_then(|bc| bc.rcodcl1[bc.slot(f_id, 0)])
                })
                .unwrap_or(ctx.state.theipb[f_id]);
            ctx.state.bfconv[f_id] = h * (t_imposed - ctx.state.theipb[f_id]);
        }
        Ok(())
    }
}

// ============================================================
// 转子 / 定子
// ============================================================

/// 转子/定子：壁面与对称面的刚体旋转速度传播
///
/// - 对称面：网格速度整体写入（下游只保留法向分量）
/// - 壁面：三个分量都未被用户设置时整体取 ω×r；任一分量被用户
///   设置时只替换法向分量，保留用户切向滑移
/// - 瞬态模式为几何更新后的预测-修正子步准备 (coftur, hfltur)
///   备份对；冻结模式置哨兵
pub struct RotorStatorBcHook;

impl PhysicalModelBcHook for RotorStatorBcHook {
    fn name(&self) -> &'static str {
        "rotor_stator"
    }

    fn configure_bcs(&self, _phase: HookPhase, ctx: &mut ModelBcContext<'_>) -> FfResult<()> {
        let Some(turbo) = ctx.turbomachinery else {
            return Ok(());
        };

        let vel_id = ctx.registry.id_by_name(names::VELOCITY)?;
        let viscl_id = ctx.registry.id_by_name(names::MOLECULAR_VISCOSITY)?;
        let visct_id = ctx.registry.id_by_name(names::TURBULENT_VISCOSITY)?;
        let second_order = ctx.config.turbulence.is_second_order();

        let mut vel = ctx.registry.take(vel_id);
        {
            let bc = vel.bc_mut()?;

            // 速度传播会覆盖 rcodcl，用户是否干预须先采样
            let user_unset: Vec<bool> = (0..ctx.mesh.n_b_faces())
                .map(|f_id| bc.rcodcl1_all_unset(f_id))
                .collect();

            for f_id in 0..ctx.mesh.n_b_faces() {
                let c_id = ctx.mesh.b_face_cells[f_id];
                let Some(rotation) = turbo.rotation_of_cell(c_id) else {
                    continue;
                };

                // 转子壁面的刚体速度在面形心处取值
                let vr = rotation.linear_velocity_at(ctx.mesh.b_face_cog[f_id]);

                match ctx.state.bc_type[f_id] {
                    BoundaryFaceType::Symmetry => {
                        for comp in 0..3 {
                            let s = bc.slot(f_id, comp);
                            bc.rcodcl1[s] = Some(vr[comp]);
                        }
                    }
                    BoundaryFaceType::SmoothWall | BoundaryFaceType::RoughWall => {
                        if user_unset[f_id] {
                            // 用户未干预：整体取刚体速度
                            for comp in 0..3 {
                                let s = bc.slot(f_id, comp);
                                bc.rcodcl1[s] = Some(vr[comp]);
                            }
                        } else {
                            // 部分覆盖：未设置分量补零后只修正法向分量
                            let n = ctx.mesh.b_face_u_normal[f_id];
                            let mut rc = DVec3::ZERO;
                            for comp in 0..3 {
                                rc[comp] = bc.rcodcl1[bc.slot(f_id, comp)].unwrap_or(0.0);
                            }
                            let rcodsn = (vr - rc).dot(n);
                            for comp in 0..3 {
                                let s = bc.slot(f_id, comp);
                                bc.rcodcl1[s] = Some(rc[comp] + rcodsn * n[comp]);
                            }
                        }
                    }
                    _ => {}
                }
            }

            // 预测-修正子步之间的壁面速度更新备份
            let viscl = ctx.registry.field(viscl_id);
            let visct = ctx.registry.field(visct_id);
            for f_id in 0..ctx.mesh.n_b_faces() {
                let c_id = ctx.mesh.b_face_cells[f_id];
                let transient = turbo.model == TurbomachineryModel::Transient;
                let rotor_wall = turbo.rotation_of_cell(c_id).is_some()
                    && ctx.state.bc_type[f_id].is_wall();

                if transient && rotor_wall && user_unset[f_id] {
                    let distbf = ctx.mesh.b_dist[f_id];
                    let hint = if second_order {
                        viscl.val()[c_id] / distbf
                    } else {
                        (viscl.val()[c_id] + visct.val()[c_id]) / distbf
                    };
                    ctx.state.coftur[f_id] = 0.0;
                    ctx.state.hfltur[f_id] = hint;
                } else {
                    // 其余情形（含冻结模式）置未使用哨兵
                    ctx.state.coftur[f_id] = INFINITE_R;
                    ctx.state.hfltur[f_id] = INFINITE_R;
                }
            }
        }
        ctx.registry.put_back(vel_id, vel);
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ff_config::SolverConfig;
    use ff_field::Field;
    use ff_mesh::CartesianBuilder;

    fn base_setup(mesh: &Mesh) -> (FieldRegistry, BoundaryState) {
        let mut reg = FieldRegistry::new();
        let n = mesh.n_cells_ext;
        let n_b = mesh.n_b_faces();

        let mut vel = Field::new(names::VELOCITY, 3, n);
        vel.allocate_bc(n_b);
        reg.add(vel).unwrap();

        let mut p = Field::new(names::PRESSURE, 1, n);
        p.allocate_bc(n_b);
        reg.add(p).unwrap();

        let mut viscl = Field::new(names::MOLECULAR_VISCOSITY, 1, n);
        viscl.val_mut().fill(1e-5);
        reg.add(viscl).unwrap();

        let mut visct = Field::new(names::TURBULENT_VISCOSITY, 1, n);
        visct.val_mut().fill(1e-4);
        reg.add(visct).unwrap();

        (reg, BoundaryState::new(n_b))
    }

    fn turbo_ctx(mesh: &Mesh, model: TurbomachineryModel) -> TurbomachineryContext {
        TurbomachineryContext {
            model,
            cell_rotor_num: vec![1; mesh.n_cells],
            rotations: vec![Rotation {
                origin: DVec3::ZERO,
                axis: DVec3::Z,
                omega: std::f64::consts::TAU,
            }],
        }
    }

    #[test]
    fn test_dispatch_order() {
        let mut config = SolverConfig::default();
        config.models.atmospheric = true;
        config.models.cooling_towers = true;
        config.models.compressible = true;
        config.models.radiative_transfer = true;
        config.models.turbomachinery = TurbomachineryModel::Frozen;

        let dispatch = ModelBcDispatch::from_config(&config);
        assert_eq!(
            dispatch.hook_names(),
            vec![
                "atmospheric",
                "cooling_towers",
                "compressible_reset",
                "radiative_transfer",
                "rotor_stator"
            ]
        );
    }

    #[test]
    fn test_rotor_wall_velocity_full_replacement() {
        let mesh = CartesianBuilder::new(2, 2, 1).build();
        let (mut reg, mut state) = base_setup(&mesh);
        let config = SolverConfig::default();
        let turbo = turbo_ctx(&mesh, TurbomachineryModel::Frozen);

        state.bc_type.fill(BoundaryFaceType::SmoothWall);

        let hook = RotorStatorBcHook;
        let mut ctx = ModelBcContext {
            mesh: &mesh,
            state: &mut state,
            registry: &mut reg,
            config: &config,
            turbomachinery: Some(&turbo),
        };
        hook.configure_bcs(HookPhase::Iteration, &mut ctx).unwrap();

        // 每个面的壁面速度 = ω×r
        let vel = reg.by_name(names::VELOCITY).unwrap();
        let bc = vel.bc().unwrap();
        for f_id in 0..mesh.n_b_faces() {
            let expect = turbo.rotations[0].linear_velocity_at(mesh.b_face_cog[f_id]);
            for comp in 0..3 {
                let got = bc.rcodcl1[bc.slot(f_id, comp)].unwrap();
                assert!((got - expect[comp]).abs() < 1e-12);
            }
        }
        // 冻结模式：备份系数为哨兵
        assert!(state.rotor_wall_coeffs(0).is_none());
    }

    #[test]
    fn test_rotor_wall_partial_override_keeps_tangential() {
        let mesh = CartesianBuilder::new(2, 2, 1).build();
        let (mut reg, mut state) = base_setup(&mesh);
        let config = SolverConfig::default();
        let turbo = turbo_ctx(&mesh, TurbomachineryModel::Frozen);

        state.bc_type.fill(BoundaryFaceType::SmoothWall);

        // 用户在面 0 设置了一个切向分量
        let f_id = 0usize;
        let user_tangential;
        {
            let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
            let vel = reg.field_mut(vel_id);
            let bc = vel.bc_mut().unwrap();
            let n = mesh.b_face_u_normal[f_id];
            // 取一个与法向正交的方向分量
            let comp = if n.x.abs() < 0.5 { 0 } else { 1 };
            user_tangential = (comp, 0.77);
            let s = bc.slot(f_id, comp);
            bc.rcodcl1[s] = Some(0.77);
        }

        let hook = RotorStatorBcHook;
        let mut ctx = ModelBcContext {
            mesh: &mesh,
            state: &mut state,
            registry: &mut reg,
            config: &config,
            turbomachinery: Some(&turbo),
        };
        hook.configure_bcs(HookPhase::Iteration, &mut ctx).unwrap();

        let vel = reg.by_name(names::VELOCITY).unwrap();
        let bc = vel.bc().unwrap();
        let n = mesh.b_face_u_normal[f_id];
        let vr = turbo.rotations[0].linear_velocity_at(mesh.b_face_cog[f_id]);

        let mut rc = DVec3::ZERO;
        for comp in 0..3 {
            rc[comp] = bc.rcodcl1[bc.slot(f_id, comp)].unwrap();
        }
        // 法向分量与刚体速度一致
        assert!((rc.dot(n) - vr.dot(n)).abs() < 1e-12);
        // 用户切向分量保留
        assert!((rc[user_tangential.0] - user_tangential.1).abs() < 1e-12);
    }

    #[test]
    fn test_transient_rotor_backup_coeffs() {
        let mesh = CartesianBuilder::new(2, 2, 1).build();
        let (mut reg, mut state) = base_setup(&mesh);
        let config = SolverConfig::default();
        let turbo = turbo_ctx(&mesh, TurbomachineryModel::Transient);

        // 面 0 为壁面且用户覆盖了速度 → 哨兵；面 1 为壁面未覆盖 → 有效对
        state.bc_type.fill(BoundaryFaceType::SmoothWall);
        {
            let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
            let bc = reg.field_mut(vel_id).bc_mut().unwrap();
            let s = bc.slot(0, 0);
            bc.rcodcl1[s] = Some(1.0);
        }

        let hook = RotorStatorBcHook;
        let mut ctx = ModelBcContext {
            mesh: &mesh,
            state: &mut state,
            registry: &mut reg,
            config: &config,
            turbomachinery: Some(&turbo),
        };
        hook.configure_bcs(HookPhase::Iteration, &mut ctx).unwrap();

        // 注意：钩子按顺序先写速度再填备份，面 0 的 rcodcl 已非全未设置
        assert!(state.rotor_wall_coeffs(0).is_none());
        let (coftur, hfltur) = state.rotor_wall_coeffs(1).unwrap();
        assert_eq!(coftur, 0.0);
        let expect_hint = (1e-5 + 1e-4) / mesh.b_dist[1];
        assert!((hfltur - expect_hint).abs() < 1e-12);
    }

    #[test]
    fn test_compressible_reset_outlet() {
        let mesh = CartesianBuilder::new(2, 1, 1).build();
        let (mut reg, mut state) = base_setup(&mesh);
        let mut config = SolverConfig::default();
        config.models.compressible = true;

        state.bc_type[0] = BoundaryFaceType::Outlet;
        {
            let p_id = reg.id_by_name(names::PRESSURE).unwrap();
            let bc = reg.field_mut(p_id).bc_mut().unwrap();
            bc.icodcl[0] = BcCode::Dirichlet.as_code();
            bc.rcodcl1[0] = Some(101325.0);
        }

        let hook = CompressibleResetHook;
        let mut ctx = ModelBcContext {
            mesh: &mesh,
            state: &mut state,
            registry: &mut reg,
            config: &config,
            turbomachinery: None,
        };
        hook.configure_bcs(HookPhase::Init, &mut ctx).unwrap();

        let p = reg.by_name(names::PRESSURE).unwrap();
        let bc = p.bc().unwrap();
        assert_eq!(bc.icodcl[0], BcCode::ConvectiveOutlet.as_code());
        assert_eq!(bc.rcodcl2[0], Some(1.0));
    }

    #[test]
    fn test_atmospheric_fills_unset_inlets_only() {
        let mesh = CartesianBuilder::new(2, 1, 2).build();
        let (mut reg, mut state) = base_setup(&mesh);
        let config = SolverConfig::default();

        state.bc_type[0] = BoundaryFaceType::Inlet;
        state.bc_type[1] = BoundaryFaceType::Inlet;
        // 面 1 用户已设置
        {
            let vel_id = reg.id_by_name(names::VELOCITY).unwrap();
            let bc = reg.field_mut(vel_id).bc_mut().unwrap();
            let s = bc.slot(1, 0);
            bc.rcodcl1[s] = Some(3.0);
        }

        let hook = AtmosphericBcHook::default();
        let mut ctx = ModelBcContext {
            mesh: &mesh,
            state: &mut state,
            registry: &mut reg,
            config: &config,
            turbomachinery: None,
        };
        hook.configure_bcs(HookPhase::Iteration, &mut ctx).unwrap();

        let vel = reg.by_name(names::VELOCITY).unwrap();
        let bc = vel.bc().unwrap();
        // 面 0 被补齐为 Dirichlet
        assert_eq!(bc.icodcl[0], BcCode::Dirichlet.as_code());
        assert!(bc.rcodcl1[bc.slot(0, 0)].is_some());
        // 面 1 用户值保留
        assert_eq!(bc.rcodcl1[bc.slot(1, 0)], Some(3.0));
    }
}
