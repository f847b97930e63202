// crates/ff_physics/src/pipeline.rs

//! 外层迭代的边界条件流水线
//!
//! 每个外层非线性迭代调用一次 [`run_outer_iteration`]：
//!
//! 重置 → 收集 → 分类 → 模型补充 → （I′ 重构 → 壁面/对称闭合 →
//! 翻译，见 [`crate::boundary::translate`]）→ 后处理
//!
//! 每个阶段全局完成后才进入下一阶段（逐阶段一次
//! [`ff_runtime::Backend::wait`]）。迭代之间无需额外排序：
//! 重置阶段使面值缓存失效，缓存对陈旧数据安全。

use ff_field::FieldRegistry;
use ff_foundation::{FfResult, SetupErrorBarrier};
use ff_runtime::Backend;

use crate::boundary::classifier::{self, ClassifierInputs, ClassifyPhase};
use crate::boundary::models::{HookPhase, ModelBcContext, ModelBcDispatch, TurbomachineryContext};
use crate::boundary::translate::{self, TranslateContext, TranslateOutcome};
use crate::coupling::InternalCoupling;
use crate::thermal::WallThermalBookkeeping;
use crate::types::BoundaryState;

/// 用户边界条件扩展点
///
/// 对应固定名称的用户函数；未提供时为空操作。
pub type UserBcFn<'a> = &'a (dyn Fn(&mut FieldRegistry) + Send + Sync);

/// 流水线输入
pub struct PipelineInputs<'a> {
    /// 翻译上下文（网格、配置、常数、转换）
    pub ctx: TranslateContext<'a>,
    /// 调度上下文
    pub backend: &'a dyn Backend,
    /// 用户边界条件函数
    pub user_boundary_conditions: Option<UserBcFn<'a>>,
    /// ALE 用户边界条件函数
    pub user_boundary_conditions_ale: Option<UserBcFn<'a>>,
    /// 内部耦合（激活时）
    pub internal_coupling: Option<&'a InternalCoupling>,
    /// 模型钩子分派器
    pub models: &'a ModelBcDispatch,
    /// 转子/定子上下文
    pub turbomachinery: Option<&'a TurbomachineryContext>,
    /// 是否为首次（init）调用
    pub init: bool,
}

/// 执行一个外层迭代的边界条件流水线
pub fn run_outer_iteration(
    inputs: &PipelineInputs<'_>,
    registry: &mut FieldRegistry,
    state: &mut BoundaryState,
    thermal_book: &mut WallThermalBookkeeping,
    barrier: &mut SetupErrorBarrier,
) -> FfResult<TranslateOutcome> {
    let mesh = inputs.ctx.mesh;

    // 阶段 1：重置
    registry.reset_all_bc();
    thermal_book.reset();
    state.isympa.fill(1);
    inputs.backend.wait();

    // 阶段 2：收集（界面 / 用户函数 / 耦合）
    if let Some(user_bc) = inputs.user_boundary_conditions {
        user_bc(registry);
    }
    if let Some(user_ale) = inputs.user_boundary_conditions_ale {
        user_ale(registry);
    }
    inputs.backend.wait();

    // 阶段 3：分类
    let coupled_mask = inputs
        .internal_coupling
        .map(|c| c.coupled_mask(mesh.n_b_faces()));
    {
        let vel = registry.by_name(ff_field::registry::names::VELOCITY)?;
        let p = registry.by_name(ff_field::registry::names::PRESSURE)?;
        let mv = registry
            .try_id_by_name(ff_field::registry::names::MESH_VELOCITY)
            .map(|id| registry.field(id));

        let classifier_inputs = ClassifierInputs {
            velocity: vel.bc()?,
            pressure: p.bc()?,
            mesh_velocity: match mv {
                Some(f) => Some(f.bc()?),
                None => None,
            },
            coupled_faces: coupled_mask.as_deref(),
            free_surface_faces: None,
            ale: inputs.ctx.config.models.ale,
        };
        let phase = if inputs.init {
            ClassifyPhase::Init
        } else {
            ClassifyPhase::Iteration
        };
        classifier::classify_boundary_faces(&classifier_inputs, state, barrier, phase);
    }
    inputs.backend.wait();

    // 阶段 4：模型补充
    {
        let mut model_ctx = ModelBcContext {
            mesh,
            state,
            registry,
            config: inputs.ctx.config,
            turbomachinery: inputs.turbomachinery,
        };
        let phase = if inputs.init {
            HookPhase::Init
        } else {
            HookPhase::Iteration
        };
        inputs.models.dispatch(phase, &mut model_ctx)?;
    }
    inputs.backend.wait();

    // 阶段 5-7：I′ 重构、壁面/对称闭合、逐变量翻译
    let outcome =
        translate::translate_boundary_conditions(&inputs.ctx, registry, state, thermal_book, barrier)?;
    inputs.backend.wait();

    // 阶段 8：后处理 — 内部耦合面的 Robin 覆盖
    if let Some(coupling) = inputs.internal_coupling {
        let names = ff_field::registry::names::TEMPERATURE;
        if let Some(t_id) = registry.try_id_by_name(names) {
            let diffusivity: Vec<f64> = registry
                .by_name(ff_field::registry::names::MOLECULAR_VISCOSITY)?
                .val()
                .to_vec();
            let h = coupling.exchange_coefficients(mesh, &diffusivity);
            let mut t_field = registry.take(t_id);
            coupling.apply_robin_override(mesh, &mut t_field, &h, &diffusivity)?;
            registry.put_back(t_id, t_field);
        }
    }
    inputs.backend.wait();

    // init 调用即初始化末尾：延迟屏障在此检查
    if inputs.init {
        barrier.check()?;
    }

    Ok(outcome)
}
