// crates/ff_physics/src/boundary/classifier.rs

//! 边界面类型分类器
//!
//! 单遍扫描全部边界面，把用户 / 界面写入的逐变量边界码归并为跨
//! 物理一致的面类型。第二次（非 init）调用附带一致性检查：
//!
//! - 速度含 Dirichlet 分量的面必须有压力 Neumann 或耦合出口配对
//! - 出口面必须指定参考压力面（未指定时自动指定第一个出口面）
//! - 标记 ALE 的面必须携带网格速度边界条件
//!
//! 不一致只记入延迟屏障并继续，错误集中在初始化末尾统一上报。

use ff_config::AleMode;
use ff_field::BcCoeffs;
use ff_foundation::SetupErrorBarrier;

use crate::types::{BcCode, BoundaryFaceType, BoundaryState};

/// 分类调用阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyPhase {
    /// 首次（初始化）调用：只归并类型，不做一致性检查
    Init,
    /// 逐迭代调用：归并类型并检查一致性
    Iteration,
}

/// 分类器输入：相关变量的边界码数组
#[derive(Debug)]
pub struct ClassifierInputs<'a> {
    /// 速度边界系数
    pub velocity: &'a BcCoeffs,
    /// 压力边界系数
    pub pressure: &'a BcCoeffs,
    /// 网格速度边界系数（ALE 激活时）
    pub mesh_velocity: Option<&'a BcCoeffs>,
    /// 耦合面标记（内部耦合或外部程序耦合）
    pub coupled_faces: Option<&'a [bool]>,
    /// 自由液面标记（VOF 模型钩子填充）
    pub free_surface_faces: Option<&'a [bool]>,
    /// ALE 模式
    pub ale: AleMode,
}

/// 分类一遍边界面
pub fn classify_boundary_faces(
    inputs: &ClassifierInputs<'_>,
    state: &mut BoundaryState,
    barrier: &mut SetupErrorBarrier,
    phase: ClassifyPhase,
) {
    let n_b_faces = state.n_b_faces();
    debug_assert_eq!(inputs.velocity.n_b_faces, n_b_faces);

    for f_id in 0..n_b_faces {
        state.bc_type[f_id] = face_type(inputs, f_id);
    }

    // 出口参考面：未指定时指定第一个出口面
    if state.reference_outlet_face.is_none() {
        state.reference_outlet_face = state
            .bc_type
            .iter()
            .position(|t| *t == BoundaryFaceType::Outlet);
    }

    if phase == ClassifyPhase::Iteration {
        check_consistency(inputs, state, barrier);
    }
}

/// 单面类型归并
fn face_type(inputs: &ClassifierInputs<'_>, f_id: usize) -> BoundaryFaceType {
    if let Some(coupled) = inputs.coupled_faces {
        if coupled[f_id] {
            return BoundaryFaceType::Coupled;
        }
    }
    if let Some(fs) = inputs.free_surface_faces {
        if fs[f_id] {
            return BoundaryFaceType::FreeSurface;
        }
    }

    let vel_code = BcCode::from_code(inputs.velocity.icodcl[f_id]);
    let p_code = BcCode::from_code(inputs.pressure.icodcl[f_id]);

    match vel_code {
        Some(BcCode::SmoothWall) => BoundaryFaceType::SmoothWall,
        Some(BcCode::RoughWall) => BoundaryFaceType::RoughWall,
        Some(BcCode::Symmetry) | Some(BcCode::GeneralizedSymmetry) => BoundaryFaceType::Symmetry,
        Some(BcCode::Dirichlet) | Some(BcCode::DirichletConvNeumannDiff) => {
            BoundaryFaceType::Inlet
        }
        Some(BcCode::ConvectiveOutlet) => BoundaryFaceType::ConvectiveInlet,
        Some(BcCode::Neumann) | None => match p_code {
            Some(BcCode::Dirichlet) | Some(BcCode::Affine) => BoundaryFaceType::Outlet,
            Some(BcCode::Neumann) => BoundaryFaceType::FreeOutlet,
            _ => BoundaryFaceType::Undefined,
        },
        _ => BoundaryFaceType::Undefined,
    }
}

/// 非 init 调用的一致性检查
fn check_consistency(
    inputs: &ClassifierInputs<'_>,
    state: &BoundaryState,
    barrier: &mut SetupErrorBarrier,
) {
    let n_b_faces = state.n_b_faces();

    for f_id in 0..n_b_faces {
        let vel_code = BcCode::from_code(inputs.velocity.icodcl[f_id]);
        let p_code = BcCode::from_code(inputs.pressure.icodcl[f_id]);

        // 速度 Dirichlet 需要压力 Neumann 或耦合出口配对
        if matches!(vel_code, Some(BcCode::Dirichlet)) {
            let coupled = inputs
                .coupled_faces
                .map(|c| c[f_id])
                .unwrap_or(false);
            let pressure_ok = matches!(p_code, Some(BcCode::Neumann) | None) || coupled;
            if !pressure_ok {
                barrier.push(format!(
                    "面 {f_id}: 速度 Dirichlet 需要压力 Neumann 或耦合出口配对（压力码 {:?}）",
                    inputs.pressure.icodcl[f_id]
                ));
            }
        }

        // 出口存在但无参考面（自动指定失败只可能是无出口面）
        if state.bc_type[f_id].is_outlet() && state.reference_outlet_face.is_none() {
            barrier.push(format!("面 {f_id}: 出口面存在但未指定参考压力面"));
        }

        // ALE 面必须携带网格速度边界条件
        if inputs.ale != AleMode::None && state.bc_type[f_id].is_ale() {
            let has_mesh_vel_bc = inputs
                .mesh_velocity
                .map(|mv| mv.icodcl[f_id] != 0)
                .unwrap_or(false);
            if !has_mesh_vel_bc {
                barrier.push(format!("面 {f_id}: ALE 面缺少网格速度边界条件"));
            }
        }

        // 未定义类型在逐迭代阶段不可接受
        if state.bc_type[f_id] == BoundaryFaceType::Undefined {
            barrier.push(format!(
                "面 {f_id}: 边界类型未定义（速度码 {}，压力码 {}）",
                inputs.velocity.icodcl[f_id], inputs.pressure.icodcl[f_id]
            ));
        }
    }
}
