// crates/ff_physics/src/types.rs

//! 边界码、面类型与湍流常数
//!
//! 用户与模型写入的逐面边界码是封闭枚举 [`BcCode`]，分类器产出的
//! 物理一致面类型是 [`BoundaryFaceType`]。两者的整数值保持与
//! 设置文件及重启段的历史编码一致。

use ff_foundation::tolerance::INFINITE_R;

// ============================================================
// 边界码
// ============================================================

/// 逐面逐变量的边界码
///
/// 对应 `icodcl` 整数编码。翻译阶段对每个面按本枚举分派到
/// [`crate::boundary::coeffs`] 中的系数原语。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum BcCode {
    /// Dirichlet（可带外部交换系数）
    Dirichlet = 1,
    /// 对流出口（波动随局部 Courant 数外传）
    ConvectiveOutlet = 2,
    /// Neumann（施加通量）
    Neumann = 3,
    /// 对称面
    Symmetry = 4,
    /// 光滑壁 + 壁面律
    SmoothWall = 5,
    /// 粗糙壁 + 壁面律
    RoughWall = 6,
    /// 仿射外推 φ_face = pinf + ratio·φ_cell
    Affine = 10,
    /// 切向 Dirichlet + 法向 Neumann（广义 Dirichlet）
    DirichletTangential = 11,
    /// 对流仿射 + 扩散 Neumann
    AffineConvNeumannDiff = 12,
    /// 对流 Dirichlet + 扩散 Neumann
    DirichletConvNeumannDiff = 13,
    /// 广义对称 / Marangoni（法向 Dirichlet + 切向 Neumann）
    GeneralizedSymmetry = 14,
    /// 对流 Neumann + 零扩散
    NeumannConvZeroDiff = 15,
}

impl BcCode {
    /// 从整数码解析
    pub fn from_code(code: i16) -> Option<Self> {
        Some(match code {
            1 => Self::Dirichlet,
            2 => Self::ConvectiveOutlet,
            3 => Self::Neumann,
            4 => Self::Symmetry,
            5 => Self::SmoothWall,
            6 => Self::RoughWall,
            10 => Self::Affine,
            11 => Self::DirichletTangential,
            12 => Self::AffineConvNeumannDiff,
            13 => Self::DirichletConvNeumannDiff,
            14 => Self::GeneralizedSymmetry,
            15 => Self::NeumannConvZeroDiff,
            _ => return None,
        })
    }

    /// 整数码
    #[inline]
    pub fn as_code(self) -> i16 {
        self as i16
    }

    /// 是否为壁面律码
    #[inline]
    pub fn is_wall_law(self) -> bool {
        matches!(self, Self::SmoothWall | Self::RoughWall)
    }
}

// ============================================================
// 物理一致的面类型
// ============================================================

/// 分类器产出的面类型
///
/// 跨全部变量保持一致的物理类型，模型钩子在此基础上补充。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BoundaryFaceType {
    /// 未定义
    #[default]
    Undefined = 0,
    /// 入口
    Inlet,
    /// 对流入口
    ConvectiveInlet,
    /// 出口（参考压力面可指定其中之一）
    Outlet,
    /// 自由出口
    FreeOutlet,
    /// 光滑壁
    SmoothWall,
    /// 粗糙壁
    RoughWall,
    /// 对称面
    Symmetry,
    /// 与外部程序或内部界面耦合
    Coupled,
    /// 自由液面
    FreeSurface,
    /// ALE 固定
    AleFixed,
    /// ALE 滑移
    AleSliding,
    /// ALE 施加速度
    AleImposedVelocity,
    /// ALE 施加位移
    AleImposedDisplacement,
    /// ALE 自由液面
    AleFreeSurface,
}

impl BoundaryFaceType {
    /// 是否为壁面
    #[inline]
    pub fn is_wall(self) -> bool {
        matches!(self, Self::SmoothWall | Self::RoughWall)
    }

    /// 是否为出口族
    #[inline]
    pub fn is_outlet(self) -> bool {
        matches!(self, Self::Outlet | Self::FreeOutlet)
    }

    /// 是否为 ALE 类型
    #[inline]
    pub fn is_ale(self) -> bool {
        matches!(
            self,
            Self::AleFixed
                | Self::AleSliding
                | Self::AleImposedVelocity
                | Self::AleImposedDisplacement
                | Self::AleFreeSurface
        )
    }
}

// ============================================================
// 湍流与壁面律常数
// ============================================================

/// 湍流模型常数
///
/// k-ω 的 Schmidt 数取"入口"常数 σ_k2 / σ_ω2，壁面处也沿用，
/// 与上游数值核保持一致。
#[derive(Debug, Clone)]
pub struct TurbulenceConstants {
    /// C_μ
    pub cmu: f64,
    /// von Kármán 常数
    pub kappa: f64,
    /// 对数律截距
    pub cstlog: f64,
    /// 幂律系数（单尺度低 y⁺ 回退）
    pub apow: f64,
    /// 幂律指数
    pub bpow: f64,
    /// Van Driest 阻尼常数 A⁺
    pub vdriest: f64,
    /// k 方程 Schmidt 数
    pub sigma_k: f64,
    /// ε 方程 Schmidt 数
    pub sigma_eps: f64,
    /// k-ω 的 k Schmidt 数（入口常数）
    pub sigma_k2: f64,
    /// k-ω 的 ω Schmidt 数（入口常数）
    pub sigma_w2: f64,
    /// Daly-Harlow / GGDH 扩散常数 C_s
    pub csrij: f64,
}

impl Default for TurbulenceConstants {
    fn default() -> Self {
        Self {
            cmu: 0.09,
            kappa: 0.42,
            cstlog: 5.2,
            apow: 8.3,
            bpow: 1.0 / 7.0,
            vdriest: 25.6,
            sigma_k: 1.0,
            sigma_eps: 1.30,
            sigma_k2: 1.0,
            sigma_w2: 0.856,
            csrij: 0.22,
        }
    }
}

// ============================================================
// 逐迭代的边界状态
// ============================================================

/// 核心各阶段共享的逐面状态
///
/// 每外层迭代由分类与闭合阶段填充，翻译与后处理阶段消费。
#[derive(Debug, Clone)]
pub struct BoundaryState {
    /// 面类型
    pub bc_type: Vec<BoundaryFaceType>,
    /// 对称面标志：0 表示该面参与质量通量修正时法向分量清零
    pub isympa: Vec<u8>,
    /// 出口参考压力面
    pub reference_outlet_face: Option<usize>,
    /// 壁面摩擦速度 u*
    pub uetbor: Vec<f64>,
    /// 壁面无量纲距离 y⁺
    pub yplbr: Vec<f64>,
    /// 壁面温度（I′ 重构值，热耦合用）
    pub theipb: Vec<f64>,
    /// 壁面交换系数（热耦合用）
    pub hbord: Vec<f64>,
    /// 辐射对流通量
    pub bfconv: Vec<f64>,
    /// 辐射对流交换系数
    pub bhconv: Vec<f64>,
    /// 瞬态转子模式的壁面速度备份系数（哨兵 = 未使用）
    pub coftur: Vec<f64>,
    /// 瞬态转子模式的壁面交换系数备份（哨兵 = 未使用）
    pub hfltur: Vec<f64>,
    /// Van Driest 阻尼前的湍流粘性（壁面距离场撤销阻尼用）
    pub visvdr: Vec<f64>,
}

impl BoundaryState {
    /// 按边界面数分配
    pub fn new(n_b_faces: usize) -> Self {
        Self {
            bc_type: vec![BoundaryFaceType::Undefined; n_b_faces],
            isympa: vec![1; n_b_faces],
            reference_outlet_face: None,
            uetbor: vec![0.0; n_b_faces],
            yplbr: vec![0.0; n_b_faces],
            theipb: vec![0.0; n_b_faces],
            hbord: vec![0.0; n_b_faces],
            bfconv: vec![0.0; n_b_faces],
            bhconv: vec![0.0; n_b_faces],
            coftur: vec![INFINITE_R; n_b_faces],
            hfltur: vec![INFINITE_R; n_b_faces],
            visvdr: vec![-1.0; n_b_faces],
        }
    }

    /// 边界面数
    #[inline]
    pub fn n_b_faces(&self) -> usize {
        self.bc_type.len()
    }

    /// 瞬态转子备份系数（哨兵返回 None，下游必须显式判断）
    pub fn rotor_wall_coeffs(&self, f_id: usize) -> Option<(f64, f64)> {
        let (c, h) = (self.coftur[f_id], self.hfltur[f_id]);
        if ff_foundation::tolerance::is_unused_sentinel(c)
            || ff_foundation::tolerance::is_unused_sentinel(h)
        {
            None
        } else {
            Some((c, h))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bc_code_roundtrip() {
        for code in [1, 2, 3, 4, 5, 6, 10, 11, 12, 13, 14, 15] {
            let bc = BcCode::from_code(code).unwrap();
            assert_eq!(bc.as_code(), code);
        }
        assert!(BcCode::from_code(0).is_none());
        assert!(BcCode::from_code(7).is_none());
    }

    #[test]
    fn test_wall_law_predicate() {
        assert!(BcCode::SmoothWall.is_wall_law());
        assert!(BcCode::RoughWall.is_wall_law());
        assert!(!BcCode::Dirichlet.is_wall_law());
    }

    #[test]
    fn test_face_type_predicates() {
        assert!(BoundaryFaceType::SmoothWall.is_wall());
        assert!(BoundaryFaceType::FreeOutlet.is_outlet());
        assert!(BoundaryFaceType::AleSliding.is_ale());
        assert!(!BoundaryFaceType::Inlet.is_wall());
    }

    #[test]
    fn test_rotor_coeffs_sentinel() {
        let mut state = BoundaryState::new(2);
        assert!(state.rotor_wall_coeffs(0).is_none());

        state.coftur[0] = 0.0;
        state.hfltur[0] = 12.5;
        assert_eq!(state.rotor_wall_coeffs(0), Some((0.0, 12.5)));
        assert!(state.rotor_wall_coeffs(1).is_none());
    }
}
