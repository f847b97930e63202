// crates/ff_physics/src/boundary/wall_law.rs

//! 壁面律闭合
//!
//! 对每个 `SmoothWall` / `RoughWall` 面：
//!
//! 1. 由 I′ 处切向速度求摩擦速度 u*（单尺度 / 双尺度对数律、
//!    粗糙壁、LES Van Driest）
//! 2. 派生无量纲壁距 y⁺ 与热标度 t⁺、t*（求解热变量时）
//! 3. Van Driest 激活时阻尼壁单元湍粘性，保留阻尼前的值
//!    供壁面距离场撤销
//! 4. 产出从属变量（k、ε、ω、Rij、ν̃、输运标量）的 Dirichlet 值
//!
//! 闭合为纯函数：同一面同一输入重复调用按位一致。

use glam::DVec3;

use ff_config::WallFunction;

use crate::types::TurbulenceConstants;

/// 对数律迭代次数
const NITER_LOG: usize = 10;

/// 粘性底层 / 对数层交界 y⁺
const YPLUS_LIM: f64 = 10.88;

/// 单面壁面律输入
#[derive(Debug, Clone, Copy)]
pub struct WallLawInput {
    /// I′ 处流体速度
    pub u_ip: DVec3,
    /// 壁面自身速度（转子 / ALE 运动壁为非零）
    pub u_wall: DVec3,
    /// 单位外法向
    pub normal: DVec3,
    /// 单元中心到壁的距离
    pub b_dist: f64,
    /// I′ 处湍动能（双尺度用，层流 / 单尺度可为 None）
    pub k_ip: Option<f64>,
    /// 分子运动粘性 ν
    pub nu: f64,
    /// 密度
    pub rho: f64,
    /// 空气动力学粗糙度 z0（仅粗糙壁）
    pub roughness: Option<f64>,
}

/// 单面壁面律闭合结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WallFaceClosure {
    /// 摩擦速度 u*
    pub uet: f64,
    /// 湍动能尺度速度 uk（单尺度时等于 u*）
    pub uk: f64,
    /// 无量纲壁距 y⁺
    pub yplus: f64,
    /// 切向单位方向（I′ 相对滑移速度方向）
    pub tangent: DVec3,
    /// 速度交换系数 h_flui = ρ·u*·uk / |u_tan|（壁面律 Robin 形式）
    pub hflui: f64,
    /// Van Driest 阻尼因子（无阻尼为 1）
    pub damping: f64,
}

/// 壁面律闭合计算器
#[derive(Debug, Clone)]
pub struct WallClosure {
    /// 壁面函数选择
    pub wall_function: WallFunction,
    /// 湍流常数
    pub constants: TurbulenceConstants,
}

impl WallClosure {
    /// 创建
    pub fn new(wall_function: WallFunction, constants: TurbulenceConstants) -> Self {
        Self {
            wall_function,
            constants,
        }
    }

    /// 单尺度对数律摩擦速度（定点迭代）
    ///
    /// u⁺ = ln(y⁺)/κ + C，低 y⁺ 时回退幂律 u⁺ = A·(y⁺)^B。
    pub fn friction_velocity_smooth(&self, u_tan: f64, y: f64, nu: f64) -> f64 {
        let c = &self.constants;
        if u_tan <= 0.0 || y <= 0.0 {
            return 0.0;
        }

        // 幂律种子：u* = (u / (A·(y/ν)^B))^(1/(1+B))
        let mut uet = (u_tan / (c.apow * (y / nu).powf(c.bpow))).powf(1.0 / (1.0 + c.bpow));

        for _ in 0..NITER_LOG {
            let yplus = (uet * y / nu).max(1e-12);
            if yplus < YPLUS_LIM {
                // 粘性底层：u⁺ = y⁺，直接解 u* = sqrt(u·ν/y)
                return (u_tan * nu / y).sqrt();
            }
            uet = u_tan * c.kappa / (yplus.ln() + c.kappa * c.cstlog);
        }
        uet
    }

    /// 粗糙壁摩擦速度：u⁺ = ln((y+z0)/z0)/κ
    pub fn friction_velocity_rough(&self, u_tan: f64, y: f64, z0: f64) -> f64 {
        let c = &self.constants;
        if u_tan <= 0.0 || y <= 0.0 || z0 <= 0.0 {
            return 0.0;
        }
        u_tan * c.kappa / ((y + z0) / z0).ln()
    }

    /// 单面闭合
    pub fn closure_for_face(&self, input: &WallLawInput) -> WallFaceClosure {
        let c = &self.constants;

        // 相对滑移速度的切向分量
        let du = input.u_ip - input.u_wall;
        let du_tan = du - du.dot(input.normal) * input.normal;
        let u_tan = du_tan.length();
        let tangent = if u_tan > 1e-30 {
            du_tan / u_tan
        } else {
            DVec3::ZERO
        };

        let y = input.b_dist;
        let nu = input.nu;

        // 双尺度时湍动能给出速度尺度 uk，其余路径 uk = u*
        let uk_two_scale = input
            .k_ip
            .map(|k| c.cmu.powf(0.25) * k.max(0.0).sqrt())
            .unwrap_or(0.0);

        let (uet, uk) = match self.wall_function {
            WallFunction::Disabled => {
                // 贴体求解：线性律 u* = sqrt(ν·u/y)
                let uet = (u_tan * nu / y).max(0.0).sqrt();
                (uet, uet)
            }
            WallFunction::OneScaleLog | WallFunction::VanDriestLes => {
                let uet = self.friction_velocity_smooth(u_tan, y, nu);
                (uet, uet)
            }
            WallFunction::TwoScaleLog => {
                let uk = if uk_two_scale > 0.0 {
                    uk_two_scale
                } else {
                    self.friction_velocity_smooth(u_tan, y, nu)
                };
                let yplus = (uk * y / nu).max(1e-12);
                let uet = if yplus < YPLUS_LIM {
                    u_tan / yplus
                } else {
                    u_tan * c.kappa / (yplus.ln() + c.kappa * c.cstlog)
                };
                (uet, uk)
            }
            WallFunction::Rough => {
                let z0 = input.roughness.unwrap_or(1e-3);
                let uet = self.friction_velocity_rough(u_tan, y, z0);
                (uet, uet)
            }
        };

        let yplus = uk * y / nu;

        // Robin 交换系数：τ_w = ρ·u*·uk，除以切向速度得 h
        let hflui = if u_tan > 1e-30 {
            input.rho * uet * uk / u_tan
        } else {
            input.rho * uk * c.kappa / (yplus.max(1.0).ln() / c.kappa + c.cstlog).max(1e-12)
        };

        let damping = if matches!(self.wall_function, WallFunction::VanDriestLes) {
            let d = 1.0 - (-yplus / c.vdriest).exp();
            d * d
        } else {
            1.0
        };

        WallFaceClosure {
            uet,
            uk,
            yplus,
            tangent,
            hflui,
            damping,
        }
    }

    /// 热标度 t⁺（两层模型 + Jayatilleke 修正）
    ///
    /// y⁺ ≤ y⁺_lim: t⁺ = Pr·y⁺；对数层: t⁺ = Pr_t·(u⁺ + P)。
    pub fn tplus(&self, yplus: f64, prandtl: f64, prandtl_t: f64) -> f64 {
        let c = &self.constants;
        if yplus <= YPLUS_LIM {
            return prandtl * yplus;
        }
        let pr_ratio = prandtl / prandtl_t;
        let pee = 9.24 * (pr_ratio.powf(0.75) - 1.0) * (1.0 + 0.28 * (-0.007 * pr_ratio).exp());
        let uplus = yplus.max(1.0).ln() / c.kappa + c.cstlog;
        prandtl_t * (uplus + pee)
    }

    /// 壁面热交换系数 h = ρ·cp·u* / t⁺
    pub fn thermal_exchange_coeff(
        &self,
        closure: &WallFaceClosure,
        rho: f64,
        cp: f64,
        prandtl: f64,
        prandtl_t: f64,
    ) -> f64 {
        let tp = self.tplus(closure.yplus, prandtl, prandtl_t).max(1e-12);
        rho * cp * closure.uet / tp
    }
}

// ============================================================
// 从属湍流变量的壁面值
// ============================================================

/// 壁面处从属湍流变量的 Dirichlet 值
#[derive(Debug, Clone, Copy, Default)]
pub struct WallTurbulenceValues {
    /// 湍动能
    pub k: Option<f64>,
    /// 耗散率
    pub epsilon: Option<f64>,
    /// 比耗散率
    pub omega: Option<f64>,
    /// 雷诺应力（全局坐标 Voigt）
    pub rij: Option<[f64; 6]>,
    /// Spalart-Allmaras 变量
    pub nu_tilde: Option<f64>,
}

/// 平衡层常数：壁面坐标下的雷诺应力分量 / u*²
///
/// (流向, 法向, 展向, 切应力)
const RIJ_EQUILIBRIUM: (f64, f64, f64, f64) = (5.1, 1.0, 2.3, -1.0);

/// 由闭合结果组装从属湍流变量的壁面值
///
/// `wants_*` 按激活的湍流模型选择。ε 与 ω 在 I′ 处取对数层平衡值。
pub fn wall_turbulence_values(
    closure: &WallFaceClosure,
    constants: &TurbulenceConstants,
    b_dist: f64,
    normal: DVec3,
    wants_k_eps: bool,
    wants_omega: bool,
    wants_rij: bool,
    wants_nu_tilde: bool,
) -> WallTurbulenceValues {
    let mut out = WallTurbulenceValues::default();
    let uk = closure.uk;
    let uet = closure.uet;
    let sqrt_cmu = constants.cmu.sqrt();
    let y = b_dist.max(1e-30);

    if wants_k_eps {
        out.k = Some(uk * uk / sqrt_cmu);
        out.epsilon = Some(uk.powi(3) / (constants.kappa * y));
    }
    if wants_omega {
        out.k = Some(uk * uk / sqrt_cmu);
        // ω = ε/(Cμ·k)
        out.omega = Some(uk / (sqrt_cmu * constants.kappa * y));
    }
    if wants_rij {
        let (c_tt, c_nn, c_ss, c_tn) = RIJ_EQUILIBRIUM;
        let t = closure.tangent;
        let n = normal;
        let s = n.cross(t);
        let u2 = uet * uet;

        // 壁面坐标 (t, n, s) 下的平衡应力旋回全局坐标:
        // R = c_tt·t⊗t + c_nn·n⊗n + c_ss·s⊗s + c_tn·(t⊗n + n⊗t)
        let comp = |i: usize, j: usize| -> f64 {
            u2 * (c_tt * t[i] * t[j]
                + c_nn * n[i] * n[j]
                + c_ss * s[i] * s[j]
                + c_tn * (t[i] * n[j] + n[i] * t[j]))
        };
        out.rij = Some([
            comp(0, 0),
            comp(1, 1),
            comp(2, 2),
            comp(0, 1),
            comp(1, 2),
            comp(0, 2),
        ]);
        out.epsilon = Some(uk.powi(3) / (constants.kappa * y));
    }
    if wants_nu_tilde {
        out.nu_tilde = Some(0.0);
    }

    out
}

// ============================================================
// 测试
// ============================================================
