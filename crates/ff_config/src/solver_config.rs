// crates/ff_config/src/solver_config.rs

//! SolverConfig - 求解器配置（全 f64）
//!
//! 定义求解器的全部配置参数。设置文件为 JSON，各节均有默认值，
//! 读入后调用 [`SolverConfig::validate`] 做组合一致性检查。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

// ============================================================
// 时间步进
// ============================================================

/// 时间步模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeStepMode {
    /// 稳态算法（局部伪时间步）
    Steady,
    /// 常数时间步
    #[default]
    Constant,
    /// 自适应统一时间步（全域同一值，逐步协商）
    Adaptive,
    /// 局部自适应时间步（逐单元）
    Local,
}

impl TimeStepMode {
    /// 是否为变时间步（自适应或局部）
    #[inline]
    pub fn is_variable(self) -> bool {
        matches!(self, Self::Adaptive | Self::Local)
    }

    /// 是否为稳态算法
    #[inline]
    pub fn is_steady(self) -> bool {
        matches!(self, Self::Steady)
    }
}

/// 时间步控制选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeStepOptions {
    /// 参考时间步 [s]
    #[serde(default = "default_dtref")]
    pub dtref: f64,

    /// 最小时间步 [s]
    #[serde(default = "default_dtmin")]
    pub dtmin: f64,

    /// 最大时间步 [s]
    #[serde(default = "default_dtmax")]
    pub dtmax: f64,

    /// 最大 Courant 数（非正值关闭对流限制）
    #[serde(default = "default_coumax")]
    pub coumax: f64,

    /// 最大 Fourier 数（非正值关闭扩散限制）
    #[serde(default = "default_foumax")]
    pub foumax: f64,

    /// 可压缩算法的最大质量 CFL
    #[serde(default = "default_cflmmx")]
    pub cflmmx: f64,

    /// 渐进放大率：增大时 dt_new ≤ (1+varrdt)·dt_old
    #[serde(default = "default_varrdt")]
    pub varrdt: f64,

    /// 是否启用密度梯度（浮力）时间步限制
    #[serde(default)]
    pub clip_by_density_scale: bool,

    /// 最大步数
    #[serde(default = "default_nt_max")]
    pub nt_max: usize,
}

fn default_dtref() -> f64 {
    0.1
}
fn default_dtmin() -> f64 {
    1e-8
}
fn default_dtmax() -> f64 {
    1e3
}
fn default_coumax() -> f64 {
    1.0
}
fn default_foumax() -> f64 {
    10.0
}
fn default_cflmmx() -> f64 {
    0.99
}
fn default_varrdt() -> f64 {
    0.1
}
fn default_nt_max() -> usize {
    10
}

impl Default for TimeStepOptions {
    fn default() -> Self {
        Self {
            dtref: default_dtref(),
            dtmin: default_dtmin(),
            dtmax: default_dtmax(),
            coumax: default_coumax(),
            foumax: default_foumax(),
            cflmmx: default_cflmmx(),
            varrdt: default_varrdt(),
            clip_by_density_scale: false,
            nt_max: default_nt_max(),
        }
    }
}

// ============================================================
// 湍流与壁面
// ============================================================

/// 湍流模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurbulenceModel {
    /// 层流
    #[default]
    Laminar,
    /// 标准 k-ε
    KEpsilon,
    /// 线性生成项 k-ε
    KEpsilonLinProd,
    /// k-ω SST
    KOmega,
    /// Rij-ε SSG 雷诺应力
    RijSsg,
    /// EBRSM 雷诺应力（含椭圆混合 α）
    RijEbrsm,
    /// v²-f（φ-f̄ 形式）
    V2fPhiFbar,
    /// v²-f BL-v²/k（含 α）
    V2fBlV2k,
    /// Spalart-Allmaras
    SpalartAllmaras,
    /// LES Smagorinsky
    LesSmagorinsky,
}

impl TurbulenceModel {
    /// 是否求解雷诺应力张量
    #[inline]
    pub fn is_rsm(self) -> bool {
        matches!(self, Self::RijSsg | Self::RijEbrsm)
    }

    /// 是否为二阶闭合（壁面 hint 不含湍粘性）
    #[inline]
    pub fn is_second_order(self) -> bool {
        self.is_rsm()
    }

    /// 是否为 LES
    #[inline]
    pub fn is_les(self) -> bool {
        matches!(self, Self::LesSmagorinsky)
    }

    /// 是否求解 k-ω 对
    #[inline]
    pub fn is_k_omega(self) -> bool {
        matches!(self, Self::KOmega)
    }
}

/// 壁面函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WallFunction {
    /// 不使用壁面函数（低雷诺数贴体求解）
    Disabled,
    /// 单尺度对数律
    OneScaleLog,
    /// 双尺度对数律（摩擦速度与湍动能尺度分离）
    #[default]
    TwoScaleLog,
    /// 粗糙壁对数律
    Rough,
    /// LES Van Driest 阻尼
    VanDriestLes,
}

// ============================================================
// 物理模型开关
// ============================================================

/// 燃烧模型（最多启用一个）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombustionModel {
    /// 三点快化学
    ThreePoint,
    /// 稳态层流小火焰
    Slfm,
    /// 涡破碎
    Ebu,
    /// Libby-Williams
    Lwc,
}

/// 转子/定子（旋转机械）模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurbomachineryModel {
    /// 关闭
    #[default]
    None,
    /// 冻结转子
    Frozen,
    /// 瞬态旋转网格
    Transient,
}

/// ALE 网格运动模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AleMode {
    /// 关闭
    #[default]
    None,
    /// 经典路径（网格速度作为求解变量）
    Legacy,
    /// CDO 路径（外部离散，仅交换数据）
    Cdo,
}

/// 物理模型激活开关
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhysicalModels {
    /// 大气流动模块
    #[serde(default)]
    pub atmospheric: bool,

    /// 冷却塔模块
    #[serde(default)]
    pub cooling_towers: bool,

    /// 燃烧模型（最多一个）
    #[serde(default)]
    pub combustion: Option<CombustionModel>,

    /// 煤粉燃烧
    #[serde(default)]
    pub pulverised_coal: bool,

    /// 可压缩算法
    #[serde(default)]
    pub compressible: bool,

    /// 辐射传热
    #[serde(default)]
    pub radiative_transfer: bool,

    /// VOF 多相界面追踪
    #[serde(default)]
    pub vof: bool,

    /// 转子/定子
    #[serde(default)]
    pub turbomachinery: TurbomachineryModel,

    /// ALE 网格运动
    #[serde(default)]
    pub ale: AleMode,
}

// ============================================================
// 顶层配置
// ============================================================

/// 求解器配置（全 f64）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SolverConfig {
    /// 时间步模式
    #[serde(default)]
    pub time_step_mode: TimeStepMode,

    /// 时间步控制选项
    #[serde(default)]
    pub time_step: TimeStepOptions,

    /// 湍流模型
    #[serde(default)]
    pub turbulence: TurbulenceModel,

    /// 壁面函数
    #[serde(default)]
    pub wall_function: WallFunction,

    /// 物理模型开关
    #[serde(default)]
    pub models: PhysicalModels,

    /// 重力向量 [m/s²]
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],

    /// 参考密度 [kg/m³]
    #[serde(default = "default_rho0")]
    pub rho0: f64,

    /// 参考动力粘性 [Pa·s]
    #[serde(default = "default_mu0")]
    pub mu0: f64,

    /// 全局日志详细级别
    #[serde(default)]
    pub verbosity: i32,
}

fn default_gravity() -> [f64; 3] {
    [0.0, 0.0, -9.81]
}
fn default_rho0() -> f64 {
    1.17862
}
fn default_mu0() -> f64 {
    1.83e-5
}

impl SolverConfig {
    /// 从 JSON 设置文件读入
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_path_buf(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 组合一致性检查
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ts = &self.time_step;
        if ts.dtmin <= 0.0 || ts.dtmax <= 0.0 {
            return Err(ConfigError::invalid(
                "time_step.dtmin/dtmax",
                format!("{}/{}", ts.dtmin, ts.dtmax),
                "必须为正",
            ));
        }
        if ts.dtmin > ts.dtmax {
            return Err(ConfigError::invalid(
                "time_step.dtmin",
                ts.dtmin,
                "不得大于 dtmax",
            ));
        }
        if ts.varrdt < 0.0 {
            return Err(ConfigError::invalid("time_step.varrdt", ts.varrdt, "必须非负"));
        }
        if self.models.vof && self.models.compressible {
            return Err(ConfigError::inconsistent("VOF 与可压缩算法不能同时启用"));
        }
        if self.models.pulverised_coal && self.models.combustion.is_some() {
            return Err(ConfigError::inconsistent("煤粉燃烧与气相燃烧模型不能同时启用"));
        }
        if self.turbulence.is_les() && self.wall_function == WallFunction::TwoScaleLog {
            return Err(ConfigError::inconsistent(
                "LES 需配合 van_driest_les 或 disabled 壁面处理",
            ));
        }
        if self.wall_function != WallFunction::Disabled
            && self.turbulence == TurbulenceModel::Laminar
            && !self.turbulence.is_les()
        {
            // 层流允许壁面函数退化为线性律，仅提示级别，不报错
        }
        Ok(())
    }
}

// ============================================================
// 测试
// ============================================================
