// crates/ff_field/src/equation.rs

//! 方程参数记录
//!
//! 每个求解变量携带一份 [`EquationParams`]，边界条件翻译与时间步
//! 控制按这份记录决定 hint 的形状、梯度算法与限制器。

use serde::{Deserialize, Serialize};

/// 扩散张量形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiffusionTensorShape {
    /// 无扩散
    None,
    /// 各向同性（标量扩散系数）
    #[default]
    Isotropic,
    /// 正交各向异性（对角张量）
    Orthotropic,
    /// 左乘各向异性
    AnisotropicLeft,
    /// 右乘各向异性
    AnisotropicRight,
    /// 完全各向异性（对称张量）
    FullAnisotropic,
}

impl DiffusionTensorShape {
    /// 是否为张量形式
    #[inline]
    pub fn is_tensorial(self) -> bool {
        !matches!(self, Self::None | Self::Isotropic)
    }
}

/// 梯度重构算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradientType {
    /// 迭代 Green-Gauss
    #[default]
    GreenGaussIter,
    /// 最小二乘
    LeastSquares,
    /// Green-Gauss，面值取最小二乘重构
    GreenGaussLsq,
}

/// 边界 I′ 重构路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryReconstruction {
    /// 完整单元梯度后在 diipb 上取值
    #[default]
    CellGradient,
    /// 仅边界模板的最小二乘（只需边界值时避免全域梯度）
    BoundaryLsq,
}

/// 梯度限制器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradientLimiter {
    /// 不限制
    #[default]
    None,
    /// 基于单元的限制
    CellBased,
    /// 基于面的限制
    FaceBased,
}

/// 方程参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationParams {
    /// 对流项开关
    pub iconv: bool,
    /// 扩散项开关
    pub idiff: bool,
    /// 湍流扩散贡献开关（μ_t 计入面扩散系数）
    pub idifft: bool,
    /// 扩散张量形状
    pub diffusion: DiffusionTensorShape,
    /// 梯度重构迭代次数
    pub nswrgr: usize,
    /// 梯度算法
    pub gradient: GradientType,
    /// 边界 I′ 重构路径
    pub b_reconstruction: BoundaryReconstruction,
    /// 梯度限制器
    pub limiter: GradientLimiter,
    /// 梯度裁剪系数
    pub climgr: f64,
    /// 边界专用梯度裁剪系数
    pub climgr_b: f64,
    /// 时间格式权重 θ（1 全隐式，0.5 Crank-Nicolson）
    pub thetav: f64,
    /// 稳态算法的松弛系数
    pub relaxv: f64,
    /// 湍流 Schmidt / Prandtl 数
    pub sigma: f64,
    /// 逐字段日志详细级别
    pub verbosity: i32,
}

impl Default for EquationParams {
    fn default() -> Self {
        Self {
            iconv: true,
            idiff: true,
            idifft: true,
            diffusion: DiffusionTensorShape::Isotropic,
            nswrgr: 100,
            gradient: GradientType::GreenGaussIter,
            b_reconstruction: BoundaryReconstruction::CellGradient,
            limiter: GradientLimiter::None,
            climgr: 1.5,
            climgr_b: 1.0,
            thetav: 1.0,
            relaxv: 0.7,
            sigma: 1.0,
            verbosity: 0,
        }
    }
}

impl EquationParams {
    /// 纯扩散变量（压力修正类）
    pub fn diffusion_only() -> Self {
        Self {
            iconv: false,
            idifft: false,
            ..Default::default()
        }
    }

    /// 设置扩散张量形状
    pub fn with_diffusion(mut self, shape: DiffusionTensorShape) -> Self {
        self.diffusion = shape;
        self
    }

    /// 设置梯度算法
    pub fn with_gradient(mut self, gradient: GradientType) -> Self {
        self.gradient = gradient;
        self
    }

    /// 设置湍流 Schmidt 数
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }
}
