// crates/ff_field/src/field.rs

//! 字段本体与元数据

use ff_foundation::{FfError, FfResult};

use crate::bc_coeffs::BcCoeffs;
use crate::equation::EquationParams;
use crate::registry::FieldId;

/// 字段整型元数据
///
/// 关联字段之间的引用关系。等价于整型键值表，但以显式字段表达，
/// 避免键名拼写错误。
#[derive(Debug, Clone, Default)]
pub struct FieldMetadata {
    /// 标量序号（用户与模型标量统一编号）
    pub scalar_id: Option<usize>,
    /// 是否为温度变量
    pub is_temperature: bool,
    /// 可变扩散系数字段
    pub diffusivity_field: Option<FieldId>,
    /// 湍流通量模型编号（EB-GGDH / AFM / DFM 族）
    pub turbulent_flux_model: Option<i32>,
    /// 方差变量的母标量
    pub variance_parent: Option<FieldId>,
    /// 边界面值字段
    pub boundary_value_field: Option<FieldId>,
    /// 内部面质量通量字段
    pub inner_mass_flux: Option<FieldId>,
    /// 边界面质量通量字段
    pub boundary_mass_flux: Option<FieldId>,
}

/// 求解变量字段
///
/// `layers[0]` 为当前时刻值，`layers[1]` 为前一时刻，
/// `layers[2]`（可选）为再前一时刻。分量存储为元素主序
/// `elt·dim + comp`。
#[derive(Debug, Clone)]
pub struct Field {
    /// 字段名（注册表内唯一）
    pub name: String,
    /// 维度（1/3/6/9）
    pub dim: usize,
    /// 元素数（单元场为 n_cells_ext，面场为面数）
    pub n_elts: usize,
    /// 时间层，`layers[0]` 为当前值
    layers: Vec<Vec<f64>>,
    /// 方程参数
    pub eqp: EquationParams,
    /// 边界条件系数（仅求解变量持有）
    pub bc: Option<BcCoeffs>,
    /// 整型元数据
    pub meta: FieldMetadata,
}

impl Field {
    /// 创建字段（单时间层）
    pub fn new(name: impl Into<String>, dim: usize, n_elts: usize) -> Self {
        Self::with_layers(name, dim, n_elts, 1)
    }

    /// 创建字段并指定时间层数（1..=3）
    pub fn with_layers(name: impl Into<String>, dim: usize, n_elts: usize, n_layers: usize) -> Self {
        debug_assert!((1..=3).contains(&n_layers), "时间层数必须为 1..=3");
        Self {
            name: name.into(),
            dim,
            n_elts,
            layers: (0..n_layers).map(|_| vec![0.0; n_elts * dim]).collect(),
            eqp: EquationParams::default(),
            bc: None,
            meta: FieldMetadata::default(),
        }
    }

    /// 设置方程参数
    pub fn with_eqp(mut self, eqp: EquationParams) -> Self {
        self.eqp = eqp;
        self
    }

    /// 时间层数
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    /// 当前值
    #[inline]
    pub fn val(&self) -> &[f64] {
        &self.layers[0]
    }

    /// 当前值（可变）
    #[inline]
    pub fn val_mut(&mut self) -> &mut [f64] {
        &mut self.layers[0]
    }

    /// 前一时刻值
    ///
    /// 字段仅保存一个时间层时返回错误。
    pub fn val_prev(&self) -> FfResult<&[f64]> {
        self.layers.get(1).map(|v| v.as_slice()).ok_or_else(|| {
            FfError::MissingTimeLayer {
                name: self.name.clone(),
                n_layers: self.n_layers(),
            }
        })
    }

    /// 再前一时刻值
    pub fn val_prev2(&self) -> FfResult<&[f64]> {
        self.layers.get(2).map(|v| v.as_slice()).ok_or_else(|| {
            FfError::MissingTimeLayer {
                name: self.name.clone(),
                n_layers: self.n_layers(),
            }
        })
    }

    /// 时间层轮转：当前值拷入前一层
    pub fn rotate_layers(&mut self) {
        let n = self.layers.len();
        for l in (1..n).rev() {
            let (front, back) = self.layers.split_at_mut(l);
            back[0].copy_from_slice(&front[l - 1]);
        }
    }

    /// 分配边界条件系数（网格连接关系变化时调用）
    pub fn allocate_bc(&mut self, n_b_faces: usize) {
        let mut bc = BcCoeffs::new(n_b_faces, self.dim);
        if self.dim == 6 {
            bc = bc.with_divergence_coeffs();
        }
        self.bc = Some(bc);
    }

    /// 边界条件系数
    pub fn bc(&self) -> FfResult<&BcCoeffs> {
        self.bc
            .as_ref()
            .ok_or_else(|| FfError::internal(format!("字段 '{}' 未分配边界条件系数", self.name)))
    }

    /// 边界条件系数（可变）
    pub fn bc_mut(&mut self) -> FfResult<&mut BcCoeffs> {
        let name = self.name.clone();
        self.bc
            .as_mut()
            .ok_or_else(|| FfError::internal(format!("字段 '{name}' 未分配边界条件系数")))
    }

    /// 标量分量视图（comp < dim）
    #[inline]
    pub fn component(&self, elt: usize, comp: usize) -> f64 {
        self.layers[0][elt * self.dim + comp]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_layer_rejects_prev() {
        let f = Field::new("pressure", 1, 8);
        assert!(f.val_prev().is_err());
    }

    #[test]
    fn test_layer_rotation() {
        let mut f = Field::with_layers("velocity", 3, 2, 2);
        f.val_mut()[0] = 1.5;
        f.rotate_layers();
        f.val_mut()[0] = 2.5;
        assert_eq!(f.val_prev().unwrap()[0], 1.5);
        assert_eq!(f.val()[0], 2.5);
    }

    #[test]
    fn test_three_layer_rotation() {
        let mut f = Field::with_layers("rho", 1, 1, 3);
        f.val_mut()[0] = 1.0;
        f.rotate_layers();
        f.val_mut()[0] = 2.0;
        f.rotate_layers();
        f.val_mut()[0] = 3.0;
        assert_eq!(f.val()[0], 3.0);
        assert_eq!(f.val_prev().unwrap()[0], 2.0);
        assert_eq!(f.val_prev2().unwrap()[0], 1.0);
    }

    #[test]
    fn test_tensor_bc_allocates_divergence() {
        let mut f = Field::new("rij", 6, 4);
        f.allocate_bc(5);
        let bc = f.bc().unwrap();
        assert!(bc.ad.is_some());
        assert!(bc.bd.is_some());
    }

    #[test]
    fn test_missing_bc_is_error() {
        let f = Field::new("k", 1, 4);
        assert!(f.bc().is_err());
    }
}
