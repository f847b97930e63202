// crates/ff_field/src/registry.rs

//! 字段注册表
//!
//! 所有字段集中存放在一个带稳定索引的容器中，互相之间通过
//! [`FieldId`] 引用。翻译循环需要同时可变访问一个字段、只读
//! 访问其它字段时，使用 [`FieldRegistry::take`] /
//! [`FieldRegistry::put_back`] 将目标字段临时移出。

use std::collections::HashMap;

use ff_foundation::{FfError, FfResult};

use crate::field::Field;

/// 常用字段名
pub mod names {
    /// 速度
    pub const VELOCITY: &str = "velocity";
    /// 压力
    pub const PRESSURE: &str = "pressure";
    /// 空隙率（VOF）
    pub const VOID_FRACTION: &str = "void_fraction";
    /// 湍动能
    pub const K: &str = "k";
    /// 湍动能耗散率
    pub const EPSILON: &str = "epsilon";
    /// 比耗散率
    pub const OMEGA: &str = "omega";
    /// 雷诺应力张量
    pub const RIJ: &str = "rij";
    /// 椭圆混合变量
    pub const ALPHA: &str = "alpha";
    /// v²-f 的 f̄ 变量
    pub const F_BAR: &str = "f_bar";
    /// v²-f 的 φ 变量
    pub const PHI: &str = "phi";
    /// Spalart-Allmaras 变量
    pub const NU_TILDE: &str = "nu_tilde";
    /// ALE 网格速度
    pub const MESH_VELOCITY: &str = "mesh_velocity";
    /// ALE 网格位移
    pub const MESH_DISPLACEMENT: &str = "mesh_displacement";
    /// 时间步
    pub const DT: &str = "dt";
    /// 密度
    pub const DENSITY: &str = "density";
    /// 边界面密度
    pub const BOUNDARY_DENSITY: &str = "boundary_density";
    /// 分子粘性
    pub const MOLECULAR_VISCOSITY: &str = "molecular_viscosity";
    /// 湍流粘性
    pub const TURBULENT_VISCOSITY: &str = "turbulent_viscosity";
    /// 各向异性湍流粘性张量
    pub const VISTEN: &str = "anisotropic_turbulent_viscosity";
    /// 温度
    pub const TEMPERATURE: &str = "temperature";
    /// 焓
    pub const ENTHALPY: &str = "enthalpy";
    /// 压力时间步张量（正交各向异性压力 hint）
    pub const DTTENS: &str = "dttens";
}

/// 字段句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

/// 字段注册表
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<Option<Field>>,
    by_name: HashMap<String, FieldId>,
}

impl FieldRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册字段，名称重复时报错
    pub fn add(&mut self, field: Field) -> FfResult<FieldId> {
        if self.by_name.contains_key(&field.name) {
            return Err(FfError::config(format!("字段 '{}' 重复注册", field.name)));
        }
        let id = FieldId(self.fields.len());
        self.by_name.insert(field.name.clone(), id);
        self.fields.push(Some(field));
        Ok(id)
    }

    /// 字段数
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 按名称查找（可失败）
    pub fn id_by_name(&self, name: &str) -> FfResult<FieldId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| FfError::field_not_found(name))
    }

    /// 按名称查找（可选）
    pub fn try_id_by_name(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    /// 按句柄访问
    pub fn field(&self, id: FieldId) -> &Field {
        self.fields[id.0].as_ref().expect("字段已被临时移出")
    }

    /// 按句柄可变访问
    pub fn field_mut(&mut self, id: FieldId) -> &mut Field {
        self.fields[id.0].as_mut().expect("字段已被临时移出")
    }

    /// 按名称访问
    pub fn by_name(&self, name: &str) -> FfResult<&Field> {
        Ok(self.field(self.id_by_name(name)?))
    }

    /// 临时移出一个字段，以便在可变处理它的同时只读访问其余字段
    ///
    /// 处理完后必须用 [`put_back`](Self::put_back) 放回。
    pub fn take(&mut self, id: FieldId) -> Field {
        self.fields[id.0].take().expect("字段已被临时移出")
    }

    /// 放回临时移出的字段
    pub fn put_back(&mut self, id: FieldId, field: Field) {
        debug_assert!(self.fields[id.0].is_none(), "槽位未空");
        self.fields[id.0] = Some(field);
    }

    /// 遍历全部字段句柄（注册顺序）
    pub fn ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        (0..self.fields.len()).map(FieldId)
    }

    /// 遍历全部字段
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter_map(|f| f.as_ref())
    }

    /// 为全部持有 BC 的字段重置系数（外层迭代开始）
    pub fn reset_all_bc(&mut self) {
        for field in self.fields.iter_mut().filter_map(|f| f.as_mut()) {
            if let Some(bc) = &mut field.bc {
                bc.reset();
            }
        }
    }

    /// 当前到前一时刻的全体轮转（时间步推进）
    pub fn rotate_all_layers(&mut self) {
        for field in self.fields.iter_mut().filter_map(|f| f.as_mut()) {
            if field.n_layers() > 1 {
                field.rotate_layers();
            }
        }
    }
}
