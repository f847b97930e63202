// crates/ff_physics/src/thermal.rs

//! 温度 ⇔ 焓转换与壁面热耦合数组
//!
//! 热变量求解焓时，用户仍可按温度给定壁面 Dirichlet——对应面的
//! 焓字段边界码带负号标记。翻译前逐面调用注册的转换回调把温度
//! 换成焓、恢复正码，同时保存原始温度：边界温度字段更新直接取
//! 保存值，T → H → T 往返严格复原。

use parking_lot::RwLock;

use ff_foundation::{FfError, FfResult};

/// 标量转换回调
pub type ConvertFn = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// 温度 ⇔ 焓转换注册表
#[derive(Default)]
pub struct ThermalConversions {
    t_to_h: RwLock<Option<ConvertFn>>,
    h_to_t: RwLock<Option<ConvertFn>>,
}

impl ThermalConversions {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册温度 → 焓
    pub fn register_t_to_h(&self, f: ConvertFn) {
        *self.t_to_h.write() = Some(f);
    }

    /// 注册焓 → 温度
    pub fn register_h_to_t(&self, f: ConvertFn) {
        *self.h_to_t.write() = Some(f);
    }

    /// 是否已注册温度 → 焓
    pub fn has_t_to_h(&self) -> bool {
        self.t_to_h.read().is_some()
    }

    /// 温度 → 焓（未注册时报配置错误）
    pub fn t_to_h(&self, temperature: f64) -> FfResult<f64> {
        match &*self.t_to_h.read() {
            Some(f) => Ok(f(temperature)),
            None => Err(FfError::config("按温度给定焓边界但未注册温度→焓转换回调")),
        }
    }

    /// 焓 → 温度
    pub fn h_to_t(&self, enthalpy: f64) -> FfResult<f64> {
        match &*self.h_to_t.read() {
            Some(f) => Ok(f(enthalpy)),
            None => Err(FfError::config("未注册焓→温度转换回调")),
        }
    }
}

/// 壁面热记账
///
/// 翻译阶段保存按温度给定的原始壁温，后处理阶段写回边界温度字段。
#[derive(Debug, Clone)]
pub struct WallThermalBookkeeping {
    /// 按温度给定的面的原始壁温（未给定为 None）
    pub saved_wall_temperature: Vec<Option<f64>>,
}

impl WallThermalBookkeeping {
    /// 按边界面数分配
    pub fn new(n_b_faces: usize) -> Self {
        Self {
            saved_wall_temperature: vec![None; n_b_faces],
        }
    }

    /// 每外层迭代重置
    pub fn reset(&mut self) {
        self.saved_wall_temperature.fill(None);
    }

    /// 边界温度：有保存值的面严格取保存值（T→H→T 往返精确）
    pub fn boundary_temperature(
        &self,
        f_id: usize,
        conversions: &ThermalConversions,
        enthalpy_face: f64,
    ) -> FfResult<f64> {
        match self.saved_wall_temperature[f_id] {
            Some(t) => Ok(t),
            None => conversions.h_to_t(enthalpy_face),
        }
    }
}
