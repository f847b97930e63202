// crates/ff_mesh/src/halo.rs

//! halo 描述符与交换
//!
//! 梯度计算结束与 I′ 重构开始处需要同步 ghost 单元。多进程实现经
//! MPI 发收；单进程网格的 halo 仅包含周期 / 旋转周期镜像，交换退化
//! 为本地拷贝加变换。
//!
//! 向量与张量经过旋转周期面时必须施加旋转矩阵，标量不变——
//! 调用方按字段维度选择对应的同步入口。

use glam::{DMat3, DVec3};

/// 旋转周期描述
#[derive(Debug, Clone, Copy)]
pub struct PeriodicRotation {
    /// 旋转矩阵
    pub matrix: DMat3,
}

impl PeriodicRotation {
    /// 绕轴旋转
    pub fn from_axis_angle(axis: DVec3, angle: f64) -> Self {
        Self {
            matrix: DMat3::from_axis_angle(axis.normalize(), angle),
        }
    }
}

/// halo 对：ghost 单元从源单元取值
#[derive(Debug, Clone, Copy)]
pub struct HaloPair {
    /// 本地源单元
    pub src_cell: usize,
    /// ghost 目标单元（≥ n_cells）
    pub ghost_cell: usize,
    /// 旋转周期变换编号（None 为平移周期或普通分区边界）
    pub rotation: Option<usize>,
}

/// halo 描述符与交换实现
#[derive(Debug, Clone, Default)]
pub struct HaloExchange {
    /// 交换对
    pub pairs: Vec<HaloPair>,
    /// 旋转周期变换表
    pub rotations: Vec<PeriodicRotation>,
}

impl HaloExchange {
    /// 空 halo（无周期、单进程）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 是否含旋转周期
    pub fn has_rotation(&self) -> bool {
        !self.rotations.is_empty()
    }

    /// 同步标量场的 ghost 单元
    pub fn sync_scalar(&self, values: &mut [f64]) {
        for pair in &self.pairs {
            values[pair.ghost_cell] = values[pair.src_cell];
        }
    }

    /// 同步向量场的 ghost 单元（旋转周期面施加旋转）
    pub fn sync_vector(&self, values: &mut [DVec3]) {
        for pair in &self.pairs {
            let v = values[pair.src_cell];
            values[pair.ghost_cell] = match pair.rotation {
                Some(r) => self.rotations[r].matrix * v,
                None => v,
            };
        }
    }

    /// 同步对称张量场的 ghost 单元（Voigt 顺序 xx, yy, zz, xy, yz, xz）
    pub fn sync_sym_tensor(&self, values: &mut [[f64; 6]]) {
        for pair in &self.pairs {
            let t = values[pair.src_cell];
            values[pair.ghost_cell] = match pair.rotation {
                Some(r) => rotate_sym_tensor(&self.rotations[r].matrix, &t),
                None => t,
            };
        }
    }
}

/// R·T·Rᵀ，T 为 Voigt 对称张量
fn rotate_sym_tensor(rot: &DMat3, t: &[f64; 6]) -> [f64; 6] {
    let m = DMat3::from_cols(
        DVec3::new(t[0], t[3], t[5]),
        DVec3::new(t[3], t[1], t[4]),
        DVec3::new(t[5], t[4], t[2]),
    );
    let r = *rot * m * rot.transpose();
    [
        r.col(0).x,
        r.col(1).y,
        r.col(2).z,
        r.col(1).x,
        r.col(2).y,
        r.col(2).x,
    ]
}
