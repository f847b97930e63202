// crates/ff_physics/src/ale.rs

//! ALE 网格运动的顶点位移记账
//!
//! 网格位移字段携带逐顶点"已施加"标志，每外层迭代重置；
//! 未被标记的顶点回落到初始坐标偏移。经典路径的网格速度
//! 作为求解变量走主翻译循环（见 boundary::translate）。

use glam::DVec3;

use ff_foundation::{FfError, FfResult};
use ff_mesh::Mesh;

/// ALE 顶点位移状态
#[derive(Debug, Clone)]
pub struct AleVertexState {
    /// 初始顶点坐标
    pub initial_coords: Vec<DVec3>,
    /// 当前位移
    pub displacement: Vec<DVec3>,
    /// 本迭代是否被施加
    pub imposed: Vec<bool>,
}

impl AleVertexState {
    /// 从网格初始坐标创建
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let n = mesh.n_vertices();
        Self {
            initial_coords: mesh.vtx_coord.clone(),
            displacement: vec![DVec3::ZERO; n],
            imposed: vec![false; n],
        }
    }

    /// 顶点数
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.initial_coords.len()
    }

    /// 每外层迭代重置"已施加"标志
    pub fn reset_imposed(&mut self) {
        self.imposed.fill(false);
    }

    /// 施加某顶点的位移
    pub fn impose(&mut self, v_id: usize, disp: DVec3) -> FfResult<()> {
        FfError::check_index("Vertex", v_id, self.n_vertices())?;
        self.displacement[v_id] = disp;
        self.imposed[v_id] = true;
        Ok(())
    }

    /// 对某边界面的全部顶点施加同一位移
    pub fn impose_face(&mut self, mesh: &Mesh, f_id: usize, disp: DVec3) -> FfResult<()> {
        FfError::check_index("Face", f_id, mesh.n_b_faces())?;
        for &v_id in mesh.b_face_vertices(f_id) {
            self.impose(v_id, disp)?;
        }
        Ok(())
    }

    /// 迭代收口：未被施加的顶点回落到初始坐标偏移（零位移）
    pub fn finalize_iteration(&mut self) {
        for v_id in 0..self.n_vertices() {
            if !self.imposed[v_id] {
                self.displacement[v_id] = DVec3::ZERO;
            }
        }
    }

    /// 当前顶点坐标
    pub fn current_coords(&self, v_id: usize) -> DVec3 {
        self.initial_coords[v_id] + self.displacement[v_id]
    }
}
