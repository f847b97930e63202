// crates/ff_mesh/src/mesh.rs

//! 只读网格视图
//!
//! 单元（含 ghost 层）、内部面、边界面与顶点。核心只通过共享引用
//! 读取本结构，所有数组在一次计算中不可变。
//!
//! 边界面几何约定：
//! - `b_face_u_normal`: 单位外法向
//! - `b_dist`: 单元中心到面的距离（法向投影）
//! - `diipb`: 单元中心 I 到投影点 I′ 的偏移向量，
//!   I′ 为 I 在面上的垂足，用于二阶一致的边界通量重构

use glam::DVec3;

use ff_foundation::{FfError, FfResult};

use crate::halo::HaloExchange;

/// 只读网格
#[derive(Debug, Clone)]
pub struct Mesh {
    /// 本地单元数
    pub n_cells: usize,
    /// 含 ghost 层的单元数
    pub n_cells_ext: usize,
    /// 单元体积 [m³]，长度 `n_cells_ext`
    pub cell_vol: Vec<f64>,
    /// 单元中心，长度 `n_cells_ext`
    pub cell_cen: Vec<DVec3>,

    /// 内部面两侧单元 (i, j)，面法向从 i 指向 j
    pub i_face_cells: Vec<(usize, usize)>,
    /// 内部面面积 [m²]
    pub i_face_surf: Vec<f64>,
    /// 内部面单位法向
    pub i_face_u_normal: Vec<DVec3>,
    /// 内部面形心
    pub i_face_cog: Vec<DVec3>,
    /// 内部面两侧单元中心距离 [m]
    pub i_dist: Vec<f64>,

    /// 边界面所属单元
    pub b_face_cells: Vec<usize>,
    /// 边界面单位外法向
    pub b_face_u_normal: Vec<DVec3>,
    /// 边界面面积 [m²]
    pub b_face_surf: Vec<f64>,
    /// 边界面形心
    pub b_face_cog: Vec<DVec3>,
    /// 单元中心到边界面的距离 [m]
    pub b_dist: Vec<f64>,
    /// 单元中心到投影点 I′ 的偏移向量
    pub diipb: Vec<DVec3>,

    /// 顶点坐标
    pub vtx_coord: Vec<DVec3>,
    /// 边界面到顶点的 CSR 索引
    pub b_face_vtx_idx: Vec<usize>,
    /// 边界面顶点列表（CSR 数据）
    pub b_face_vtx: Vec<usize>,

    /// 单元-单元邻接 CSR 索引（经内部面）
    pub cell_cells_idx: Vec<usize>,
    /// 单元-单元邻接（CSR 数据）
    pub cell_cells: Vec<usize>,

    /// 单元全局编号（并行与序列化集合操作用）
    pub global_cell_num: Vec<u64>,
    /// 顶点全局编号
    pub global_vtx_num: Vec<u64>,

    /// halo 描述符
    pub halo: HaloExchange,
}

impl Mesh {
    /// 边界面数
    #[inline]
    pub fn n_b_faces(&self) -> usize {
        self.b_face_cells.len()
    }

    /// 内部面数
    #[inline]
    pub fn n_i_faces(&self) -> usize {
        self.i_face_cells.len()
    }

    /// 顶点数
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vtx_coord.len()
    }

    /// 某单元的邻接单元
    #[inline]
    pub fn cell_neighbors(&self, c_id: usize) -> &[usize] {
        &self.cell_cells[self.cell_cells_idx[c_id]..self.cell_cells_idx[c_id + 1]]
    }

    /// 某边界面的顶点
    #[inline]
    pub fn b_face_vertices(&self, f_id: usize) -> &[usize] {
        &self.b_face_vtx[self.b_face_vtx_idx[f_id]..self.b_face_vtx_idx[f_id + 1]]
    }

    /// 拓扑与几何自检
    ///
    /// 检查数组长度一致、法向单位化、距离为正。
    pub fn validate(&self) -> FfResult<()> {
        FfError::check_size("cell_vol", self.n_cells_ext, self.cell_vol.len())?;
        FfError::check_size("cell_cen", self.n_cells_ext, self.cell_cen.len())?;

        let n_b = self.n_b_faces();
        FfError::check_size("b_face_u_normal", n_b, self.b_face_u_normal.len())?;
        FfError::check_size("b_face_surf", n_b, self.b_face_surf.len())?;
        FfError::check_size("b_face_cog", n_b, self.b_face_cog.len())?;
        FfError::check_size("b_dist", n_b, self.b_dist.len())?;
        FfError::check_size("diipb", n_b, self.diipb.len())?;

        for (f_id, n) in self.b_face_u_normal.iter().enumerate() {
            if (n.length_squared() - 1.0).abs() > 1e-10 {
                return Err(FfError::invalid_mesh(format!(
                    "边界面 {f_id} 法向未单位化，模长 {}",
                    n.length()
                )));
            }
            if self.b_dist[f_id] <= 0.0 {
                return Err(FfError::invalid_mesh(format!(
                    "边界面 {f_id} 的面-单元距离非正: {}",
                    self.b_dist[f_id]
                )));
            }
        }

        for (f_id, &(i, j)) in self.i_face_cells.iter().enumerate() {
            if i >= self.n_cells_ext || j >= self.n_cells_ext {
                return Err(FfError::invalid_mesh(format!(
                    "内部面 {f_id} 引用越界单元 ({i}, {j})"
                )));
            }
        }

        for &c in &self.b_face_cells {
            if c >= self.n_cells {
                return Err(FfError::invalid_mesh(format!("边界面引用越界单元 {c}")));
            }
        }

        Ok(())
    }

    /// 从内部面连接表构建单元-单元 CSR 邻接
    pub(crate) fn build_cell_adjacency(
        n_cells: usize,
        i_face_cells: &[(usize, usize)],
    ) -> (Vec<usize>, Vec<usize>) {
        let mut degree = vec![0usize; n_cells];
        for &(i, j) in i_face_cells {
            if i < n_cells {
                degree[i] += 1;
            }
            if j < n_cells {
                degree[j] += 1;
            }
        }

        let mut idx = vec![0usize; n_cells + 1];
        for c in 0..n_cells {
            idx[c + 1] = idx[c] + degree[c];
        }

        let mut data = vec![0usize; idx[n_cells]];
        let mut cursor = idx.clone();
        for &(i, j) in i_face_cells {
            if i < n_cells {
                data[cursor[i]] = j;
                cursor[i] += 1;
            }
            if j < n_cells {
                data[cursor[j]] = i;
                cursor[j] += 1;
            }
        }

        (idx, data)
    }
}
