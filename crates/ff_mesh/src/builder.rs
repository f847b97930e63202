// crates/ff_mesh/src/builder.rs

//! 测试用结构化网格构造器
//!
//! 生成轴对齐长方体的六面体网格。单元正交，投影点 I′ 与面形心
//! 重合（`diipb = b_dist · n`），适合验证边界系数与时间步控制。
//! 生产计算的网格一律由前处理器导入。

use glam::DVec3;

use crate::halo::HaloExchange;
use crate::mesh::Mesh;

/// 结构化长方体网格构造器
#[derive(Debug, Clone)]
pub struct CartesianBuilder {
    nx: usize,
    ny: usize,
    nz: usize,
    lx: f64,
    ly: f64,
    lz: f64,
}

impl CartesianBuilder {
    /// 按单元数创建，默认单位立方体域
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        assert!(nx >= 1 && ny >= 1 && nz >= 1, "每个方向至少一个单元");
        Self {
            nx,
            ny,
            nz,
            lx: 1.0,
            ly: 1.0,
            lz: 1.0,
        }
    }

    /// 设置域尺寸
    pub fn with_extent(mut self, lx: f64, ly: f64, lz: f64) -> Self {
        self.lx = lx;
        self.ly = ly;
        self.lz = lz;
        self
    }

    /// 单元线性编号
    #[inline]
    fn cell_id(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.nx * (j + self.ny * k)
    }

    /// 顶点线性编号
    #[inline]
    fn vtx_id(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.nx + 1) * (j + (self.ny + 1) * k)
    }

    /// 构建网格
    pub fn build(self) -> Mesh {
        let (nx, ny, nz) = (self.nx, self.ny, self.nz);
        let dx = self.lx / nx as f64;
        let dy = self.ly / ny as f64;
        let dz = self.lz / nz as f64;
        let n_cells = nx * ny * nz;
        let vol = dx * dy * dz;

        // 遍历顺序与 cell_id 编号一致（i 最内层）
        let mut cell_cen = Vec::with_capacity(n_cells);
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    cell_cen.push(DVec3::new(
                        (i as f64 + 0.5) * dx,
                        (j as f64 + 0.5) * dy,
                        (k as f64 + 0.5) * dz,
                    ));
                }
            }
        }

        // 顶点
        let mut vtx_coord = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    vtx_coord.push(DVec3::new(i as f64 * dx, j as f64 * dy, k as f64 * dz));
                }
            }
        }

        // 内部面
        let mut i_face_cells = Vec::new();
        let mut i_face_u_normal = Vec::new();
        let mut i_face_cog = Vec::new();
        let mut i_face_surf = Vec::new();
        let mut i_dist = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let c = self.cell_id(i, j, k);
                    let cen = DVec3::new(
                        (i as f64 + 0.5) * dx,
                        (j as f64 + 0.5) * dy,
                        (k as f64 + 0.5) * dz,
                    );
                    if i + 1 < nx {
                        i_face_cells.push((c, self.cell_id(i + 1, j, k)));
                        i_face_u_normal.push(DVec3::X);
                        i_face_cog.push(cen + DVec3::X * (0.5 * dx));
                        i_face_surf.push(dy * dz);
                        i_dist.push(dx);
                    }
                    if j + 1 < ny {
                        i_face_cells.push((c, self.cell_id(i, j + 1, k)));
                        i_face_u_normal.push(DVec3::Y);
                        i_face_cog.push(cen + DVec3::Y * (0.5 * dy));
                        i_face_surf.push(dx * dz);
                        i_dist.push(dy);
                    }
                    if k + 1 < nz {
                        i_face_cells.push((c, self.cell_id(i, j, k + 1)));
                        i_face_u_normal.push(DVec3::Z);
                        i_face_cog.push(cen + DVec3::Z * (0.5 * dz));
                        i_face_surf.push(dx * dy);
                        i_dist.push(dz);
                    }
                }
            }
        }

        // 边界面
        let mut b_face_cells = Vec::new();
        let mut b_face_u_normal = Vec::new();
        let mut b_face_surf = Vec::new();
        let mut b_face_cog = Vec::new();
        let mut b_dist = Vec::new();
        let mut diipb = Vec::new();
        let mut b_face_vtx_idx = vec![0usize];
        let mut b_face_vtx = Vec::new();

        let mut push_face = |cells: usize,
                             normal: DVec3,
                             surf: f64,
                             cog: DVec3,
                             dist: f64,
                             verts: [usize; 4]| {
            b_face_cells.push(cells);
            b_face_u_normal.push(normal);
            b_face_surf.push(surf);
            b_face_cog.push(cog);
            b_dist.push(dist);
            diipb.push(normal * dist);
            b_face_vtx.extend_from_slice(&verts);
            b_face_vtx_idx.push(b_face_vtx.len());
        };

        for k in 0..nz {
            for j in 0..ny {
                // x- / x+ 侧面
                let c0 = self.cell_id(0, j, k);
                push_face(
                    c0,
                    -DVec3::X,
                    dy * dz,
                    DVec3::new(0.0, (j as f64 + 0.5) * dy, (k as f64 + 0.5) * dz),
                    0.5 * dx,
                    [
                        self.vtx_id(0, j, k),
                        self.vtx_id(0, j + 1, k),
                        self.vtx_id(0, j + 1, k + 1),
                        self.vtx_id(0, j, k + 1),
                    ],
                );
                let c1 = self.cell_id(nx - 1, j, k);
                push_face(
                    c1,
                    DVec3::X,
                    dy * dz,
                    DVec3::new(self.lx, (j as f64 + 0.5) * dy, (k as f64 + 0.5) * dz),
                    0.5 * dx,
                    [
                        self.vtx_id(nx, j, k),
                        self.vtx_id(nx, j + 1, k),
                        self.vtx_id(nx, j + 1, k + 1),
                        self.vtx_id(nx, j, k + 1),
                    ],
                );
            }
        }
        for k in 0..nz {
            for i in 0..nx {
                let c0 = self.cell_id(i, 0, k);
                push_face(
                    c0,
                    -DVec3::Y,
                    dx * dz,
                    DVec3::new((i as f64 + 0.5) * dx, 0.0, (k as f64 + 0.5) * dz),
                    0.5 * dy,
                    [
                        self.vtx_id(i, 0, k),
                        self.vtx_id(i + 1, 0, k),
                        self.vtx_id(i + 1, 0, k + 1),
                        self.vtx_id(i, 0, k + 1),
                    ],
                );
                let c1 = self.cell_id(i, ny - 1, k);
                push_face(
                    c1,
                    DVec3::Y,
                    dx * dz,
                    DVec3::new((i as f64 + 0.5) * dx, self.ly, (k as f64 + 0.5) * dz),
                    0.5 * dy,
                    [
                        self.vtx_id(i, ny, k),
                        self.vtx_id(i + 1, ny, k),
                        self.vtx_id(i + 1, ny, k + 1),
                        self.vtx_id(i, ny, k + 1),
                    ],
                );
            }
        }
        for j in 0..ny {
            for i in 0..nx {
                let c0 = self.cell_id(i, j, 0);
                push_face(
                    c0,
                    -DVec3::Z,
                    dx * dy,
                    DVec3::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy, 0.0),
                    0.5 * dz,
                    [
                        self.vtx_id(i, j, 0),
                        self.vtx_id(i + 1, j, 0),
                        self.vtx_id(i + 1, j + 1, 0),
                        self.vtx_id(i, j + 1, 0),
                    ],
                );
                let c1 = self.cell_id(i, j, nz - 1);
                push_face(
                    c1,
                    DVec3::Z,
                    dx * dy,
                    DVec3::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy, self.lz),
                    0.5 * dz,
                    [
                        self.vtx_id(i, j, nz),
                        self.vtx_id(i + 1, j, nz),
                        self.vtx_id(i + 1, j + 1, nz),
                        self.vtx_id(i, j + 1, nz),
                    ],
                );
            }
        }

        let (cell_cells_idx, cell_cells) = Mesh::build_cell_adjacency(n_cells, &i_face_cells);

        let global_cell_num = (1..=n_cells as u64).collect();
        let global_vtx_num = (1..=vtx_coord.len() as u64).collect();

        Mesh {
            n_cells,
            n_cells_ext: n_cells,
            cell_vol: vec![vol; n_cells],
            cell_cen,
            i_face_cells,
            i_face_surf,
            i_face_u_normal,
            i_face_cog,
            i_dist,
            b_face_cells,
            b_face_u_normal,
            b_face_surf,
            b_face_cog,
            b_dist,
            diipb,
            vtx_coord,
            b_face_vtx_idx,
            b_face_vtx,
            cell_cells_idx,
            cell_cells,
            global_cell_num,
            global_vtx_num,
            halo: HaloExchange::empty(),
        }
    }
}
