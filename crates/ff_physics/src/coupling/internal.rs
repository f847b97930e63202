// crates/ff_physics/src/coupling/internal.rs

//! 内部耦合：定位器、交换原语、矩阵贡献与 Robin 覆盖
//!
//! 定位器把每个本地耦合面映射到对侧供体单元与配对面，由并行
//! 定位交换层维护（多进程时经由不透明的二进制消息；单进程退化
//! 为本地索引表）。
//!
//! 翻译完成后的覆盖步骤把耦合面的系数替换为 Robin 形式，参考值
//! 取供体侧 I′ 重构值——这使得非平面界面上的耦合仍保持一阶一致。

use ff_field::Field;
use ff_foundation::{FfError, FfResult};
use ff_mesh::Mesh;

use crate::boundary::coeffs;
use crate::boundary::reconstruct::{self, TimeLevel};

/// 矩阵装配贡献（全局行列号）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixContribution {
    /// 全局行号（接收单元）
    pub row: u64,
    /// 全局列号（供体单元）
    pub col: u64,
    /// 系数值
    pub value: f64,
}

/// 内部耦合定位器与交换
#[derive(Debug, Clone, Default)]
pub struct InternalCoupling {
    /// 本地耦合面（边界面号）
    pub coupled_faces: Vec<usize>,
    /// 每个耦合面的供体单元
    pub donor_cells: Vec<usize>,
    /// 每个耦合面的配对面（对侧边界面号）
    pub paired_faces: Vec<usize>,
}

impl InternalCoupling {
    /// 从 (本地面, 供体单元, 配对面) 三元组建立
    pub fn from_triplets(triplets: &[(usize, usize, usize)]) -> Self {
        Self {
            coupled_faces: triplets.iter().map(|t| t.0).collect(),
            donor_cells: triplets.iter().map(|t| t.1).collect(),
            paired_faces: triplets.iter().map(|t| t.2).collect(),
        }
    }

    /// 耦合面数
    #[inline]
    pub fn n_coupled(&self) -> usize {
        self.coupled_faces.len()
    }

    /// 逐边界面的耦合标记（分类器输入）
    pub fn coupled_mask(&self, n_b_faces: usize) -> Vec<bool> {
        let mut mask = vec![false; n_b_faces];
        for &f in &self.coupled_faces {
            mask[f] = true;
        }
        mask
    }

    /// 按供体单元号交换：发送每个本地面邻单元的值，收到供体单元的值
    pub fn exchange_by_cell_id(&self, cell_values: &[f64]) -> Vec<f64> {
        self.donor_cells.iter().map(|&c| cell_values[c]).collect()
    }

    /// 按配对面号交换：发送本地面值，收到配对面的值
    pub fn exchange_by_face_id(&self, face_values: &[f64]) -> Vec<f64> {
        self.paired_faces.iter().map(|&f| face_values[f]).collect()
    }

    /// 耦合交换系数：h = ν_f / d_b（基于面的扩散系数）
    pub fn exchange_coefficients(&self, mesh: &Mesh, diffusivity: &[f64]) -> Vec<f64> {
        self.coupled_faces
            .iter()
            .map(|&f| {
                let c = mesh.b_face_cells[f];
                diffusivity[c] / mesh.b_dist[f]
            })
            .collect()
    }

    /// 矩阵贡献：接收单元到供体单元的非对角连接，权重 −h·S
    pub fn matrix_contributions(
        &self,
        mesh: &Mesh,
        h_coeffs: &[f64],
    ) -> FfResult<Vec<MatrixContribution>> {
        FfError::check_size("h_coeffs", self.n_coupled(), h_coeffs.len())?;

        let mut out = Vec::with_capacity(self.n_coupled());
        for (i, &f_id) in self.coupled_faces.iter().enumerate() {
            let receiver = mesh.b_face_cells[f_id];
            let donor = self.donor_cells[i];
            out.push(MatrixContribution {
                row: mesh.global_cell_num[receiver],
                col: mesh.global_cell_num[donor],
                value: -h_coeffs[i] * mesh.b_face_surf[f_id],
            });
        }
        Ok(out)
    }

    /// 翻译后覆盖：耦合面的系数替换为 Robin 形式
    ///
    /// 参考值为供体侧 I′ 重构值（经配对面交换）。仅标量字段；
    /// 向量与张量字段的界面耦合逐分量走同一路径。
    pub fn apply_robin_override(
        &self,
        mesh: &Mesh,
        field: &mut Field,
        h_coeffs: &[f64],
        hint_diffusivity: &[f64],
    ) -> FfResult<()> {
        FfError::check_size("h_coeffs", self.n_coupled(), h_coeffs.len())?;
        if field.dim != 1 {
            return Err(FfError::NotImplemented {
                feature: format!("内部耦合覆盖仅支持标量字段（'{}'）", field.name),
            });
        }

        // 全部边界面的 I′ 值（用本字段当前系数）
        let (bc_a, bc_b) = {
            let bc = field.bc()?;
            (bc.a.clone(), bc.b.clone())
        };
        let val_ip = reconstruct::scalar_at_iprime(mesh, field, &bc_a, &bc_b, TimeLevel::Current)?;

        // 供体侧 I′ 值经配对面取回
        let donor_ip = self.exchange_by_face_id(&val_ip);

        let bc = field.bc_mut()?;
        for (i, &f_id) in self.coupled_faces.iter().enumerate() {
            let c = mesh.b_face_cells[f_id];
            let hint = hint_diffusivity[c] / mesh.b_dist[f_id];
            let out = coeffs::dirichlet_scalar(donor_ip[i], hint, Some(h_coeffs[i]));
            bc.a[f_id] = out.a;
            bc.b[f_id] = out.b;
            bc.af[f_id] = out.af;
            bc.bf[f_id] = out.bf;
        }
        bc.invalidate_cache();
        Ok(())
    }
}
