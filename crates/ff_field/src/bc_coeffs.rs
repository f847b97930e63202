// crates/ff_field/src/bc_coeffs.rs

//! 边界条件系数记录
//!
//! 每个求解变量在每个边界面上的输入规格与输出系数：
//!
//! - 输入（用户 / 界面 / 模型钩子写入）：
//!   - `icodcl`: 整型边界码（0 表示未设置）
//!   - `rcodcl1`: Dirichlet 值 / 参考值 / 仿射截距
//!   - `rcodcl2`: 外部交换系数 / 出口 Courant 数 / 仿射斜率
//!   - `rcodcl3`: 施加通量（Neumann）
//! - 输出（翻译阶段写入，数值核消费）：
//!   - `a`, `b`: 面值重构系数，φ_face = a + b·φ_cell
//!   - `af`, `bf`: 扩散通量系数，Q_face = af + bf·φ_cell
//!   - 对称张量变量另有 `ad`, `bd`（动量方程散度贡献）
//! - 缓存（梯度核按需构建）：`val_f`, `val_f_d` 及限制器版本
//!
//! rcodcl 槽位用 `Option<f64>` 表达"未设置"，分量级部分设置
//! 触发转子/定子与自由滑移的部分覆盖逻辑。
//!
//! 存储为面主序：标量槽位 `f·dim + c`，矩阵槽位
//! `f·dim² + i·dim + j`。

/// 边界条件系数记录
#[derive(Debug, Clone)]
pub struct BcCoeffs {
    /// 变量维度（1 标量 / 3 向量 / 6 对称张量）
    pub dim: usize,
    /// 边界面数
    pub n_b_faces: usize,

    /// 边界码（0 = 未设置）
    pub icodcl: Vec<i16>,
    /// Dirichlet 值 / 参考值 / 仿射截距
    pub rcodcl1: Vec<Option<f64>>,
    /// 外部交换系数 / 出口 Courant 数 / 仿射斜率
    pub rcodcl2: Vec<Option<f64>>,
    /// 施加通量
    pub rcodcl3: Vec<Option<f64>>,

    /// 面值重构系数 a
    pub a: Vec<f64>,
    /// 面值重构系数 b（逐面 dim×dim 块）
    pub b: Vec<f64>,
    /// 扩散通量系数 af
    pub af: Vec<f64>,
    /// 扩散通量系数 bf（逐面 dim×dim 块）
    pub bf: Vec<f64>,

    /// 散度贡献系数 ad（仅对称张量变量）
    pub ad: Option<Vec<f64>>,
    /// 散度贡献系数 bd（仅对称张量变量）
    pub bd: Option<Vec<f64>>,

    /// 缓存：I′ 重构面值
    pub val_f: Option<Vec<f64>>,
    /// 缓存：扩散通量面值
    pub val_f_d: Option<Vec<f64>>,
    /// 缓存：限制器作用下的面值
    pub val_f_lim: Option<Vec<f64>>,
    /// 缓存：限制器作用下的扩散通量面值
    pub val_f_d_lim: Option<Vec<f64>>,
}

impl BcCoeffs {
    /// 分配系数记录（网格连接关系变化时调用一次）
    ///
    /// 输出系数初始化为齐次 Neumann（a=0, b=I, af=0, bf=0），
    /// 首个迭代的梯度计算即可使用。
    pub fn new(n_b_faces: usize, dim: usize) -> Self {
        debug_assert!(matches!(dim, 1 | 3 | 6 | 9), "维度必须为 1/3/6/9");
        let mut b = vec![0.0; n_b_faces * dim * dim];
        for f in 0..n_b_faces {
            for i in 0..dim {
                b[f * dim * dim + i * dim + i] = 1.0;
            }
        }
        Self {
            dim,
            n_b_faces,
            icodcl: vec![0; n_b_faces],
            rcodcl1: vec![None; n_b_faces * dim],
            rcodcl2: vec![None; n_b_faces * dim],
            rcodcl3: vec![None; n_b_faces * dim],
            a: vec![0.0; n_b_faces * dim],
            b,
            af: vec![0.0; n_b_faces * dim],
            bf: vec![0.0; n_b_faces * dim * dim],
            ad: None,
            bd: None,
            val_f: None,
            val_f_d: None,
            val_f_lim: None,
            val_f_d_lim: None,
        }
    }

    /// 为对称张量变量追加散度贡献系数
    pub fn with_divergence_coeffs(mut self) -> Self {
        self.ad = Some(vec![0.0; self.n_b_faces * self.dim]);
        self.bd = Some(vec![0.0; self.n_b_faces * self.dim * self.dim]);
        self
    }

    /// 每外层迭代的重置：全部输入回到"未设置"，缓存失效
    ///
    /// 输出系数保留上一迭代的值——本迭代重构阶段的梯度计算
    /// 仍然消费它们，翻译阶段才整体覆盖。
    pub fn reset(&mut self) {
        self.icodcl.fill(0);
        self.rcodcl1.fill(None);
        self.rcodcl2.fill(None);
        self.rcodcl3.fill(None);
        self.invalidate_cache();
    }

    /// 使面值缓存失效（系数被覆盖时必须调用）
    pub fn invalidate_cache(&mut self) {
        self.val_f = None;
        self.val_f_d = None;
        self.val_f_lim = None;
        self.val_f_d_lim = None;
    }

    // ========== 槽位索引 ==========

    /// rcodcl / a / af 槽位索引
    #[inline]
    pub fn slot(&self, f_id: usize, comp: usize) -> usize {
        f_id * self.dim + comp
    }

    /// b / bf 槽位索引
    #[inline]
    pub fn mat_slot(&self, f_id: usize, i: usize, j: usize) -> usize {
        f_id * self.dim * self.dim + i * self.dim + j
    }

    // ========== 便捷访问 ==========

    /// 某面的 a 系数切片
    #[inline]
    pub fn a_face(&self, f_id: usize) -> &[f64] {
        &self.a[f_id * self.dim..(f_id + 1) * self.dim]
    }

    /// 某面的 b 系数块
    #[inline]
    pub fn b_face(&self, f_id: usize) -> &[f64] {
        &self.b[f_id * self.dim * self.dim..(f_id + 1) * self.dim * self.dim]
    }

    /// 某面的 af 系数切片
    #[inline]
    pub fn af_face(&self, f_id: usize) -> &[f64] {
        &self.af[f_id * self.dim..(f_id + 1) * self.dim]
    }

    /// 某面的 bf 系数块
    #[inline]
    pub fn bf_face(&self, f_id: usize) -> &[f64] {
        &self.bf[f_id * self.dim * self.dim..(f_id + 1) * self.dim * self.dim]
    }

    /// 某面全部分量的 rcodcl1 是否都未设置
    pub fn rcodcl1_all_unset(&self, f_id: usize) -> bool {
        (0..self.dim).all(|c| self.rcodcl1[self.slot(f_id, c)].is_none())
    }

    /// 检查输出系数有限性，返回第一个非有限分量
    pub fn find_non_finite(&self, f_id: usize) -> Option<usize> {
        for c in 0..self.dim {
            if !self.a[self.slot(f_id, c)].is_finite() || !self.af[self.slot(f_id, c)].is_finite()
            {
                return Some(c);
            }
        }
        for i in 0..self.dim {
            for j in 0..self.dim {
                let s = self.mat_slot(f_id, i, j);
                if !self.b[s].is_finite() || !self.bf[s].is_finite() {
                    return Some(i);
                }
            }
        }
        None
    }
}
