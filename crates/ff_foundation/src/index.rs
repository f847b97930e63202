// crates/ff_foundation/src/index.rs

//! 强类型网格索引
//!
//! 单元、面、顶点各自使用独立的 newtype 索引，编译期防止混用。
//! 网格在一次计算中不可变，因此不需要代际验证，索引即普通 `usize`。

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_index {
    ($(#[$doc:meta])* $name:ident, $label:expr) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[repr(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// 创建索引
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// 取出底层 usize
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(index: $name) -> usize {
                index.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

define_index!(
    /// 单元索引
    CellIndex,
    "Cell"
);

define_index!(
    /// 边界面索引
    FaceIndex,
    "Face"
);

define_index!(
    /// 顶点索引
    VertexIndex,
    "Vertex"
);
