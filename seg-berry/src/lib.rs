#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 在 3D 体数据 (如 CT / 显微扫描) 的少量关键切片上标注分割曲线,
//! 然后自动重建两两关键切片之间每一张切片上的曲线.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 交互界面 (窗口, 鼠标事件, 平移缩放等) 不在本 crate 范围内.
//!   本 crate 只提供界面层会调用的数据模型、插值引擎与文件读写.
//! 2. 插值引擎从不修改曲线本身, 它只读取曲线快照并生成新的稠密点云.
//! 3. 体数据的底层存储被视为可随机访问的三维数组, 不关心其缓存细节.
//!
//! # 功能概览
//!
//! ### 曲线模型与合法性检查 ✅
//!
//! 关键切片 -> 有序点列表. 不同关键切片的同一位置的点相互对应,
//! 因此插值要求相邻关键切片的点数一致.
//!
//! 实现位于 `seg-berry/src/curve`.
//!
//! ### 几何工具 ✅
//!
//! 平方距离, 定长归一化, 关于某点的反射, 平面内垂直向量, 最近点搜索.
//!
//! 实现位于 `seg-berry/src/geometry.rs`.
//!
//! ### 边缘算子 ✅
//!
//! 对切片做 canny 边缘检测 (可选膨胀), 得到边缘强度图.
//! 任何满足 [`edge::EdgeOperator`] 约定的算子都可以替换默认实现.
//!
//! 实现位于 `seg-berry/src/edge.rs`.
//!
//! ### 插值引擎 ✅
//!
//! 1. 线性插值: 每个点、每张切片彼此独立.
//! 2. 边缘引导插值: 沿法线方向双向搜索图像边缘, 两侧都找到时取中点,
//!   否则保留线性位置. 切片按从前一关键切片到后一关键切片的顺序逐张推进,
//!   每张修正后的切片作为下一张切片的参考.
//!
//! 实现位于 `seg-berry/src/interp`.
//!
//! ### 点云读写 ✅
//!
//! 有序二进制点云 (`pointset.vcps`), 关键切片 JSON (`pointset.json`),
//! 以及元信息 (`meta.json`). 从稠密点云恢复关键切片是尽力而为的启发式,
//! 有 JSON 时总是优先使用 JSON.
//!
//! 实现位于 `seg-berry/src/cloud`.
//!
//! ### 体数据与分割目录 ✅
//!
//! 切片图像目录 / npy / nifti 三种体数据来源, 以及调用方持有的体数据缓存.
//! 分割目录的保存与加载流程.
//!
//! 实现位于 `seg-berry/src/volume` 和 `seg-berry/src/package.rs`.

/// 二维索引 `(h, w)`.
pub type Idx2d = (usize, usize);

/// 三维索引 / 形状 `(z, h, w)`.
pub type Idx3d = (usize, usize, usize);

/// 高精度平面坐标 / 向量 `(x, y)`.
pub type Idx2dF = (f64, f64);

pub mod consts;

mod error;

pub use error::{SegError, SegResult};

pub mod geometry;

pub use geometry::Point;

pub mod edge;

pub mod curve;

pub use curve::{Curve, KeyLookup};

pub mod segmentation;

pub use segmentation::{CurveId, Segmentation};

pub mod interp;

pub mod cloud;

pub use cloud::DenseCloud;

pub mod volume;

pub use volume::{SliceSource, Volume, VolumeCache};

pub mod package;

pub mod prelude;
