//! 运行时错误.

use crate::Idx2d;
use std::path::PathBuf;

/// 插值、读写或体数据加载的运行时错误.
///
/// 关键切片查找失败 ([`crate::KeyLookup::NotFound`]) 和边缘搜索失败都是预期内的结果,
/// 不属于错误.
#[derive(Debug, thiserror::Error)]
pub enum SegError {
    /// 曲线的关键切片不足两个.
    #[error("曲线至少需要两个关键切片, 实际只有 {0} 个")]
    TooFewKeys(usize),

    /// 相邻两个关键切片的点数不一致.
    #[error("关键切片 {first} ({first_len} 个点) 与关键切片 {second} ({second_len} 个点) 点数不一致")]
    CountMismatch {
        /// 前一个关键切片.
        first: usize,
        /// 前一个关键切片的点数.
        first_len: usize,
        /// 后一个关键切片.
        second: usize,
        /// 后一个关键切片的点数.
        second_len: usize,
    },

    /// 给定切片前后缺少关键切片, 无法插值.
    #[error("切片 {0} 前后缺少可用于插值的关键切片")]
    NotInterpolable(usize),

    /// 点的 z 坐标与其所在关键切片不一致.
    #[error("点的 z 坐标 {found} 与所在关键切片 {key} 不一致")]
    ZMismatch {
        /// 关键切片.
        key: usize,
        /// 点实际携带的 z 坐标.
        found: usize,
    },

    /// 关键切片存在但没有点.
    #[error("关键切片 {0} 没有任何点")]
    EmptyKey(usize),

    /// 点坐标非法 (非有限值, 或 z 不是非负整数).
    #[error("非法的点坐标: {0:?}")]
    BadPoint([f64; 3]),

    /// 点云文件头非法.
    #[error("点云文件头非法: {0}")]
    BadHeader(String),

    /// 点云数据内容非法.
    #[error("点云数据非法: {0}")]
    BadCloud(String),

    /// 切片目录缺少 `meta.json`.
    #[error("体数据目录缺少 meta.json: {0}")]
    MissingMeta(PathBuf),

    /// 切片图像个数与元信息不一致.
    #[error("切片数不一致: 期望 {expected}, 实际 {found}")]
    SliceCountMismatch {
        /// 元信息中的切片数.
        expected: usize,
        /// 实际找到的切片数.
        found: usize,
    },

    /// 切片图像形状与元信息不一致.
    #[error("切片形状不一致: 期望 {expected:?}, 实际 {found:?}")]
    ShapeMismatch {
        /// 期望的 `(h, w)`.
        expected: Idx2d,
        /// 实际的 `(h, w)`.
        found: Idx2d,
    },

    /// 切片索引越界.
    #[error("切片索引 {index} 越界 (共 {len} 个切片)")]
    SliceOutOfRange {
        /// 请求的切片.
        index: usize,
        /// 切片总数.
        len: usize,
    },

    /// 无法识别的体数据路径.
    #[error("不支持的体数据格式: {0}")]
    UnsupportedVolume(PathBuf),

    /// 分割目录中既没有 `pointset.json` 也没有 `pointset.vcps`.
    #[error("找不到分割 `{0}`")]
    SegmentationNotFound(String),

    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON 读写错误.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// 切片图像解码错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// npy 文件读取错误.
    #[error(transparent)]
    Npy(#[from] ndarray_npy::ReadNpyError),

    /// nifti 文件读取错误.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 数组形状错误.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// 时间戳格式化错误.
    #[error(transparent)]
    Time(#[from] time::error::Format),
}

/// 插值 / 读写运行时结果.
pub type SegResult<T> = Result<T, SegError>;
