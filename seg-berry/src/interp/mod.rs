//! 插值引擎.
//!
//! 两种策略实现同一个 [`SliceInterpolator`] 接口, 由 [`InterpolationMode`] 选择:
//!
//! 1. [`LinearInterpolator`]: 纯线性插值, 切片之间没有任何状态.
//! 2. [`EdgeGuidedInterpolator`]: 在线性位置基础上沿法线搜索图像边缘.
//!
//! 完整插值 ([`interpolate_full`]) 和单切片预览 ([`interpolate_at`])
//! 都按切片升序推进, 每张非关键切片的结果成为下一张切片的参考.

mod full;
mod guided;
mod linear;

pub use full::{interpolate_at, interpolate_full};
pub use guided::EdgeGuidedInterpolator;
pub use linear::{interpolate_point, interpolate_points, LinearInterpolator};

use crate::consts::edge as defaults;
use crate::{Point, SegResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 插值单张非关键切片所需的全部输入.
#[derive(Copy, Clone, Debug)]
pub struct SliceState<'a> {
    /// 目标切片, 严格位于两个关键切片之间.
    pub slice: usize,

    /// 前一个关键切片上的原始点.
    pub prev_key: &'a [Point],

    /// 滚动参考: 紧邻目标切片的前一张切片的 (已修正) 结果.
    /// 对于关键切片后的第一张切片, 它就是 `prev_key`.
    pub reference: &'a [Point],

    /// 后一个关键切片上的原始点. 推进过程中从不替换.
    pub next_key: &'a [Point],
}

/// 单张切片插值策略.
pub trait SliceInterpolator {
    /// 重建 `state.slice` 上的点, 顺序与关键切片一致.
    fn interpolate_slice(&mut self, state: &SliceState<'_>) -> SegResult<Vec<Point>>;
}

/// 插值方式.
pub enum InterpolationMode<'v> {
    /// 线性插值.
    Linear(LinearInterpolator),

    /// 边缘引导插值.
    EdgeGuided(EdgeGuidedInterpolator<'v>),
}

impl InterpolationMode<'_> {
    /// 线性插值.
    #[inline]
    pub fn linear() -> Self {
        Self::Linear(LinearInterpolator)
    }

    /// 是否为线性插值.
    #[inline]
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Linear(_))
    }
}

impl SliceInterpolator for InterpolationMode<'_> {
    #[inline]
    fn interpolate_slice(&mut self, state: &SliceState<'_>) -> SegResult<Vec<Point>> {
        match self {
            Self::Linear(m) => m.interpolate_slice(state),
            Self::EdgeGuided(m) => m.interpolate_slice(state),
        }
    }
}

/// 边缘引导插值的参数.
///
/// 可以从 JSON 文件加载, 缺省字段取默认值.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeGuideConfig {
    /// canny 低阈值.
    pub low_threshold: f32,

    /// canny 高阈值.
    pub high_threshold: f32,

    /// 边缘图膨胀半径. 0 表示不膨胀.
    pub dilation: u8,

    /// 沿法线单方向最多搜索的步数.
    pub edge_search_limit: u32,

    /// 每一步的长度 (像素). 修正量不会超过 `edge_search_limit * search_step`.
    pub search_step: f64,

    /// 边缘强度判定门限.
    pub edge_cutoff: u8,
}

impl Default for EdgeGuideConfig {
    fn default() -> Self {
        Self {
            low_threshold: defaults::LOW_THRESHOLD,
            high_threshold: defaults::HIGH_THRESHOLD,
            dilation: 0,
            edge_search_limit: defaults::SEARCH_LIMIT,
            search_step: defaults::SEARCH_STEP,
            edge_cutoff: defaults::CUTOFF,
        }
    }
}

impl EdgeGuideConfig {
    /// 从 JSON 文件加载.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SegResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// 修正量上限 (像素).
    #[inline]
    pub fn max_offset(&self) -> f64 {
        self.edge_search_limit as f64 * self.search_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_and_partial_json() {
        let cfg: EdgeGuideConfig = serde_json::from_str(r#"{"edge_search_limit": 4}"#).unwrap();
        assert_eq!(cfg.edge_search_limit, 4);
        assert_eq!(cfg.low_threshold, EdgeGuideConfig::default().low_threshold);
        assert_eq!(cfg.max_offset(), 4.0);
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.json");
        let cfg = EdgeGuideConfig {
            dilation: 2,
            ..Default::default()
        };
        std::fs::write(&path, serde_json::to_string(&cfg).unwrap()).unwrap();
        assert_eq!(EdgeGuideConfig::from_json_file(&path).unwrap(), cfg);
        assert!(EdgeGuideConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
