//! 边缘引导插值.
//!
//! 每个点先按线性方式估计 (起点是滚动参考而不是前一个关键切片),
//! 再沿估计的法线方向双向搜索边缘. 两个方向都找到边缘时取二者中点,
//! 否则保留线性位置.

use super::linear::interpolate_points;
use super::{EdgeGuideConfig, SliceInterpolator, SliceState};
use crate::edge::{CannyEdges, EdgeMap, EdgeOperator};
use crate::geometry::{invert, is_zero, midpoint, normalize, offset, perpendicular, pixel_of};
use crate::volume::SliceSource;
use crate::{Idx2dF, Point, SegError, SegResult};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// 边缘引导插值策略.
///
/// 同一切片的边缘图只计算一次, 在该对象的生命周期内缓存.
pub struct EdgeGuidedInterpolator<'v> {
    volume: &'v dyn SliceSource,
    edges: Box<dyn EdgeOperator + 'v>,
    config: EdgeGuideConfig,
    cache: HashMap<usize, EdgeMap>,
}

impl<'v> EdgeGuidedInterpolator<'v> {
    /// 使用 canny 算子, 参数取自 `config`.
    pub fn new(volume: &'v dyn SliceSource, config: EdgeGuideConfig) -> Self {
        let canny = CannyEdges::new(config.low_threshold, config.high_threshold, config.dilation)
            .with_cutoff(config.edge_cutoff);
        Self::with_operator(volume, canny, config)
    }

    /// 使用自定义边缘算子. `config` 中的 canny 参数被忽略.
    pub fn with_operator<E>(volume: &'v dyn SliceSource, edges: E, config: EdgeGuideConfig) -> Self
    where
        E: EdgeOperator + 'v,
    {
        Self {
            volume,
            edges: Box::new(edges),
            config,
            cache: HashMap::new(),
        }
    }

    /// 当前参数.
    #[inline]
    pub fn config(&self) -> &EdgeGuideConfig {
        &self.config
    }

    /// 已缓存边缘图的切片数.
    #[inline]
    pub fn cached_slices(&self) -> usize {
        self.cache.len()
    }

    /// 清空边缘图缓存.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// 获取 (必要时计算) 切片 `slice` 的边缘图.
    fn edge_map(&mut self, slice: usize) -> SegResult<&EdgeMap> {
        match self.cache.entry(slice) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let len = self.volume.len_z();
                if slice >= len {
                    return Err(SegError::SliceOutOfRange { index: slice, len });
                }
                let image = self.volume.slice_f32(slice)?;
                Ok(e.insert(self.edges.detect(image.view())))
            }
        }
    }
}

impl SliceInterpolator for EdgeGuidedInterpolator<'_> {
    fn interpolate_slice(&mut self, state: &SliceState<'_>) -> SegResult<Vec<Point>> {
        let mut points = interpolate_points(state.slice, state.reference, state.next_key);
        if points.len() < 2 {
            return Ok(points);
        }
        let cfg = self.config;
        let map = self.edge_map(state.slice)?;

        let adjusted: Vec<Option<Idx2dF>> = (0..points.len())
            .map(|i| {
                let n = normal_at(&points, i, cfg.search_step)?;
                let origin = points[i].xy();
                let fwd = search_edge(map, origin, n, cfg.edge_search_limit)?;
                let back = search_edge(map, origin, (-n.0, -n.1), cfg.edge_search_limit)?;
                Some(midpoint(fwd, back))
            })
            .collect();

        let mut snapped = 0;
        for (p, a) in points.iter_mut().zip(adjusted) {
            if let Some(xy) = a {
                *p = p.with_xy(xy);
                snapped += 1;
            }
        }
        log::trace!("slice {}: {snapped}/{} points snapped", state.slice, points.len());
        Ok(points)
    }
}

/// 第 `i` 个点处的法线方向, 长度为 `magnitude`.
///
/// 取指向两个相邻点的单位向量之和. 端点处用唯一相邻点关于该点的对称点作为另一个相邻点.
/// 和为零向量 (三点共线) 时使用切线的垂直方向. 没有可用方向时返回 `None`.
fn normal_at(points: &[Point], i: usize, magnitude: f64) -> Option<Idx2dF> {
    let p = &points[i];
    let (a, b) = match (i.checked_sub(1).map(|j| &points[j]), points.get(i + 1)) {
        (Some(a), Some(b)) => (*a, *b),
        (None, Some(b)) => (invert(b, p), *b),
        (Some(a), None) => (*a, invert(a, p)),
        (None, None) => return None,
    };
    let u1 = normalize(a.xy(), p.xy(), 1.0);
    let u2 = normalize(b.xy(), p.xy(), 1.0);
    let mut n = (u1.0 + u2.0, u1.1 + u2.1);
    if n.0.hypot(n.1) < 1e-9 {
        n = perpendicular(if is_zero(u1) { u2 } else { u1 });
    }
    let n = normalize(n, (0.0, 0.0), magnitude);
    (!is_zero(n)).then_some(n)
}

/// 从 `origin` 出发沿 `dir` 最多走 `limit` 步, 返回第一个边缘像素处的位置.
/// 走出图像或步数用完时返回 `None`.
fn search_edge(map: &EdgeMap, origin: Idx2dF, dir: Idx2dF, limit: u32) -> Option<Idx2dF> {
    for k in 1..=limit {
        let pos = offset(origin, dir, k as f64);
        let px = pixel_of(pos).filter(|&px| map.check(px))?;
        if map.is_edge(px) {
            return Some(pos);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::squared_distance_2d;
    use ndarray::{Array2, Array3, ArrayView2};
    use std::cell::Cell;

    /// 在给定列上有竖直边缘的算子.
    fn columns(cols: &'static [usize]) -> impl Fn(ArrayView2<'_, f32>) -> EdgeMap {
        move |img: ArrayView2<'_, f32>| {
            let data = Array2::from_shape_fn(img.dim(), |(_, w)| {
                if cols.contains(&w) {
                    255
                } else {
                    0
                }
            });
            EdgeMap::new(data, 255)
        }
    }

    fn vertical(x: f64, z: usize) -> Vec<Point> {
        vec![
            Point::new(x, 10.0, z),
            Point::new(x, 20.0, z),
            Point::new(x, 30.0, z),
        ]
    }

    fn state<'a>(slice: usize, prev: &'a [Point], next: &'a [Point]) -> SliceState<'a> {
        SliceState {
            slice,
            prev_key: prev,
            reference: prev,
            next_key: next,
        }
    }

    #[test]
    fn test_normal_of_vertical_line() {
        let pts = vertical(20.0, 0);
        for i in 0..3 {
            let (x, y) = normal_at(&pts, i, 2.0).unwrap();
            assert!((x.abs() - 2.0).abs() < 1e-9);
            assert!(y.abs() < 1e-9);
        }
        assert!(normal_at(&pts[..1], 0, 1.0).is_none());
    }

    #[test]
    fn test_normal_of_corner() {
        let pts = [
            Point::new(0.0, 0.0, 0),
            Point::new(10.0, 0.0, 0),
            Point::new(10.0, 10.0, 0),
        ];
        let (x, y) = normal_at(&pts, 1, 1.0).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!((x + h).abs() < 1e-9 && (y - h).abs() < 1e-9);
    }

    #[test]
    fn test_snaps_to_midpoint() {
        let vol = Array3::<f32>::zeros((11, 40, 40));
        let mut m = EdgeGuidedInterpolator::with_operator(
            &vol,
            columns(&[12, 30]),
            EdgeGuideConfig::default(),
        );
        let (prev, next) = (vertical(20.0, 0), vertical(20.0, 10));
        let out = m.interpolate_slice(&state(5, &prev, &next)).unwrap();
        assert_eq!(out, vertical(21.0, 5));
    }

    #[test]
    fn test_one_sided_miss_keeps_linear() {
        let vol = Array3::<f32>::zeros((11, 40, 40));
        let cfg = EdgeGuideConfig {
            edge_search_limit: 5,
            ..Default::default()
        };
        let mut m = EdgeGuidedInterpolator::with_operator(&vol, columns(&[12, 24]), cfg);
        let (prev, next) = (vertical(20.0, 0), vertical(20.0, 10));
        let out = m.interpolate_slice(&state(5, &prev, &next)).unwrap();
        assert_eq!(out, vertical(20.0, 5));
    }

    #[test]
    fn test_no_edges_is_linear() {
        let vol = Array3::<f32>::zeros((11, 40, 40));
        let mut m =
            EdgeGuidedInterpolator::with_operator(&vol, columns(&[]), EdgeGuideConfig::default());
        let prev = vertical(10.0, 0);
        let next = vertical(20.0, 10);
        let out = m.interpolate_slice(&state(5, &prev, &next)).unwrap();
        assert_eq!(out, vertical(15.0, 5));
    }

    #[test]
    fn test_offset_is_bounded() {
        let vol = Array3::<f32>::zeros((11, 64, 64));
        let cfg = EdgeGuideConfig {
            edge_search_limit: 6,
            search_step: 1.5,
            ..Default::default()
        };
        let mut m = EdgeGuidedInterpolator::with_operator(&vol, columns(&[3, 22, 40, 41]), cfg);
        let prev = vec![
            Point::new(20.0, 5.0, 0),
            Point::new(25.0, 20.0, 0),
            Point::new(30.0, 40.0, 0),
            Point::new(28.0, 55.0, 0),
        ];
        let next: Vec<_> = prev.iter().map(|p| Point::new(p.x + 8.0, p.y, 10)).collect();
        for s in 1..10 {
            let linear = interpolate_points(s, &prev, &next);
            let out = m.interpolate_slice(&state(s, &prev, &next)).unwrap();
            for (a, b) in linear.iter().zip(&out) {
                assert_eq!(b.z, s);
                assert!(squared_distance_2d(a, b).sqrt() <= cfg.max_offset() + 1e-9);
            }
        }
    }

    #[test]
    fn test_edge_maps_are_cached() {
        let vol = Array3::<f32>::zeros((11, 40, 40));
        let calls = Cell::new(0);
        let op = |img: ArrayView2<'_, f32>| {
            calls.set(calls.get() + 1);
            EdgeMap::new(Array2::zeros(img.dim()), 255)
        };
        let mut m = EdgeGuidedInterpolator::with_operator(&vol, op, EdgeGuideConfig::default());
        let (prev, next) = (vertical(20.0, 0), vertical(20.0, 10));
        m.interpolate_slice(&state(5, &prev, &next)).unwrap();
        m.interpolate_slice(&state(5, &prev, &next)).unwrap();
        m.interpolate_slice(&state(6, &prev, &next)).unwrap();
        assert_eq!(m.cached_slices(), 2);
        drop(m);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_slice_out_of_volume() {
        let vol = Array3::<f32>::zeros((4, 8, 8));
        let mut m = EdgeGuidedInterpolator::new(&vol, EdgeGuideConfig::default());
        let (prev, next) = (vertical(2.0, 0), vertical(2.0, 10));
        assert!(matches!(
            m.interpolate_slice(&state(5, &prev, &next)),
            Err(SegError::SliceOutOfRange { index: 5, len: 4 })
        ));
    }

    #[test]
    fn test_single_point_skips_edge_map() {
        let vol = Array3::<f32>::zeros((4, 8, 8));
        let mut m = EdgeGuidedInterpolator::new(&vol, EdgeGuideConfig::default());
        let prev = [Point::new(2.0, 2.0, 0)];
        let next = [Point::new(4.0, 2.0, 10)];
        let out = m.interpolate_slice(&state(5, &prev, &next)).unwrap();
        assert_eq!(out, vec![Point::new(3.0, 2.0, 5)]);
        assert_eq!(m.cached_slices(), 0);
    }
}
