//! 线性插值.

use super::{SliceInterpolator, SliceState};
use crate::{Point, SegResult};
use itertools::izip;

/// 在切片 `slice` 上对 `prev` 和 `next` 两个对应点做线性插值.
///
/// `x(s) = prev.x + (next.x - prev.x) * (s - prev.z) / (next.z - prev.z)`, `y` 同理.
/// 两点位于同一切片时没有可插值的区间, 返回 `prev` 的平面位置.
pub fn interpolate_point(slice: usize, prev: &Point, next: &Point) -> Point {
    debug_assert_ne!(prev.z, next.z);
    if prev.z == next.z {
        return Point::new(prev.x, prev.y, slice);
    }
    let t = (slice as f64 - prev.z as f64) / (next.z as f64 - prev.z as f64);
    Point::new(
        prev.x + (next.x - prev.x) * t,
        prev.y + (next.y - prev.y) * t,
        slice,
    )
}

/// 逐个位置地对两组对应点做线性插值. 两组点的个数应当相同.
pub fn interpolate_points(slice: usize, prev: &[Point], next: &[Point]) -> Vec<Point> {
    debug_assert_eq!(prev.len(), next.len());
    izip!(prev, next)
        .map(|(p, n)| interpolate_point(slice, p, n))
        .collect()
}

/// 线性插值策略. 只使用前后两个关键切片, 忽略滚动参考.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinearInterpolator;

impl SliceInterpolator for LinearInterpolator {
    #[inline]
    fn interpolate_slice(&mut self, state: &SliceState<'_>) -> SegResult<Vec<Point>> {
        Ok(interpolate_points(state.slice, state.prev_key, state.next_key))
    }
}
