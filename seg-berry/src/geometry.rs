//! 点与平面向量运算.
//!
//! 坐标约定: `x` 为图像水平方向 (宽), `y` 为图像垂直方向 (高), `z` 为切片索引.
//! 因此点 `(x, y, z)` 在第 `z` 张切片上对应的像素索引为 `(h, w) = (y, x)`.
//!
//! 方向向量一律位于切片平面内, 用 [`Idx2dF`] 表示; 它们不携带 z.

use crate::{Idx2d, Idx2dF, SegError};
use ordered_float::NotNan;
use serde::{Deserialize, Serialize, Serializer};

/// 切片上的一个点.
///
/// `z` 总是等于该点所在的切片索引. 它和曲线中的关键切片键是冗余的,
/// 但这样下游代码可以只拿着点本身工作.
///
/// 序列化为 `[x, y, z]`, 其中 `z` 写为整数; 反序列化时也接受整数值的浮点 `z`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "[f64; 3]")]
pub struct Point {
    /// 水平坐标.
    pub x: f64,
    /// 垂直坐标.
    pub y: f64,
    /// 切片索引.
    pub z: usize,
}

impl Point {
    /// 直接初始化.
    #[inline]
    pub const fn new(x: f64, y: f64, z: usize) -> Self {
        Self { x, y, z }
    }

    /// 平面坐标 `(x, y)`.
    #[inline]
    pub fn xy(&self) -> Idx2dF {
        (self.x, self.y)
    }

    /// 保留 `z`, 替换平面坐标.
    #[inline]
    pub fn with_xy(self, (x, y): Idx2dF) -> Self {
        Self { x, y, ..self }
    }

    /// 最近的像素索引 `(h, w)`. 坐标为负或非有限值时返回 `None`.
    pub fn pixel(&self) -> Option<Idx2d> {
        pixel_of(self.xy())
    }

    /// `[x, y, z]` 形式的坐标.
    #[inline]
    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z as f64]
    }
}

impl TryFrom<[f64; 3]> for Point {
    type Error = SegError;

    fn try_from(value: [f64; 3]) -> Result<Self, Self::Error> {
        let [x, y, z] = value;
        if !x.is_finite() || !y.is_finite() || !z.is_finite() || z < 0.0 || z.fract() != 0.0 {
            return Err(SegError::BadPoint(value));
        }
        Ok(Self::new(x, y, z as usize))
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y, self.z).serialize(serializer)
    }
}

/// 平面坐标对应的最近像素索引 `(h, w)`. 坐标为负或非有限值时返回 `None`.
pub fn pixel_of((x, y): Idx2dF) -> Option<Idx2d> {
    let (h, w) = (y.round(), x.round());
    (h.is_finite() && w.is_finite() && h >= 0.0 && w >= 0.0).then_some((h as usize, w as usize))
}

/// 切片平面内的平方距离 (忽略 z).
#[inline]
pub fn squared_distance_2d(a: &Point, b: &Point) -> f64 {
    (b.x - a.x).powi(2) + (b.y - a.y).powi(2)
}

/// 三维平方距离 (z 按切片索引计入).
#[inline]
pub fn squared_distance_3d(a: &Point, b: &Point) -> f64 {
    squared_distance_2d(a, b) + (b.z as f64 - a.z as f64).powi(2)
}

/// 从 `origin` 指向 `vector` 的向量, 缩放到长度 `magnitude`.
///
/// 两点重合时返回零向量, 调用方应将其视为 "没有可用方向".
pub fn normalize(vector: Idx2dF, origin: Idx2dF, magnitude: f64) -> Idx2dF {
    let (dx, dy) = (vector.0 - origin.0, vector.1 - origin.1);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return (0.0, 0.0);
    }
    (dx / len * magnitude, dy / len * magnitude)
}

/// `vector` 关于 `origin` 的中心对称点. `z` 保持 `vector` 原值.
#[inline]
pub fn invert(vector: &Point, origin: &Point) -> Point {
    vector.with_xy((2.0 * origin.x - vector.x, 2.0 * origin.y - vector.y))
}

/// 平面内的垂直向量, 即 `(x, y, 0)` 与面外单位轴 `(0, 0, 1)` 的叉积.
#[inline]
pub fn perpendicular((x, y): Idx2dF) -> Idx2dF {
    (y, -x)
}

/// 向量是否为零向量.
#[inline]
pub fn is_zero((x, y): Idx2dF) -> bool {
    x == 0.0 && y == 0.0
}

/// 点加向量的 `k` 倍.
#[inline]
pub fn offset((x, y): Idx2dF, (dx, dy): Idx2dF, k: f64) -> Idx2dF {
    (x + dx * k, y + dy * k)
}

/// 两点中点.
#[inline]
pub fn midpoint(a: Idx2dF, b: Idx2dF) -> Idx2dF {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// `target` 到 `points` 中任一点的最小平面平方距离. `points` 为空时返回 `None`.
///
/// 用于判断用户点击位置离哪条曲线最近.
pub fn nearest_point_distance(target: &Point, points: &[Point]) -> Option<f64> {
    points
        .iter()
        .filter_map(|p| NotNan::new(squared_distance_2d(target, p)).ok())
        .min()
        .map(NotNan::into_inner)
}
