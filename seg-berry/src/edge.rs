//! 切片边缘算子.
//!
//! 插值引擎只把边缘算子看作黑盒: 输入一张二维切片, 输出同形状的边缘强度图,
//! 并以 `strength >= cutoff` 判定一个像素是否为边缘.
//! 默认实现 [`CannyEdges`] 基于 [canny 算法](https://ieeexplore.ieee.org/abstract/document/4767851).

use crate::consts::edge as defaults;
use crate::{Idx2d, Idx2dF};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use ndarray::{Array2, ArrayView2};

/// 同一切片的边缘强度图.
#[derive(Clone, Debug)]
pub struct EdgeMap {
    data: Array2<u8>,
    cutoff: u8,
}

impl EdgeMap {
    /// 以强度图和判定门限初始化.
    #[inline]
    pub fn new(data: Array2<u8>, cutoff: u8) -> Self {
        Self { data, cutoff }
    }

    /// 强度图的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 判断一个索引是否合法 (未越界).
    #[inline]
    pub fn check(&self, (h, w): Idx2d) -> bool {
        let (h_len, w_len) = self.shape();
        h < h_len && w < w_len
    }

    /// 获取给定位置 (高, 宽) 的边缘强度. 越界时返回 `None`.
    #[inline]
    pub fn strength(&self, pos: Idx2d) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// 给定位置是否为边缘. 越界位置不是边缘.
    #[inline]
    pub fn is_edge(&self, pos: Idx2d) -> bool {
        self.strength(pos).is_some_and(|s| s >= self.cutoff)
    }

    /// 平面坐标 `(x, y)` 所在像素是否位于图内.
    #[inline]
    pub fn contains(&self, xy: Idx2dF) -> bool {
        crate::geometry::pixel_of(xy).is_some_and(|p| self.check(p))
    }

    /// 边缘像素个数.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&s| s >= self.cutoff).count()
    }

    /// 获得底层强度图.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }
}

/// 边缘算子. 对同样的输入必须产生同样的输出.
pub trait EdgeOperator {
    /// 对一张切片运行边缘检测.
    fn detect(&self, image: ArrayView2<'_, f32>) -> EdgeMap;
}

/// 任何 `Fn(ArrayView2<f32>) -> EdgeMap` 都可直接作为边缘算子.
impl<F> EdgeOperator for F
where
    F: Fn(ArrayView2<'_, f32>) -> EdgeMap,
{
    #[inline]
    fn detect(&self, image: ArrayView2<'_, f32>) -> EdgeMap {
        self(image)
    }
}

/// 基于 canny 算法的默认边缘算子.
#[derive(Copy, Clone, Debug)]
pub struct CannyEdges {
    low: f32,
    high: f32,
    dilation: u8,
    cutoff: u8,
}

impl CannyEdges {
    /// 以 canny 高低阈值和膨胀半径构建.
    ///
    /// 阈值作用于规范化到 `[0, 255]` 后的切片. `low` 不应大于 `high`, 否则交换二者.
    pub fn new(low: f32, high: f32, dilation: u8) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Self {
            low,
            high,
            dilation,
            cutoff: defaults::CUTOFF,
        }
    }

    /// 替换边缘判定门限.
    #[inline]
    pub fn with_cutoff(self, cutoff: u8) -> Self {
        Self { cutoff, ..self }
    }

    /// 膨胀半径.
    #[inline]
    pub fn dilation(&self) -> u8 {
        self.dilation
    }
}

impl Default for CannyEdges {
    fn default() -> Self {
        Self::new(defaults::LOW_THRESHOLD, defaults::HIGH_THRESHOLD, 0)
    }
}

impl EdgeOperator for CannyEdges {
    fn detect(&self, image: ArrayView2<'_, f32>) -> EdgeMap {
        EdgeMap::new(
            detect_edges(image, self.low, self.high, self.dilation),
            self.cutoff,
        )
    }
}

/// 对切片运行 canny 边缘检测. 返回同形状的图, 边缘像素为 255, 其余为 0.
///
/// 切片像素先按最小/最大值线性规范化到 `[0, 255]`. `dilation > 0`
/// 时对结果做切比雪夫距离为 `dilation` 的膨胀.
pub fn detect_edges(image: ArrayView2<'_, f32>, low: f32, high: f32, dilation: u8) -> Array2<u8> {
    let (h, w) = image.dim();
    if h == 0 || w == 0 {
        return Array2::zeros((h, w));
    }
    let gray = rescale_to_gray(image);
    let mut edges = imageproc::edges::canny(&gray, low, high);
    if dilation > 0 {
        edges = imageproc::morphology::dilate(&edges, Norm::LInf, dilation);
    }
    Array2::from_shape_fn((h, w), |(y, x)| edges.get_pixel(x as u32, y as u32).0[0])
}

/// 将任意动态范围的切片线性规范化为 8-bit 灰度图. 常量图映射为全黑.
fn rescale_to_gray(image: ArrayView2<'_, f32>) -> GrayImage {
    let (h, w) = image.dim();
    let (lo, hi) = image
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = hi - lo;
    let mut buf = GrayImage::new(w as u32, h as u32);
    for ((y, x), &v) in image.indexed_iter() {
        let gray = if range > 0.0 && v.is_finite() {
            // 255, not 256.
            ((v - lo) / range * 255.0).round() as u8
        } else {
            0
        };
        buf.put_pixel(x as u32, y as u32, Luma([gray]));
    }
    buf
}
