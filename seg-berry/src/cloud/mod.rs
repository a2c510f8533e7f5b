//! 稠密点云及其读写.
//!
//! 稠密点云是形状为 `[切片数, 每切片点数, 3]` 的数组, 第 `j` 行对应切片 `first_slice + j`,
//! 每个点为 `[x, y, z]`. 它由 [`crate::interp::interpolate_full`] 产生,
//! 以有序二进制格式 ([`vcps`]) 写入磁盘; 关键切片则另存一份 JSON ([`json`]).

pub mod json;
pub mod meta;
pub mod vcps;

use crate::consts::KEY_DETECT_DECIMALS;
use crate::curve::KeyMap;
use crate::{Curve, Point, SegError, SegResult};
use ndarray::{Array3, ArrayView3, Axis};

/// 有序稠密点云.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseCloud {
    first_slice: usize,
    data: Array3<f64>,
}

impl DenseCloud {
    /// 从原始数组构建. `data` 的最后一维必须为 3, 且至少有一行.
    ///
    /// 不检查 z 列与行号是否一致, 需要时使用 [`DenseCloud::check_z`].
    pub fn new(first_slice: usize, data: Array3<f64>) -> SegResult<Self> {
        let (n, _, dim) = data.dim();
        if dim != 3 {
            return Err(SegError::BadCloud(format!("点的维数应为 3, 实际为 {dim}")));
        }
        if n == 0 {
            return Err(SegError::BadCloud("点云为空".to_string()));
        }
        check_slice_range(first_slice, n)?;
        Ok(Self { first_slice, data })
    }

    /// 从逐切片的点列表构建. 第 `j` 行的所有点都必须满足 `z == first_slice + j`,
    /// 且各行点数相同.
    pub fn from_rows(first_slice: usize, rows: Vec<Vec<Point>>) -> SegResult<Self> {
        check_slice_range(first_slice, rows.len())?;
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Array3::zeros((rows.len(), width, 3));
        for (j, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(SegError::BadCloud(format!(
                    "第 {j} 行有 {} 个点, 期望 {width} 个",
                    row.len()
                )));
            }
            let slice = first_slice + j;
            for (i, p) in row.iter().enumerate() {
                if p.z != slice {
                    return Err(SegError::ZMismatch {
                        key: slice,
                        found: p.z,
                    });
                }
                data[[j, i, 0]] = p.x;
                data[[j, i, 1]] = p.y;
                data[[j, i, 2]] = p.z as f64;
            }
        }
        Self::new(first_slice, data)
    }

    /// 形状 `(切片数, 每切片点数, 3)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// 切片数 (行数).
    #[inline]
    pub fn n_slices(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    /// 每张切片的点数.
    #[inline]
    pub fn points_per_slice(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// 第一行对应的切片.
    #[inline]
    pub fn first_slice(&self) -> usize {
        self.first_slice
    }

    /// 最后一行对应的切片.
    #[inline]
    pub fn last_slice(&self) -> usize {
        self.first_slice + self.n_slices() - 1
    }

    /// 切片 `slice` 上的点. `slice` 不在点云范围内时返回 `None`.
    pub fn row(&self, slice: usize) -> Option<Vec<Point>> {
        let j = slice.checked_sub(self.first_slice)?;
        (j < self.n_slices()).then(|| {
            self.data
                .index_axis(Axis(0), j)
                .outer_iter()
                .map(|p| Point::new(p[0], p[1], slice))
                .collect()
        })
    }

    /// 按切片升序迭代每一行.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Point>> + '_ {
        (self.first_slice..=self.last_slice()).filter_map(|s| self.row(s))
    }

    /// 检查每一行的 z 列都等于该行对应的切片.
    pub fn check_z(&self) -> SegResult<()> {
        for (j, row) in self.data.outer_iter().enumerate() {
            let slice = self.first_slice + j;
            if let Some(&z) = row.column(2).iter().find(|&&z| z != slice as f64) {
                return Err(SegError::BadCloud(format!(
                    "第 {j} 行的 z 坐标 {z} 与切片 {slice} 不一致"
                )));
            }
        }
        Ok(())
    }

    /// 底层数组.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// 取出底层数组.
    #[inline]
    pub fn into_raw(self) -> Array3<f64> {
        self.data
    }

    /// 仅保留关键切片的曲线. 见 [`cloud_to_curve`].
    #[inline]
    pub fn to_curve(&self) -> SegResult<Curve> {
        cloud_to_curve(self)
    }
}

/// 从稠密点云恢复关键切片.
///
/// 第一行和最后一行总是关键切片. 对于中间的第 `j` 行, 若进入它的位移
/// (第 `j - 1` 行到第 `j` 行, 逐点) 与离开它的位移不同, 则它是关键切片.
/// 位移保留 9 位小数后比较.
///
/// # 注意
///
/// 这是尽力而为的启发式: 跨越真实关键切片的共线匀速运动会被误判为非关键切片.
/// 有 `pointset.json` 时应优先使用它.
pub fn cloud_to_curve(cloud: &DenseCloud) -> SegResult<Curve> {
    log::warn!(
        "recovering key slices from a dense cloud ({} slices), result is best-effort",
        cloud.n_slices()
    );
    let rows: Vec<Vec<Point>> = cloud.rows().collect();
    let n = rows.len();
    let mut keys = KeyMap::new();
    for (j, row) in rows.iter().enumerate() {
        let is_key = j == 0
            || j + 1 == n
            || displacement(&rows[j - 1], row) != displacement(row, &rows[j + 1]);
        if is_key && !row.is_empty() {
            keys.insert(cloud.first_slice() + j, row.clone());
        }
    }
    Curve::try_from(keys)
}

/// 逐点位移, 保留 [`KEY_DETECT_DECIMALS`] 位小数.
fn displacement(from: &[Point], to: &[Point]) -> Vec<(f64, f64)> {
    let scale = 10f64.powi(KEY_DETECT_DECIMALS);
    let round = |v: f64| (v * scale).round() / scale;
    from.iter()
        .zip(to)
        .map(|(a, b)| (round(b.x - a.x), round(b.y - a.y)))
        .collect()
}

/// 从 `first_slice` 开始的 `n` 行, 其最后一行的切片索引不能越过 `usize`.
fn check_slice_range(first_slice: usize, n: usize) -> SegResult<()> {
    match first_slice.checked_add(n.saturating_sub(1)) {
        Some(_) => Ok(()),
        None => Err(SegError::BadCloud(format!(
            "起始切片 {first_slice} 之后的 {n} 行超出切片索引范围"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tests::curve_of;
    use crate::interp::{interpolate_full, InterpolationMode};

    #[test]
    fn test_from_rows_checks() {
        let rows = vec![vec![Point::new(0.0, 0.0, 3)], vec![Point::new(1.0, 0.0, 4)]];
        let cloud = DenseCloud::from_rows(3, rows).unwrap();
        assert_eq!(cloud.shape(), (2, 1, 3));
        assert_eq!(cloud.last_slice(), 4);
        assert!(cloud.check_z().is_ok());

        let rows = vec![vec![Point::new(0.0, 0.0, 3)], vec![Point::new(1.0, 0.0, 5)]];
        assert!(matches!(
            DenseCloud::from_rows(3, rows),
            Err(SegError::ZMismatch { key: 4, found: 5 })
        ));
        let rows = vec![vec![Point::new(0.0, 0.0, 0)], vec![]];
        assert!(DenseCloud::from_rows(0, rows).is_err());
        assert!(DenseCloud::from_rows(0, vec![]).is_err());
    }

    #[test]
    fn test_new_checks_dim() {
        assert!(DenseCloud::new(0, Array3::zeros((2, 2, 2))).is_err());
        let cloud = DenseCloud::new(1, Array3::zeros((2, 2, 3))).unwrap();
        // z 列全为 0, 与切片 1 不一致.
        assert!(cloud.check_z().is_err());
    }

    #[test]
    fn test_slice_range_overflow() {
        assert!(matches!(
            DenseCloud::new(usize::MAX, Array3::zeros((2, 1, 3))),
            Err(SegError::BadCloud(_))
        ));
        assert!(DenseCloud::new(usize::MAX, Array3::zeros((1, 1, 3))).is_ok());
        let rows = vec![vec![Point::new(0.0, 0.0, usize::MAX)]; 2];
        assert!(matches!(
            DenseCloud::from_rows(usize::MAX, rows),
            Err(SegError::BadCloud(_))
        ));
    }

    #[test]
    fn test_key_detection() {
        let c = curve_of(&[
            (2, &[(0.0, 0.0), (10.0, 0.0)]),
            (6, &[(4.0, 0.0), (14.0, 0.0)]),
            (9, &[(4.0, 3.0), (14.0, 6.0)]),
            (13, &[(0.0, 3.0), (10.0, 6.0)]),
        ]);
        let cloud = interpolate_full(&c, &mut InterpolationMode::linear()).unwrap();
        assert_eq!(cloud_to_curve(&cloud).unwrap(), c);
    }

    #[test]
    fn test_stationary_first_key_is_kept() {
        let c = curve_of(&[
            (0, &[(5.0, 5.0)]),
            (3, &[(5.0, 5.0)]),
            (6, &[(8.0, 5.0)]),
        ]);
        let cloud = interpolate_full(&c, &mut InterpolationMode::linear()).unwrap();
        assert_eq!(cloud_to_curve(&cloud).unwrap(), c);
    }

    #[test]
    fn test_second_point_changes_direction() {
        // 第一个点匀速运动, 只有第二个点在切片 4 改变方向.
        let c = curve_of(&[
            (0, &[(0.0, 0.0), (0.0, 0.0)]),
            (4, &[(4.0, 0.0), (4.0, 0.0)]),
            (8, &[(8.0, 0.0), (4.0, 4.0)]),
        ]);
        let cloud = interpolate_full(&c, &mut InterpolationMode::linear()).unwrap();
        assert_eq!(cloud_to_curve(&cloud).unwrap(), c);
    }

    #[test]
    fn test_collinear_key_is_lost() {
        let c = curve_of(&[(0, &[(0.0, 0.0)]), (2, &[(2.0, 0.0)]), (4, &[(4.0, 0.0)])]);
        let cloud = interpolate_full(&c, &mut InterpolationMode::linear()).unwrap();
        let back = cloud_to_curve(&cloud).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec![0, 4]);
    }
}
