//! 按切片顺序推进的完整插值与单切片预览.

use super::{SliceInterpolator, SliceState};
use crate::cloud::DenseCloud;
use crate::curve::{check_fully, find_next_key, find_previous_key, Curve, KeyLookup};
use crate::{Point, SegError, SegResult};
use itertools::Itertools;

/// 把曲线展开为从第一个关键切片到最后一个关键切片的稠密点云.
///
/// 关键切片原样复制, 并重置滚动参考; 关键切片之间的每张切片按升序插值,
/// 其结果成为下一张切片的参考.
///
/// # 注意
///
/// 在产生任何输出之前先做完整性检查, 失败时返回 `Err`, 不会返回部分结果.
pub fn interpolate_full<S>(curve: &Curve, strategy: &mut S) -> SegResult<DenseCloud>
where
    S: SliceInterpolator + ?Sized,
{
    check_fully(curve)?;
    let (first_slice, first) = curve.iter().next().ok_or(SegError::TooFewKeys(0))?;

    let mut rows: Vec<Vec<Point>> = vec![first.to_vec()];
    for ((s0, p0), (s1, p1)) in curve.iter().tuple_windows() {
        for slice in s0 + 1..s1 {
            let reference = rows.last().map_or(p0, Vec::as_slice);
            let out = strategy.interpolate_slice(&SliceState {
                slice,
                prev_key: p0,
                reference,
                next_key: p1,
            })?;
            rows.push(out);
        }
        rows.push(p1.to_vec());
        log::debug!("interpolated keys {s0} -> {s1}");
    }
    DenseCloud::from_rows(first_slice, rows)
}

/// 单切片预览: 返回切片 `slice` 上的点.
///
/// 关键切片直接返回其点; 否则要求前后关键切片存在且点数相同,
/// 然后从前一个关键切片推进到 `slice`, 与 [`interpolate_full`] 在该切片上的结果一致.
pub fn interpolate_at<S>(slice: usize, curve: &Curve, strategy: &mut S) -> SegResult<Vec<Point>>
where
    S: SliceInterpolator + ?Sized,
{
    if let Some(points) = curve.get(slice) {
        return Ok(points.to_vec());
    }
    let (s0, p0, s1, p1) = match (find_previous_key(slice, curve), find_next_key(slice, curve)) {
        (
            KeyLookup::Found {
                slice: s0,
                points: p0,
            },
            KeyLookup::Found {
                slice: s1,
                points: p1,
            },
        ) => (s0, p0, s1, p1),
        _ => return Err(SegError::NotInterpolable(slice)),
    };
    if p0.len() != p1.len() {
        return Err(SegError::CountMismatch {
            first: s0,
            first_len: p0.len(),
            second: s1,
            second_len: p1.len(),
        });
    }

    let mut reference = p0.to_vec();
    for s in s0 + 1..=slice {
        reference = strategy.interpolate_slice(&SliceState {
            slice: s,
            prev_key: p0,
            reference: &reference,
            next_key: p1,
        })?;
    }
    Ok(reference)
}
