//! 相邻关键切片查找与插值合法性检查.
//!
//! 这些都是无副作用的纯函数. `slice` 本身可以是关键切片,
//! 此时 "前一个" / "后一个" 会跳过它自己.

use super::Curve;
use crate::{Point, SegError, SegResult};
use itertools::Itertools;
use std::ops::Bound;

/// 相邻关键切片的查找结果.
///
/// 到达边界是每次调用都要检查的预期情况, 所以用变体表示而不是错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum KeyLookup<'a> {
    /// 找到了关键切片.
    Found {
        /// 关键切片索引.
        slice: usize,
        /// 关键切片上的点.
        points: &'a [Point],
    },

    /// 给定方向上没有关键切片.
    NotFound,
}

impl<'a> KeyLookup<'a> {
    /// 是否找到.
    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// 找到的点列表.
    #[inline]
    pub fn points(&self) -> Option<&'a [Point]> {
        match *self {
            Self::Found { points, .. } => Some(points),
            Self::NotFound => None,
        }
    }

    /// 找到的关键切片索引.
    #[inline]
    pub fn slice(&self) -> Option<usize> {
        match *self {
            Self::Found { slice, .. } => Some(slice),
            Self::NotFound => None,
        }
    }
}

impl<'a> From<Option<(&'a usize, &'a Vec<Point>)>> for KeyLookup<'a> {
    #[inline]
    fn from(value: Option<(&'a usize, &'a Vec<Point>)>) -> Self {
        match value {
            Some((&slice, points)) => Self::Found {
                slice,
                points: points.as_slice(),
            },
            None => Self::NotFound,
        }
    }
}

/// 严格位于 `slice` 之前的最近关键切片.
pub fn find_previous_key(slice: usize, curve: &Curve) -> KeyLookup<'_> {
    curve.keys.range(..slice).next_back().into()
}

/// 严格位于 `slice` 之后的最近关键切片.
pub fn find_next_key(slice: usize, curve: &Curve) -> KeyLookup<'_> {
    curve
        .keys
        .range((Bound::Excluded(slice), Bound::Unbounded))
        .next()
        .into()
}

/// `slice` 前后都有关键切片, 且二者点数相同.
pub fn can_interpolate_at(slice: usize, curve: &Curve) -> bool {
    match (find_previous_key(slice, curve), find_next_key(slice, curve)) {
        (KeyLookup::Found { points: p, .. }, KeyLookup::Found { points: n, .. }) => {
            p.len() == n.len()
        }
        _ => false,
    }
}

/// 所有关键切片的点数都相同. 空曲线和单关键切片曲线也满足该条件.
pub fn can_interpolate_fully(curve: &Curve) -> bool {
    curve.keys.values().map(Vec::len).all_equal()
}

/// 完整插值的前置检查.
///
/// - 关键切片少于两个时返回 `Err(SegError::TooFewKeys)`;
/// - 否则返回第一对点数不同的相邻关键切片 `Err(SegError::CountMismatch)`;
/// - 都满足时返回 `Ok(())`.
pub fn check_fully(curve: &Curve) -> SegResult<()> {
    if curve.len_keys() < 2 {
        return Err(SegError::TooFewKeys(curve.len_keys()));
    }
    match curve
        .iter()
        .tuple_windows()
        .find(|((_, a), (_, b))| a.len() != b.len())
    {
        Some(((first, a), (second, b))) => Err(SegError::CountMismatch {
            first,
            first_len: a.len(),
            second,
            second_len: b.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tests::curve_of;

    fn example() -> Curve {
        curve_of(&[
            (0, &[(10.0, 10.0), (20.0, 10.0)]),
            (10, &[(10.0, 20.0), (20.0, 20.0)]),
        ])
    }

    #[test]
    fn test_example_neighbours() {
        let c = example();
        assert_eq!(
            find_previous_key(5, &c).points().unwrap(),
            &[Point::new(10.0, 10.0, 0), Point::new(20.0, 10.0, 0)]
        );
        assert_eq!(
            find_next_key(5, &c).points().unwrap(),
            &[Point::new(10.0, 20.0, 10), Point::new(20.0, 20.0, 10)]
        );
        assert!(can_interpolate_fully(&c));
        assert!(can_interpolate_at(5, &c));
    }

    #[test]
    fn test_boundaries() {
        let c = example();
        assert_eq!(find_previous_key(0, &c), KeyLookup::NotFound);
        assert_eq!(find_next_key(10, &c), KeyLookup::NotFound);
        assert_eq!(find_next_key(12, &c), KeyLookup::NotFound);
        assert!(!can_interpolate_at(0, &c));
        assert!(!can_interpolate_at(10, &c));
        assert!(!can_interpolate_at(11, &c));
    }

    #[test]
    fn test_key_slice_skips_itself() {
        let c = curve_of(&[(2, &[(0.0, 0.0)]), (7, &[(1.0, 1.0)]), (30, &[(2.0, 2.0)])]);
        assert_eq!(find_previous_key(7, &c).slice(), Some(2));
        assert_eq!(find_next_key(7, &c).slice(), Some(30));
        assert!(can_interpolate_at(7, &c));
    }

    #[test]
    fn test_uneven_gaps() {
        let c = curve_of(&[(2, &[(0.0, 0.0)]), (7, &[(1.0, 1.0)]), (30, &[(2.0, 2.0)])]);
        for s in 3..7 {
            assert_eq!(find_previous_key(s, &c).slice(), Some(2));
            assert_eq!(find_next_key(s, &c).slice(), Some(7));
        }
        for s in 8..30 {
            assert_eq!(find_previous_key(s, &c).slice(), Some(7));
            assert_eq!(find_next_key(s, &c).slice(), Some(30));
        }
    }

    #[test]
    fn test_unequal_counts() {
        let c = curve_of(&[(0, &[(0.0, 0.0)]), (5, &[(0.0, 0.0), (1.0, 1.0)])]);
        assert!(!can_interpolate_fully(&c));
        assert!(!can_interpolate_at(3, &c));
        assert!(matches!(
            check_fully(&c),
            Err(SegError::CountMismatch {
                first: 0,
                first_len: 1,
                second: 5,
                second_len: 2
            })
        ));
    }

    #[test]
    fn test_too_few_keys() {
        assert!(matches!(check_fully(&Curve::new()), Err(SegError::TooFewKeys(0))));
        let c = curve_of(&[(4, &[(0.0, 0.0)])]);
        assert!(can_interpolate_fully(&c));
        assert!(matches!(check_fully(&c), Err(SegError::TooFewKeys(1))));
    }
}
