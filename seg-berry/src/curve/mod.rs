//! 分割曲线: 关键切片 -> 有序点列表.
//!
//! 某个关键切片中第 `i` 个点与其它所有关键切片中第 `i` 个点相互对应,
//! 插值引擎完全依赖这种跨切片对应关系. 关键切片之间的插入顺序无关紧要,
//! 需要顺序时总是按切片索引升序迭代.

mod lookup;
mod nav;

pub use lookup::{
    can_interpolate_at, can_interpolate_fully, check_fully, find_next_key, find_previous_key,
    KeyLookup,
};
pub use nav::{step_slice, wrap_slice, Step};

use crate::{Point, SegError, SegResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 曲线的底层映射. JSON 中以字符串化的切片索引为键.
pub type KeyMap = BTreeMap<usize, Vec<Point>>;

/// 一条分割曲线.
///
/// 结构保证:
///
/// 1. 每个关键切片下至少有一个点;
/// 2. 关键切片 `k` 下的每个点都满足 `p.z == k`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "KeyMap", try_from = "KeyMap")]
pub struct Curve {
    keys: KeyMap,
}

impl From<Curve> for KeyMap {
    #[inline]
    fn from(value: Curve) -> Self {
        value.keys
    }
}

impl TryFrom<KeyMap> for Curve {
    type Error = SegError;

    /// 检查 z 一致性和非空性后构建曲线.
    fn try_from(keys: KeyMap) -> Result<Self, Self::Error> {
        for (&key, points) in keys.iter() {
            check_key(key, points)?;
        }
        Ok(Self { keys })
    }
}

/// 检查 `points` 能否作为关键切片 `key` 的内容.
fn check_key(key: usize, points: &[Point]) -> SegResult<()> {
    if points.is_empty() {
        return Err(SegError::EmptyKey(key));
    }
    match points.iter().find(|p| p.z != key) {
        Some(p) => Err(SegError::ZMismatch { key, found: p.z }),
        None => Ok(()),
    }
}

impl Curve {
    /// 空曲线.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 关键切片个数.
    #[inline]
    pub fn len_keys(&self) -> usize {
        self.keys.len()
    }

    /// 是否没有任何关键切片.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// 所有点的个数.
    pub fn len_points(&self) -> usize {
        self.keys.values().map(Vec::len).sum()
    }

    /// 按升序迭代所有关键切片索引.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = usize> + DoubleEndedIterator + '_ {
        self.keys.keys().copied()
    }

    /// 按升序迭代 `(关键切片, 点列表)`.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &[Point])> + DoubleEndedIterator {
        self.keys.iter().map(|(&k, v)| (k, v.as_slice()))
    }

    /// 第一个关键切片.
    #[inline]
    pub fn first_key(&self) -> Option<usize> {
        self.keys.keys().next().copied()
    }

    /// 最后一个关键切片.
    #[inline]
    pub fn last_key(&self) -> Option<usize> {
        self.keys.keys().next_back().copied()
    }

    /// `slice` 是否为关键切片.
    #[inline]
    pub fn is_key(&self, slice: usize) -> bool {
        self.keys.contains_key(&slice)
    }

    /// 获取关键切片 `slice` 上的点. 非关键切片返回 `None`.
    #[inline]
    pub fn get(&self, slice: usize) -> Option<&[Point]> {
        self.keys.get(&slice).map(Vec::as_slice)
    }

    /// 获得底层映射的不可变引用.
    #[inline]
    pub fn key_map(&self) -> &KeyMap {
        &self.keys
    }

    /// 在 `point.z` 对应的切片末尾追加一个点. 若该切片还不是关键切片, 则成为关键切片.
    pub fn push_point(&mut self, point: Point) {
        self.keys.entry(point.z).or_default().push(point);
    }

    /// 用 `points` 整体替换关键切片 `slice` 的内容.
    ///
    /// `points` 为空, 或存在 `p.z != slice` 的点时返回 `Err`, 原曲线不变.
    pub fn insert_key(&mut self, slice: usize, points: Vec<Point>) -> SegResult<Option<Vec<Point>>> {
        check_key(slice, &points)?;
        Ok(self.keys.insert(slice, points))
    }

    /// 撤销切片 `slice` 上最后添加的点. 若切片因此变空, 则不再是关键切片.
    ///
    /// 返回被删除的点; `slice` 不是关键切片时返回 `None`.
    pub fn undo_point(&mut self, slice: usize) -> Option<Point> {
        let points = self.keys.get_mut(&slice)?;
        let ans = points.pop();
        if points.is_empty() {
            self.keys.remove(&slice);
        }
        ans
    }

    /// 删除整个关键切片, 返回其内容.
    #[inline]
    pub fn clear_slice(&mut self, slice: usize) -> Option<Vec<Point>> {
        self.keys.remove(&slice)
    }

    /// 删除所有关键切片.
    #[inline]
    pub fn clear_all(&mut self) {
        self.keys.clear();
    }

    /// 把关键切片 `slice` 的第 `index` 个点移动到 `(x, y)`. 成功时返回 `true`.
    pub fn move_point(&mut self, slice: usize, index: usize, x: f64, y: f64) -> bool {
        match self.keys.get_mut(&slice).and_then(|v| v.get_mut(index)) {
            Some(p) => {
                (p.x, p.y) = (x, y);
                true
            }
            None => false,
        }
    }

    /// 点击命中测试: 返回关键切片 `slice` 上第一个满足
    /// `|p.x - x| <= radius` 且 `|p.y - y| <= radius` 的点的位置.
    pub fn hit_test(&self, slice: usize, x: f64, y: f64, radius: f64) -> Option<usize> {
        self.get(slice)?
            .iter()
            .position(|p| (p.x - x).abs() <= radius && (p.y - y).abs() <= radius)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 由 `(切片, [(x, y)])` 构建曲线.
    pub(crate) fn curve_of(keys: &[(usize, &[(f64, f64)])]) -> Curve {
        let mut curve = Curve::new();
        for &(z, points) in keys {
            for &(x, y) in points {
                curve.push_point(Point::new(x, y, z));
            }
        }
        curve
    }

    #[test]
    fn test_push_and_undo() {
        let mut c = Curve::new();
        c.push_point(Point::new(1.0, 1.0, 4));
        c.push_point(Point::new(2.0, 1.0, 4));
        c.push_point(Point::new(2.0, 1.0, 1));
        assert_eq!(c.keys().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(c.len_points(), 3);

        assert_eq!(c.undo_point(4), Some(Point::new(2.0, 1.0, 4)));
        assert!(c.is_key(4));
        assert_eq!(c.undo_point(4), Some(Point::new(1.0, 1.0, 4)));
        assert!(!c.is_key(4));
        assert_eq!(c.undo_point(4), None);
        assert_eq!(c.len_keys(), 1);
    }

    #[test]
    fn test_clear() {
        let mut c = curve_of(&[(0, &[(0.0, 0.0)]), (3, &[(1.0, 1.0)])]);
        assert_eq!(c.clear_slice(3), Some(vec![Point::new(1.0, 1.0, 3)]));
        assert_eq!(c.clear_slice(3), None);
        c.clear_all();
        assert!(c.is_empty());
    }

    #[test]
    fn test_insert_key_checks_z() {
        let mut c = Curve::new();
        let err = c.insert_key(2, vec![Point::new(0.0, 0.0, 3)]).unwrap_err();
        assert!(matches!(err, SegError::ZMismatch { key: 2, found: 3 }));
        assert!(matches!(c.insert_key(2, vec![]), Err(SegError::EmptyKey(2))));
        assert!(c.is_empty());
        assert!(c.insert_key(2, vec![Point::new(0.0, 0.0, 2)]).unwrap().is_none());
    }

    #[test]
    fn test_move_and_hit() {
        let mut c = curve_of(&[(5, &[(10.0, 10.0), (30.0, 10.0)])]);
        assert_eq!(c.hit_test(5, 28.0, 15.0, 7.0), Some(1));
        assert_eq!(c.hit_test(5, 20.0, 10.0, 7.0), None);
        assert_eq!(c.hit_test(6, 10.0, 10.0, 7.0), None);

        assert!(c.move_point(5, 1, 40.0, 12.0));
        assert_eq!(c.get(5).unwrap()[1], Point::new(40.0, 12.0, 5));
        assert!(!c.move_point(5, 2, 0.0, 0.0));
        assert!(!c.move_point(4, 0, 0.0, 0.0));
    }

    #[test]
    fn test_json_keys() {
        let c = curve_of(&[(0, &[(10.0, 10.0)]), (10, &[(10.0, 20.0)])]);
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(s, r#"{"0":[[10.0,10.0,0]],"10":[[10.0,20.0,10]]}"#);
        let back: Curve = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);

        // z 与键不一致.
        assert!(serde_json::from_str::<Curve>(r#"{"1": [[0.0, 0.0, 2]]}"#).is_err());
        // 空关键切片.
        assert!(serde_json::from_str::<Curve>(r#"{"1": []}"#).is_err());
    }
}
