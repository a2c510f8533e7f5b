//! 多条曲线的集合. 任一时刻只有一条曲线处于活动状态, 只有它接受新点.

use crate::consts::DRAFT_ID;
use crate::geometry::nearest_point_distance;
use crate::{Curve, Point, SegResult};
use ordered_float::NotNan;
use std::collections::BTreeMap;
use std::fmt;
use time::macros::format_description;
use time::OffsetDateTime;

/// 曲线的不透明 id.
///
/// 已保存的曲线使用时间戳 id (同时也是分割目录名), 正在编辑的草稿曲线使用 `"0"`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CurveId(String);

impl CurveId {
    /// 草稿曲线 id.
    #[inline]
    pub fn draft() -> Self {
        Self(DRAFT_ID.to_string())
    }

    /// 以当前本地时间生成 `YYYYMMDDhhmmss` 形式的 id. 本地时区不可用时使用 UTC.
    pub fn timestamp() -> SegResult<Self> {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::from_datetime(now)
    }

    /// 以给定时间生成 `YYYYMMDDhhmmss` 形式的 id.
    pub fn from_datetime(t: OffsetDateTime) -> SegResult<Self> {
        let fmt = format_description!("[year][month][day][hour][minute][second]");
        Ok(Self(t.format(&fmt)?))
    }

    /// 是否为草稿 id.
    #[inline]
    pub fn is_draft(&self) -> bool {
        self.0 == DRAFT_ID
    }

    /// 字符串形式.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CurveId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CurveId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次会话中加载的全部曲线.
///
/// 草稿曲线总是存在; 卸载活动曲线后草稿曲线重新成为活动曲线.
#[derive(Clone, Debug)]
pub struct Segmentation {
    curves: BTreeMap<CurveId, Curve>,
    active: CurveId,
}

impl Default for Segmentation {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmentation {
    /// 只包含一条空草稿曲线, 且草稿曲线为活动曲线.
    pub fn new() -> Self {
        let mut curves = BTreeMap::new();
        curves.insert(CurveId::draft(), Curve::new());
        Self {
            curves,
            active: CurveId::draft(),
        }
    }

    /// 曲线条数 (含草稿).
    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// 除草稿外没有其它曲线, 且草稿为空.
    pub fn is_empty(&self) -> bool {
        self.curves
            .iter()
            .all(|(id, curve)| id.is_draft() && curve.is_empty())
    }

    /// 按 id 升序迭代所有曲线 id.
    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = &CurveId> {
        self.curves.keys()
    }

    /// 获取曲线.
    #[inline]
    pub fn get(&self, id: &CurveId) -> Option<&Curve> {
        self.curves.get(id)
    }

    /// 获取可变曲线.
    #[inline]
    pub fn get_mut(&mut self, id: &CurveId) -> Option<&mut Curve> {
        self.curves.get_mut(id)
    }

    /// 加载 (或替换) 一条曲线. 返回被替换的旧曲线.
    #[inline]
    pub fn insert(&mut self, id: CurveId, curve: Curve) -> Option<Curve> {
        self.curves.insert(id, curve)
    }

    /// 卸载一条曲线. 若它是活动曲线, 草稿曲线成为活动曲线.
    ///
    /// 卸载草稿曲线相当于取出其内容并留下一条空草稿.
    pub fn remove(&mut self, id: &CurveId) -> Option<Curve> {
        let ans = self.curves.remove(id);
        self.curves.entry(CurveId::draft()).or_default();
        if &self.active == id {
            self.active = CurveId::draft();
        }
        ans
    }

    /// 活动曲线 id.
    #[inline]
    pub fn active_id(&self) -> &CurveId {
        &self.active
    }

    /// 设置活动曲线. `id` 未加载时返回 `false`, 活动曲线不变.
    pub fn set_active(&mut self, id: &CurveId) -> bool {
        if self.curves.contains_key(id) {
            self.active = id.clone();
            true
        } else {
            false
        }
    }

    /// 活动曲线.
    pub fn active(&self) -> &Curve {
        // 结构保证活动 id 总在映射中.
        &self.curves[&self.active]
    }

    /// 可变活动曲线.
    pub fn active_mut(&mut self) -> &mut Curve {
        self.curves.entry(self.active.clone()).or_default()
    }

    /// 向活动曲线追加一个点.
    #[inline]
    pub fn push_point(&mut self, point: Point) {
        self.active_mut().push_point(point);
    }

    /// 在切片 `slice` 上, 找到离 `(x, y)` 最近的曲线.
    /// 只考虑以 `slice` 为关键切片的曲线; 没有时返回 `None`.
    pub fn nearest_curve(&self, slice: usize, x: f64, y: f64) -> Option<&CurveId> {
        let target = Point::new(x, y, slice);
        self.curves
            .iter()
            .filter_map(|(id, c)| {
                let d = nearest_point_distance(&target, c.get(slice)?)?;
                Some((id, NotNan::new(d).ok()?))
            })
            .min_by_key(|&(_, d)| d)
            .map(|(id, _)| id)
    }

    /// 选中离 `(x, y)` 最近的曲线作为活动曲线, 返回是否切换成功.
    pub fn select_nearest(&mut self, slice: usize, x: f64, y: f64) -> bool {
        match self.nearest_curve(slice, x, y).cloned() {
            Some(id) => self.set_active(&id),
            None => false,
        }
    }
}
