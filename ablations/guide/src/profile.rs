//! 插值运行统计.

use seg_berry::cloud::DenseCloud;
use seg_berry::geometry::squared_distance_2d;
use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::from_secs(0),
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间综合 (以微秒为单位).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 一种插值方式在全部分割上的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 无法完整插值而被跳过的分割个数.
    skipped: u64,

    /// 成功插值的分割个数.
    curves: u64,

    /// 插值产生的非关键切片点总数.
    points: u64,

    /// 相对线性位置发生移动的点数.
    snapped: u64,

    /// 相对线性位置的位移总和.
    displacement: f64,

    /// 相对线性位置的最大位移.
    max_displacement: f64,

    /// 插值花费的总时间.
    interp_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一次插值.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            skipped: 0,
            curves: 0,
            points: 0,
            snapped: 0,
            displacement: 0.0,
            max_displacement: 0.0,
            interp_time: AccTimer::default(),
            real_time: AccTimer::default(),
            most: None,
        }
    }

    /// 记录一条被跳过的分割.
    #[inline]
    pub fn count_skipped(&mut self) {
        self.skipped += 1;
    }

    /// 开始一次插值计时.
    #[inline]
    pub fn interp_start(&mut self) {
        self.interp_time.start();
    }

    /// 结束一次插值计时.
    #[inline]
    pub fn interp_elapsed(&mut self) {
        let d = self.interp_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
    }

    /// 对比同一曲线的插值结果 `cloud` 与线性基准 `linear`, 累计位移.
    /// 关键切片上的点不计入.
    pub fn compare(&mut self, cloud: &DenseCloud, linear: &DenseCloud, keys: &[usize]) {
        self.curves += 1;
        for (a, b) in cloud.rows().zip(linear.rows()) {
            if a.first().is_some_and(|p| keys.contains(&p.z)) {
                continue;
            }
            for (p, q) in a.iter().zip(&b) {
                let d = squared_distance_2d(p, q).sqrt();
                self.points += 1;
                if d > 0.0 {
                    self.snapped += 1;
                }
                self.displacement += d;
                self.max_displacement = self.max_displacement.max(d);
            }
        }
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 被跳过的分割个数.
    #[inline]
    pub fn get_skipped(&self) -> u64 {
        self.skipped
    }

    /// 成功插值的分割个数.
    #[inline]
    pub fn get_curves(&self) -> u64 {
        self.curves
    }

    /// 非关键切片点总数.
    #[inline]
    pub fn get_points(&self) -> u64 {
        self.points
    }

    /// 以微秒为单位获得插值的总花费自然时间.
    #[inline]
    pub fn get_interp_time_us(&self) -> u64 {
        self.interp_time.get_total_us()
    }

    /// 以微秒为单位获得任务的总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 以微秒为单位获得每条分割的平均插值时间.
    #[inline]
    pub fn get_avg_interp_time_us(&self) -> Option<f64> {
        match self.curves {
            0 => None,
            n => Some(self.get_interp_time_us() as f64 / n as f64),
        }
    }

    /// 平均位移.
    #[inline]
    pub fn get_avg_displacement(&self) -> Option<f64> {
        match self.points {
            0 => None,
            n => Some(self.displacement / n as f64),
        }
    }

    /// 最大位移.
    #[inline]
    pub fn get_max_displacement(&self) -> Option<f64> {
        (self.points > 0).then_some(self.max_displacement)
    }

    /// 发生移动的点所占比例.
    #[inline]
    pub fn get_snapped_ratio(&self) -> Option<f64> {
        match self.points {
            0 => None,
            n => Some(self.snapped as f64 / n as f64),
        }
    }

    /// 最耗时的一次插值.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
