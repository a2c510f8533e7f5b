//! 切片导航. 越界时在 `[0, len_z)` 内循环.

use super::{find_next_key, find_previous_key, Curve};

/// 导航方式.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    /// 前一张切片.
    Previous,
    /// 后一张切片.
    Next,
    /// 前一个关键切片; 没有时后退 `jump` 张.
    PreviousKey,
    /// 后一个关键切片; 没有时前进 `jump` 张.
    NextKey,
}

/// 把可能越界的切片索引循环到 `[0, len_z)` 内. `len_z == 0` 时返回 0.
pub fn wrap_slice(slice: i64, len_z: usize) -> usize {
    if len_z == 0 {
        return 0;
    }
    slice.rem_euclid(len_z as i64) as usize
}

/// 从 `current` 出发按 `step` 导航, 得到新的切片索引.
pub fn step_slice(current: usize, step: Step, curve: &Curve, len_z: usize, jump: usize) -> usize {
    let (cur, jump) = (current as i64, jump as i64);
    let target = match step {
        Step::Previous => cur - 1,
        Step::Next => cur + 1,
        Step::PreviousKey => find_previous_key(current, curve)
            .slice()
            .map_or(cur - jump, |s| s as i64),
        Step::NextKey => find_next_key(current, curve)
            .slice()
            .map_or(cur + jump, |s| s as i64),
    };
    wrap_slice(target, len_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::tests::curve_of;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap_slice(-1, 10), 9);
        assert_eq!(wrap_slice(10, 10), 0);
        assert_eq!(wrap_slice(-25, 10), 5);
        assert_eq!(wrap_slice(3, 0), 0);
    }

    #[test]
    fn test_step() {
        let c = curve_of(&[(20, &[(0.0, 0.0)]), (60, &[(0.0, 0.0)])]);
        assert_eq!(step_slice(30, Step::Previous, &c, 100, 50), 29);
        assert_eq!(step_slice(99, Step::Next, &c, 100, 50), 0);
        assert_eq!(step_slice(30, Step::PreviousKey, &c, 100, 50), 20);
        assert_eq!(step_slice(30, Step::NextKey, &c, 100, 50), 60);
        // 没有关键切片时按 `jump` 跳转.
        assert_eq!(step_slice(10, Step::PreviousKey, &c, 100, 50), 60);
        assert_eq!(step_slice(70, Step::NextKey, &c, 100, 50), 20);
    }
}
