//! 截尾分区 - 窗口值按名次切成下段/中段/上段
//!
//! 三段各自是一个有序多重集合, 段间始终满足
//! `max(lower) <= min(middle)` 且 `max(middle) <= min(upper)`。
//! 逐出/插入通过三向波纹 (replace) 在 O(log N) 内维护分区,
//! 与计算器其余逻辑解耦, 可独立测试。

use super::component::AverageComponent;
use crate::solve::SolveTime;

/// 下段/中段/上段三向分区。
///
/// `trim_size == 0` 时退化为仅中段 (无截尾)。
#[derive(Debug, Clone, Default)]
pub struct TrimBands {
    lower: AverageComponent,
    middle: AverageComponent,
    upper: AverageComponent,
    trim_size: usize,
}

impl TrimBands {
    pub fn new(trim_size: usize) -> Self {
        TrimBands {
            lower: AverageComponent::new(),
            middle: AverageComponent::new(),
            upper: AverageComponent::new(),
            trim_size,
        }
    }

    pub fn trim_size(&self) -> usize {
        self.trim_size
    }

    /// 首次充满窗口时的批量分区: 按排序名次分发到三段。
    pub fn seed(&mut self, window: &[SolveTime]) {
        let n = window.len();
        let mut sorted: Vec<SolveTime> = window.to_vec();
        sorted.sort();

        for (rank, &val) in sorted.iter().enumerate() {
            if rank < self.trim_size {
                self.lower.put(val);
            } else if rank >= n - self.trim_size {
                self.upper.put(val);
            } else {
                self.middle.put(val);
            }
        }
    }

    /// 增量波纹更新: 移除被逐出值, 插入新值, 并在相邻段之间搬运边界值,
    /// 保证段序不变且 `|lower|+|middle|+|upper|` 恒等于窗口容量。
    ///
    /// 相等值的归属由多重集合的自然序决定 (按名次, 与插入时间无关)。
    pub fn replace(&mut self, ejected: SolveTime, added: SolveTime) {
        if self.trim_size == 0 {
            self.middle.remove(ejected);
            self.middle.put(added);
            return;
        }

        if ejected <= self.lower.get_greatest() {
            // 被逐出值属于下段
            self.lower.remove(ejected);

            if added <= self.middle.get_least() {
                self.lower.put(added);
            } else if added >= self.upper.get_least() {
                let mid_least = self.middle.get_least();
                self.middle.remove(mid_least);
                self.lower.put(mid_least);
                let up_least = self.upper.get_least();
                self.upper.remove(up_least);
                self.middle.put(up_least);
                self.upper.put(added);
            } else {
                let mid_least = self.middle.get_least();
                self.middle.remove(mid_least);
                self.lower.put(mid_least);
                self.middle.put(added);
            }
        } else if ejected >= self.upper.get_least() {
            // 被逐出值属于上段
            self.upper.remove(ejected);

            if added >= self.middle.get_greatest() {
                self.upper.put(added);
            } else if added <= self.lower.get_greatest() {
                let mid_greatest = self.middle.get_greatest();
                self.middle.remove(mid_greatest);
                self.upper.put(mid_greatest);
                let low_greatest = self.lower.get_greatest();
                self.lower.remove(low_greatest);
                self.middle.put(low_greatest);
                self.lower.put(added);
            } else {
                let mid_greatest = self.middle.get_greatest();
                self.middle.remove(mid_greatest);
                self.upper.put(mid_greatest);
                self.middle.put(added);
            }
        } else {
            // 被逐出值属于中段
            self.middle.remove(ejected);

            if added >= self.upper.get_least() {
                let up_least = self.upper.get_least();
                self.upper.remove(up_least);
                self.middle.put(up_least);
                self.upper.put(added);
            } else if added <= self.lower.get_greatest() {
                let low_greatest = self.lower.get_greatest();
                self.lower.remove(low_greatest);
                self.middle.put(low_greatest);
                self.lower.put(added);
            } else {
                self.middle.put(added);
            }
        }
    }

    /// 中段求和 (截尾平均的分子)
    pub fn middle_sum(&self) -> Option<i64> {
        self.middle.sum_millis()
    }

    pub fn lower_sum(&self) -> SolveTime {
        self.lower.get_sum()
    }

    pub fn middle_sum_time(&self) -> SolveTime {
        self.middle.get_sum()
    }

    pub fn upper_sum(&self) -> SolveTime {
        self.upper.get_sum()
    }

    /// 三段元素总数
    pub fn total_len(&self) -> usize {
        self.lower.len() + self.middle.len() + self.upper.len()
    }

    pub fn band_lens(&self) -> (usize, usize, usize) {
        (self.lower.len(), self.middle.len(), self.upper.len())
    }

    pub fn clear(&mut self) {
        self.lower.clear();
        self.middle.clear();
        self.upper.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::SolveTime::{Dnf, Time};

    fn t(ms: i64) -> SolveTime {
        Time(ms)
    }

    /// lower={10}, middle={20,30,40}, upper={50}
    fn seeded() -> TrimBands {
        let mut bands = TrimBands::new(1);
        bands.seed(&[t(30), t(10), t(50), t(20), t(40)]);
        assert_eq!(bands.band_lens(), (1, 3, 1));
        bands
    }

    fn assert_bands(bands: &TrimBands, lower: &[i64], middle: &[i64], upper: &[i64]) {
        assert_eq!(
            bands.band_lens(),
            (lower.len(), middle.len(), upper.len()),
            "band sizes"
        );
        assert_eq!(bands.total_len(), lower.len() + middle.len() + upper.len());
        let sum = |xs: &[i64]| xs.iter().sum::<i64>();
        assert_eq!(bands.lower_sum(), t(sum(lower)), "lower sum");
        assert_eq!(bands.middle_sum_time(), t(sum(middle)), "middle sum");
        assert_eq!(bands.upper_sum(), t(sum(upper)), "upper sum");
    }

    #[test]
    fn test_seed_partition() {
        let bands = seeded();
        assert_bands(&bands, &[10], &[20, 30, 40], &[50]);
    }

    #[test]
    fn test_seed_no_trim() {
        let mut bands = TrimBands::new(0);
        bands.seed(&[t(500), t(250), t(150)]);
        assert_bands(&bands, &[], &[150, 250, 500], &[]);
    }

    #[test]
    fn test_eject_lower_add_lower() {
        let mut bands = seeded();
        bands.replace(t(10), t(5));
        assert_bands(&bands, &[5], &[20, 30, 40], &[50]);
    }

    #[test]
    fn test_eject_lower_add_middle() {
        let mut bands = seeded();
        bands.replace(t(10), t(35));
        assert_bands(&bands, &[20], &[30, 35, 40], &[50]);
    }

    #[test]
    fn test_eject_lower_add_upper() {
        let mut bands = seeded();
        bands.replace(t(10), t(99));
        assert_bands(&bands, &[20], &[30, 40, 50], &[99]);
    }

    #[test]
    fn test_eject_middle_add_lower() {
        let mut bands = seeded();
        bands.replace(t(30), t(5));
        assert_bands(&bands, &[5], &[10, 20, 40], &[50]);
    }

    #[test]
    fn test_eject_middle_add_middle() {
        let mut bands = seeded();
        bands.replace(t(30), t(35));
        assert_bands(&bands, &[10], &[20, 35, 40], &[50]);
    }

    #[test]
    fn test_eject_middle_add_upper() {
        let mut bands = seeded();
        bands.replace(t(30), t(99));
        assert_bands(&bands, &[10], &[20, 40, 50], &[99]);
    }

    #[test]
    fn test_eject_upper_add_lower() {
        let mut bands = seeded();
        bands.replace(t(50), t(5));
        assert_bands(&bands, &[5], &[10, 20, 30], &[40]);
    }

    #[test]
    fn test_eject_upper_add_middle() {
        let mut bands = seeded();
        bands.replace(t(50), t(35));
        assert_bands(&bands, &[10], &[20, 30, 35], &[40]);
    }

    #[test]
    fn test_eject_upper_add_upper() {
        let mut bands = seeded();
        bands.replace(t(50), t(99));
        assert_bands(&bands, &[10], &[20, 30, 40], &[99]);
    }

    #[test]
    fn test_all_equal_values() {
        let mut bands = TrimBands::new(1);
        bands.seed(&[t(100); 5]);
        assert_bands(&bands, &[100], &[100, 100, 100], &[100]);

        // 相等值的逐出按名次确定, 分区大小不变
        bands.replace(t(100), t(100));
        assert_bands(&bands, &[100], &[100, 100, 100], &[100]);

        bands.replace(t(100), t(42));
        assert_eq!(bands.total_len(), 5);
        assert_eq!(bands.lower_sum(), t(42));
    }

    #[test]
    fn test_dnf_sorts_into_upper() {
        let mut bands = TrimBands::new(1);
        bands.seed(&[t(150), t(400), t(200), Dnf, t(800)]);
        // 排序: 150, 200, 400, 800, DNF
        assert_eq!(bands.band_lens(), (1, 3, 1));
        assert_eq!(bands.lower_sum(), t(150));
        assert_eq!(bands.middle_sum_time(), t(1400));
        // 上段只有 DNF, 求和无有效值
        assert_eq!(bands.upper_sum(), SolveTime::Unknown);
    }

    #[test]
    fn test_no_trim_replace() {
        let mut bands = TrimBands::new(0);
        bands.seed(&[t(500), t(250), t(150)]);
        bands.replace(t(500), t(800));
        assert_bands(&bands, &[], &[150, 250, 800], &[]);
    }
}
