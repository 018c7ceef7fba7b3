//! 滑动窗口截尾平均计算器
//!
//! 维护最近 N 次成绩的环形缓冲与三段截尾分区, 每次插入后增量更新:
//! 当前截尾平均 / 历史最佳平均 / 窗口与历史最值 / 运行求和 / Welford 均值方差。
//! 除被逐出值恰为缓存最值时的 O(N) 重扫外, 单次插入为 O(log N)。

use super::trim::TrimBands;
use super::welford::WelfordState;
use crate::solve::SolveTime;
use crate::{Result, StatsError};

/// 窗口达到该大小后, 单个 DNF 不再直接取消平均成绩
pub const MIN_N_TO_ALLOW_ONE_DNF: usize = 5;

// ═══════════════════════════════════════════════════════════════════════════
// AverageOfN - 窗口快照
// ═══════════════════════════════════════════════════════════════════════════

/// 最近一次 Ao-N 计算的快照。
///
/// 窗口未充满时 `times` 为 `None`; 淘汰下标仅在真实发生淘汰时给出
/// (N >= 5 且窗口内 DNF 未超容忍), 否则为 `None`。
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AverageOfN {
    /// 参与计算的原始窗口值, 最旧在前
    times: Option<Vec<SolveTime>>,
    /// 当前 Ao-N 值
    average: SolveTime,
    /// 被淘汰最好成绩在 `times` 中的下标
    best_time_index: Option<usize>,
    /// 被淘汰最差成绩在 `times` 中的下标 (可能指向 DNF)
    worst_time_index: Option<usize>,
    lower_trim_sum: SolveTime,
    middle_trim_sum: SolveTime,
    upper_trim_sum: SolveTime,
}

impl AverageOfN {
    pub fn times(&self) -> Option<&[SolveTime]> {
        self.times.as_deref()
    }

    pub fn average(&self) -> SolveTime {
        self.average
    }

    pub fn best_time_index(&self) -> Option<usize> {
        self.best_time_index
    }

    pub fn worst_time_index(&self) -> Option<usize> {
        self.worst_time_index
    }

    pub fn lower_trim_sum(&self) -> SolveTime {
        self.lower_trim_sum
    }

    pub fn middle_trim_sum(&self) -> SolveTime {
        self.middle_trim_sum
    }

    pub fn upper_trim_sum(&self) -> SolveTime {
        self.upper_trim_sum
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// AverageCalculator - 滑动窗口计算器
// ═══════════════════════════════════════════════════════════════════════════

/// "average of N" 滑动窗口计算器。
///
/// 所有时间与平均值均为整数毫秒, 平均值向下取整。
#[derive(Debug, Clone)]
pub struct AverageCalculator {
    /// 窗口大小
    n: usize,
    /// 每侧截尾数量 = ceil(n * trim_percent / 100), 上限 (n-1)/2
    trim_size: usize,
    /// 窗口内可容忍的 DNF 数量, 超出后整个平均判为 DNF
    num_acceptable_dnfs: usize,
    /// 环形缓冲: 最近 n 次原始值
    times: Vec<SolveTime>,
    /// 下一写入位置 (满窗时即最旧值位置)
    next: usize,
    /// 历史插入总数
    num_solves: u64,
    /// 当前窗口内 DNF 数量
    num_current_dnfs: usize,
    /// 历史 DNF 总数
    num_all_time_dnfs: u64,
    /// 截尾三段分区 (窗口充满后生效)
    bands: TrimBands,
    /// 历史有效成绩的在线均值/方差
    welford: WelfordState,
    /// 窗口内有效成绩求和
    current_sum: Option<i64>,
    /// 历史有效成绩求和
    all_time_sum: Option<i64>,
    /// 窗口内最好成绩
    current_best_time: SolveTime,
    /// 窗口内最差有效成绩 (非 DNF)
    current_worst_time: SolveTime,
    /// 当前 Ao-N 值
    current_average: SolveTime,
    /// 历史最好成绩
    all_time_best_time: SolveTime,
    /// 历史最差有效成绩
    all_time_worst_time: SolveTime,
    /// 历史最佳 Ao-N 值
    all_time_best_average: SolveTime,
}

impl AverageCalculator {
    /// 创建 Ao-N 计算器。
    ///
    /// `n` 必须为正; `trim_percent` 取值 [0, 100)。
    /// 截尾数量限制在 (n-1)/2 以内, 保证中段恒非空。
    pub fn new(n: usize, trim_percent: f64) -> Result<Self> {
        if n == 0 {
            return Err(StatsError::InvalidParameter(format!(
                "number of solves must be > 0: {}",
                n
            )));
        }
        if !(0.0..100.0).contains(&trim_percent) {
            return Err(StatsError::InvalidParameter(format!(
                "trim percent must be in [0, 100): {}",
                trim_percent
            )));
        }

        let trim_size = ((n as f64 * trim_percent / 100.0).ceil() as usize).min((n - 1) / 2);

        Ok(AverageCalculator {
            n,
            trim_size,
            num_acceptable_dnfs: trim_size,
            times: vec![SolveTime::Unknown; n],
            next: 0,
            num_solves: 0,
            num_current_dnfs: 0,
            num_all_time_dnfs: 0,
            bands: TrimBands::new(trim_size),
            welford: WelfordState::new(),
            current_sum: None,
            all_time_sum: None,
            current_best_time: SolveTime::Unknown,
            current_worst_time: SolveTime::Unknown,
            current_average: SolveTime::Unknown,
            all_time_best_time: SolveTime::Unknown,
            all_time_worst_time: SolveTime::Unknown,
            all_time_best_average: SolveTime::Unknown,
        })
    }

    /// 清空全部计数/缓冲/分区, 回到刚构造的状态。n 与截尾配置保留。
    pub fn reset(&mut self) {
        self.times.fill(SolveTime::Unknown);
        self.next = 0;
        self.num_solves = 0;
        self.num_current_dnfs = 0;
        self.num_all_time_dnfs = 0;
        self.bands.clear();
        self.welford.reset();
        self.current_sum = None;
        self.all_time_sum = None;
        self.current_best_time = SolveTime::Unknown;
        self.current_worst_time = SolveTime::Unknown;
        self.current_average = SolveTime::Unknown;
        self.all_time_best_time = SolveTime::Unknown;
        self.all_time_worst_time = SolveTime::Unknown;
        self.all_time_best_average = SolveTime::Unknown;
    }

    /// 窗口大小
    pub fn n(&self) -> usize {
        self.n
    }

    /// 插入一次成绩。
    ///
    /// 仅接受正时长或 DNF; 其余输入记录日志后忽略, 状态不变。
    pub fn add_time(&mut self, time: SolveTime) {
        match time {
            SolveTime::Dnf => {}
            SolveTime::Time(ms) if ms > 0 => {}
            other => {
                log::error!("AverageCalculator: time must be > 0 or DNF: {:?}", other);
                return;
            }
        }

        self.num_solves += 1;
        let n = self.n as u64;

        // 满窗后的插入: 写入位置上的旧值即将被逐出
        let ejected = if self.num_solves > n {
            self.times[self.next]
        } else {
            SolveTime::Unknown
        };

        self.times[self.next] = time;
        self.next = (self.next + 1) % self.n;

        // 恰好充满窗口: 批量建立截尾分区
        if self.num_solves == n {
            self.bands.seed(&self.times);
        }

        self.update_dnf_counts(time, ejected);
        self.update_current_best_and_worst(time, ejected);
        self.update_sums(time, ejected);

        // 第二个满窗插入起, 分区走增量波纹
        if self.num_solves > n {
            self.bands.replace(ejected, time);
        }

        if let Some(ms) = time.millis() {
            self.welford.update(ms as f64);
        }

        self.update_current_average();
        self.update_all_time_best_and_worst();
        self.update_all_time_best_average();
    }

    /// 批量插入
    pub fn add_times(&mut self, times: &[SolveTime]) {
        for &time in times {
            self.add_time(time);
        }
    }

    fn update_dnf_counts(&mut self, added: SolveTime, ejected: SolveTime) {
        if added.is_dnf() {
            self.num_current_dnfs += 1;
            self.num_all_time_dnfs += 1;
        }
        if ejected.is_dnf() {
            self.num_current_dnfs -= 1;
        }
    }

    fn update_current_best_and_worst(&mut self, added: SolveTime, ejected: SolveTime) {
        if added.is_dnf() {
            if ejected == self.current_best_time || ejected == self.current_worst_time {
                self.current_best_time = SolveTime::Unknown;
                self.current_worst_time = SolveTime::Unknown;
            }
        } else {
            if self.current_best_time.is_unknown() || added <= self.current_best_time {
                self.current_best_time = added;
            } else if ejected == self.current_best_time {
                self.current_best_time = SolveTime::Unknown;
            }

            if self.current_worst_time.is_unknown() || added >= self.current_worst_time {
                self.current_worst_time = added;
            } else if ejected == self.current_worst_time {
                self.current_worst_time = SolveTime::Unknown;
            }
        }

        let num_current = self.num_solves.min(self.n as u64) as usize;

        // 被逐出值恰为缓存最值: 仅当窗口内仍有有效成绩时重扫
        if self.num_current_dnfs != num_current
            && (self.current_best_time.is_unknown() || self.current_worst_time.is_unknown())
        {
            let mut best = SolveTime::Unknown;
            let mut worst = SolveTime::Unknown;
            for &t in &self.times[..num_current] {
                if t.is_time() {
                    if best.is_unknown() || t < best {
                        best = t;
                    }
                    if worst.is_unknown() || t > worst {
                        worst = t;
                    }
                }
            }
            self.current_best_time = best;
            self.current_worst_time = worst;
        }
    }

    fn update_sums(&mut self, added: SolveTime, ejected: SolveTime) {
        if let Some(ms) = added.millis() {
            self.current_sum = Some(self.current_sum.unwrap_or(0) + ms);
            self.all_time_sum = Some(self.all_time_sum.unwrap_or(0) + ms);
        }
        if let Some(ms) = ejected.millis() {
            self.current_sum = self.current_sum.map(|s| s - ms);
        }
        // 窗口内不再有有效成绩
        if self.current_sum == Some(0) {
            self.current_sum = None;
        }
    }

    fn update_current_average(&mut self) {
        let n = self.n;

        self.current_average = if self.num_solves < n as u64 {
            SolveTime::Unknown
        } else if self.num_current_dnfs == n {
            SolveTime::Dnf
        } else if n >= MIN_N_TO_ALLOW_ONE_DNF {
            if self.num_current_dnfs > self.num_acceptable_dnfs {
                SolveTime::Dnf
            } else {
                // 首个 DNF 顶替"最差"淘汰位, 其后每个被容忍的 DNF 进一步缩小分母
                let extra_dnfs = self.num_current_dnfs.saturating_sub(1);
                let denom = n - 2 * self.trim_size - extra_dnfs;
                match self.bands.middle_sum() {
                    Some(sum) if denom > 0 => SolveTime::Time(sum / denom as i64),
                    _ => SolveTime::Unknown,
                }
            }
        } else if self.num_current_dnfs > 0 {
            // 小窗口: 零容忍
            SolveTime::Dnf
        } else {
            match self.current_sum {
                Some(sum) => SolveTime::Time(sum / n as i64),
                None => SolveTime::Unknown,
            }
        };
    }

    fn update_all_time_best_and_worst(&mut self) {
        self.all_time_best_time = match (self.all_time_best_time, self.current_best_time) {
            (SolveTime::Unknown, cur) => cur,
            (best, SolveTime::Unknown) => best,
            (best, cur) => best.min(cur),
        };

        self.all_time_worst_time = match (self.all_time_worst_time, self.current_worst_time) {
            (SolveTime::Unknown, cur) => cur,
            (worst, SolveTime::Unknown) => worst,
            (worst, cur) => worst.max(cur),
        };
    }

    fn update_all_time_best_average(&mut self) {
        match (self.all_time_best_average, self.current_average) {
            (SolveTime::Unknown | SolveTime::Dnf, cur) => {
                self.all_time_best_average = cur;
            }
            (SolveTime::Time(best), SolveTime::Time(cur)) if cur < best => {
                self.all_time_best_average = SolveTime::Time(cur);
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // 读取接口
    // ------------------------------------------------------------------

    /// 当前 Ao-N 值
    pub fn current_average(&self) -> SolveTime {
        self.current_average
    }

    /// 历史最佳 Ao-N 值
    pub fn best_average(&self) -> SolveTime {
        self.all_time_best_average
    }

    /// 历史最好成绩
    pub fn best_time(&self) -> SolveTime {
        self.all_time_best_time
    }

    /// 历史最差有效成绩 (非 DNF)
    pub fn worst_time(&self) -> SolveTime {
        self.all_time_worst_time
    }

    /// 历史有效成绩总时长
    pub fn total_time(&self) -> SolveTime {
        match self.all_time_sum {
            Some(sum) => SolveTime::Time(sum),
            None => SolveTime::Unknown,
        }
    }

    /// 历史有效成绩的算术平均, 向下取整
    pub fn mean_time(&self) -> SolveTime {
        if self.welford.count == 0 {
            SolveTime::Unknown
        } else {
            SolveTime::Time(self.welford.mean.floor() as i64)
        }
    }

    /// 历史有效成绩的样本标准差, 向下取整; 有效样本不足 3 个时为 Unknown
    pub fn standard_deviation(&self) -> SolveTime {
        match self.welford.sample_std() {
            Some(std) => SolveTime::Time(std.floor() as i64),
            None => SolveTime::Unknown,
        }
    }

    /// 历史插入总数 (含 DNF)
    pub fn num_solves(&self) -> u64 {
        self.num_solves
    }

    /// 历史 DNF 总数
    pub fn num_dnf_solves(&self) -> u64 {
        self.num_all_time_dnfs
    }

    /// 抓取包含最近一次插入的 Ao-N 计算快照
    pub fn average_of_n(&self) -> AverageOfN {
        let n = self.n;
        let average = self.current_average;
        let lower_trim_sum = self.bands.lower_sum();
        let middle_trim_sum = self.bands.middle_sum_time();
        let upper_trim_sum = self.bands.upper_sum();

        if average.is_unknown() || self.num_solves < n as u64 {
            return AverageOfN {
                times: None,
                average,
                best_time_index: None,
                worst_time_index: None,
                lower_trim_sum,
                middle_trim_sum,
                upper_trim_sum,
            };
        }

        // 环形缓冲 → 最旧在前: 满窗时 next 即最旧值位置
        let mut times = Vec::with_capacity(n);
        times.extend_from_slice(&self.times[self.next..]);
        times.extend_from_slice(&self.times[..self.next]);

        let mut best_time_index = None;
        let mut worst_time_index = None;

        // 只有真实发生淘汰时才给出下标
        if n >= MIN_N_TO_ALLOW_ONE_DNF && self.num_current_dnfs <= self.num_acceptable_dnfs {
            let best_target = if n - self.num_current_dnfs > 1 {
                self.current_best_time
            } else {
                SolveTime::Unknown
            };
            let worst_target = if self.num_current_dnfs == 0 {
                self.current_worst_time
            } else {
                SolveTime::Dnf
            };

            for (i, &t) in times.iter().enumerate() {
                if best_time_index.is_none() && t == best_target {
                    best_time_index = Some(i);
                } else if worst_time_index.is_none() && t == worst_target {
                    worst_time_index = Some(i);
                }
                if best_time_index.is_some() && worst_time_index.is_some() {
                    break;
                }
            }
        }

        AverageOfN {
            times: Some(times),
            average,
            best_time_index,
            worst_time_index,
            lower_trim_sum,
            middle_trim_sum,
            upper_trim_sum,
        }
    }

    /// 截尾分区元素总数 (测试分区不变式用)
    pub fn trim_band_total(&self) -> usize {
        self.bands.total_len()
    }
}
