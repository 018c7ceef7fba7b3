//! 分类统计聚合
//!
//! 单一分类下的全部统计状态: 全局 + 当前分节双作用域,
//! 每个作用域并行维护六个窗口 (3/5/12/50/100/1000) 的截尾平均计算器、
//! 最好/最差成绩追踪、成绩计数与图表数据序列。
//!
//! 窗口截尾配置:
//!
//! | 窗口 | 全局截尾% | 分节截尾% |
//! |------|-----------|-----------|
//! | 3    | 0         | 0         |
//! | 5    | 5         | 1         |
//! | 12   | 5         | 1         |
//! | 50/100/1000 | 调用方配置 | 调用方配置 |

use serde::Serialize;

use crate::average::AverageCalculator;
use crate::solve::{SessionId, SolveRecord, SolveTime};
use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// 作用域与图表数据
// ═══════════════════════════════════════════════════════════════════════════

/// 统计作用域选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatScope {
    /// 该分类下全部成绩
    Global,
    /// 仅当前分节的成绩
    CurrentSession,
}

/// 图表数据点, 每条成绩追加一个
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub solve_id: i64,
    /// 计入判罚后的有效时长
    pub time: SolveTime,
    /// 插入该成绩后的 Ao5
    pub ao5: SolveTime,
    /// 插入该成绩后的 Ao12
    pub ao12: SolveTime,
    /// 该成绩刷新 (或追平) 作用域最好成绩时为其毫秒值
    pub personal_best: Option<i64>,
}

// ═══════════════════════════════════════════════════════════════════════════
// ScopeData - 单作用域计算器组
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct ScopeData {
    ao3: AverageCalculator,
    ao5: AverageCalculator,
    ao12: AverageCalculator,
    ao50: AverageCalculator,
    ao100: AverageCalculator,
    ao1000: AverageCalculator,
    /// 最好有效成绩 (DNF 不参与)
    best_time: SolveTime,
    /// 最差有效成绩 (DNF 与非正值不参与)
    worst_time: SolveTime,
    solve_count: u64,
    chart: Vec<ChartPoint>,
}

impl ScopeData {
    /// `small_trim` 为 Ao5/Ao12 的截尾百分比, 大窗口使用 `trim_percent`
    fn new(small_trim: f64, trim_percent: f64) -> Result<Self> {
        Ok(ScopeData {
            ao3: AverageCalculator::new(3, 0.0)?,
            ao5: AverageCalculator::new(5, small_trim)?,
            ao12: AverageCalculator::new(12, small_trim)?,
            ao50: AverageCalculator::new(50, trim_percent)?,
            ao100: AverageCalculator::new(100, trim_percent)?,
            ao1000: AverageCalculator::new(1000, trim_percent)?,
            best_time: SolveTime::Unknown,
            worst_time: SolveTime::Unknown,
            solve_count: 0,
            chart: Vec::new(),
        })
    }

    fn calculators_mut(&mut self) -> [&mut AverageCalculator; 6] {
        [
            &mut self.ao3,
            &mut self.ao5,
            &mut self.ao12,
            &mut self.ao50,
            &mut self.ao100,
            &mut self.ao1000,
        ]
    }

    fn feed(&mut self, solve_id: i64, time: SolveTime) {
        for calc in self.calculators_mut() {
            calc.add_time(time);
        }

        // 最好成绩只看有效时长, DNF 不设 PB
        if let Some(ms) = time.millis() {
            if self.best_time.is_unknown() || time < self.best_time {
                self.best_time = time;
            }
            if ms > 0 && (self.worst_time.is_unknown() || time > self.worst_time) {
                self.worst_time = time;
            }
        }

        self.chart.push(ChartPoint {
            solve_id,
            time,
            ao5: self.ao5.current_average(),
            ao12: self.ao12.current_average(),
            personal_best: if time == self.best_time {
                time.millis()
            } else {
                None
            },
        });
        self.solve_count += 1;
    }

    fn reset(&mut self) {
        for calc in self.calculators_mut() {
            calc.reset();
        }
        self.best_time = SolveTime::Unknown;
        self.worst_time = SolveTime::Unknown;
        self.solve_count = 0;
        self.chart.clear();
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 展示用统计表
// ═══════════════════════════════════════════════════════════════════════════

/// 全局列 + 当前分节列的成组统计
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatGroup<T> {
    pub header: &'static str,
    pub global: T,
    pub current_session: T,
}

/// "进步" 表: 计数/最好成绩/近期平均/波动
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementStats {
    pub solve_count: u64,
    pub best: SolveTime,
    pub ao12: SolveTime,
    pub ao50: SolveTime,
    pub ao100: SolveTime,
    pub deviation: SolveTime,
}

/// "平均" 表: 六个窗口的历史最佳平均
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageStats {
    pub ao3: SolveTime,
    pub ao5: SolveTime,
    pub ao12: SolveTime,
    pub ao50: SolveTime,
    pub ao100: SolveTime,
    pub ao1000: SolveTime,
}

/// "其它" 表: 最值/标准差/均值/总时长
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherStats {
    pub best_time: SolveTime,
    pub worst_time: SolveTime,
    pub deviation: SolveTime,
    pub mean: SolveTime,
    pub solve_count: u64,
    pub total_time: SolveTime,
}

/// 三张展示表的汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsTables {
    pub improvement: StatGroup<ImprovementStats>,
    pub average: StatGroup<AverageStats>,
    pub other: StatGroup<OtherStats>,
}

/// 计时界面的单项统计: 标题 + 展示格式化后的值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEntry {
    pub title: &'static str,
    pub value: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Statistics - 分类聚合器
// ═══════════════════════════════════════════════════════════════════════════

/// 单一分类的统计聚合器。
///
/// 不支持任意删除: 删除/改判由上层通过 [`reset`](Statistics::reset) + 全量重放恢复。
#[derive(Debug, Clone)]
pub struct Statistics {
    global: ScopeData,
    session: ScopeData,
    trim_percent: f64,
    current_session: SessionId,
}

impl Statistics {
    /// `trim_percent` 作用于大窗口 (50/100/1000), 取值 [0, 100)。
    pub fn new(trim_percent: f64, current_session: SessionId) -> Result<Self> {
        Ok(Statistics {
            global: ScopeData::new(5.0, trim_percent)?,
            session: ScopeData::new(1.0, trim_percent)?,
            trim_percent,
            current_session,
        })
    }

    pub fn trim_percent(&self) -> f64 {
        self.trim_percent
    }

    pub fn current_session(&self) -> SessionId {
        self.current_session
    }

    /// 喂入一条成绩: 判罚先行换算, 全局作用域总是更新,
    /// 分节作用域仅在记录属于当前分节时更新。
    pub fn add_solve(&mut self, solve: &SolveRecord) {
        let time = solve.effective_time();
        self.global.feed(solve.id, time);
        if solve.session == self.current_session {
            self.session.feed(solve.id, time);
        }
    }

    /// 清空两个作用域的全部状态, 窗口/截尾配置保留
    pub fn reset(&mut self) {
        self.global.reset();
        self.session.reset();
    }

    fn scope(&self, scope: StatScope) -> &ScopeData {
        match scope {
            StatScope::Global => &self.global,
            StatScope::CurrentSession => &self.session,
        }
    }

    pub fn solve_count(&self, scope: StatScope) -> u64 {
        self.scope(scope).solve_count
    }

    pub fn best_time(&self, scope: StatScope) -> SolveTime {
        self.scope(scope).best_time
    }

    pub fn worst_time(&self, scope: StatScope) -> SolveTime {
        self.scope(scope).worst_time
    }

    /// 成绩顺序的图表数据序列
    pub fn chart_data(&self, scope: StatScope) -> &[ChartPoint] {
        &self.scope(scope).chart
    }

    /// 三张展示表 (进步/平均/其它), 两作用域并列
    pub fn stats_tables(&self) -> StatsTables {
        let improvement = |d: &ScopeData| ImprovementStats {
            solve_count: d.solve_count,
            best: d.best_time,
            ao12: d.ao12.current_average(),
            ao50: d.ao50.current_average(),
            ao100: d.ao100.current_average(),
            deviation: d.ao5.standard_deviation(),
        };
        let average = |d: &ScopeData| AverageStats {
            ao3: d.ao3.best_average(),
            ao5: d.ao5.best_average(),
            ao12: d.ao12.best_average(),
            ao50: d.ao50.best_average(),
            ao100: d.ao100.best_average(),
            ao1000: d.ao1000.best_average(),
        };
        let other = |d: &ScopeData| OtherStats {
            best_time: d.best_time,
            worst_time: d.worst_time,
            deviation: d.ao3.standard_deviation(),
            mean: d.ao3.mean_time(),
            solve_count: d.solve_count,
            total_time: d.ao3.total_time(),
        };

        StatsTables {
            improvement: StatGroup {
                header: "Improvement",
                global: improvement(&self.global),
                current_session: improvement(&self.session),
            },
            average: StatGroup {
                header: "Average",
                global: average(&self.global),
                current_session: average(&self.session),
            },
            other: StatGroup {
                header: "Other",
                global: other(&self.global),
                current_session: other(&self.session),
            },
        }
    }

    /// 计时界面的扁平统计项, 值已按展示规则格式化
    pub fn timer_entries(&self, scope: StatScope) -> Vec<StatEntry> {
        let d = self.scope(scope);
        vec![
            StatEntry {
                title: "deviation",
                value: d.ao5.standard_deviation().to_string(),
            },
            StatEntry {
                title: "mean",
                value: d.ao3.mean_time().to_string(),
            },
            StatEntry {
                title: "best",
                value: d.best_time.to_string(),
            },
            StatEntry {
                title: "count",
                value: d.solve_count.to_string(),
            },
            StatEntry {
                title: "Ao5",
                value: d.ao5.current_average().to_string(),
            },
            StatEntry {
                title: "Ao12",
                value: d.ao12.current_average().to_string(),
            },
            StatEntry {
                title: "Ao50",
                value: d.ao50.current_average().to_string(),
            },
            StatEntry {
                title: "Ao100",
                value: d.ao100.current_average().to_string(),
            },
        ]
    }
}
