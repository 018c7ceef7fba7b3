//! 成绩领域类型
//!
//! 提供统计引擎消费的纯数据类型：
//! - SolveTime: 带标签的时间值 (未知/有效毫秒/DNF)
//! - Penalty: 判罚标记与有效时长换算
//! - SolveRecord / NewSolve: 存储层交换的成绩记录
//! - 展示用时间格式化

use serde::{Deserialize, Serialize};
use std::fmt;

/// "+2" 判罚的固定加时 (毫秒)
pub const PLUS_TWO_MILLIS: i64 = 2000;

// ═══════════════════════════════════════════════════════════════════════════
// SolveTime - 带标签的时间值
// ═══════════════════════════════════════════════════════════════════════════

/// 一次尝试的有效时长, 或计算器输出的特殊状态。
///
/// 派生的 `Ord` 保证 `Unknown < Time(a) < Time(b) < Dnf` (a < b)：
/// DNF 在截尾排序中永远落在最高段, Unknown 不会进入窗口或多重集合。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum SolveTime {
    /// 尚不可计算 (样本不足等), 仅作为输出
    #[default]
    Unknown,
    /// 有效成绩, 正整数毫秒
    Time(i64),
    /// 无效尝试 (did-not-finish), 占据窗口槽位但不参与数值聚合
    Dnf,
}

impl SolveTime {
    pub fn is_unknown(&self) -> bool {
        matches!(self, SolveTime::Unknown)
    }

    pub fn is_dnf(&self) -> bool {
        matches!(self, SolveTime::Dnf)
    }

    /// 是否为有效时长
    pub fn is_time(&self) -> bool {
        matches!(self, SolveTime::Time(_))
    }

    /// 有效时长的毫秒数
    pub fn millis(&self) -> Option<i64> {
        match self {
            SolveTime::Time(ms) => Some(*ms),
            _ => None,
        }
    }
}

impl fmt::Display for SolveTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveTime::Unknown => write!(f, "-"),
            SolveTime::Time(ms) => write!(f, "{}", format_millis(*ms)),
            SolveTime::Dnf => write!(f, "DNF"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Penalty - 判罚标记
// ═══════════════════════════════════════════════════════════════════════════

/// 记录上的判罚标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Penalty {
    /// 无判罚
    #[default]
    None,
    /// 加 2 秒
    PlusTwo,
    /// 取消成绩
    Dnf,
}

impl Penalty {
    /// 将原始计时换算为有效时长
    pub fn apply(&self, raw_millis: i64) -> SolveTime {
        match self {
            Penalty::None => SolveTime::Time(raw_millis),
            Penalty::PlusTwo => SolveTime::Time(raw_millis + PLUS_TWO_MILLIS),
            Penalty::Dnf => SolveTime::Dnf,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 成绩记录
// ═══════════════════════════════════════════════════════════════════════════

/// 分节标识
pub type SessionId = i64;

/// 打乱分类码 (如 "333" / "222" / 练习子集码)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CategoryCode(String);

impl CategoryCode {
    pub fn new(code: impl Into<String>) -> Self {
        CategoryCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryCode {
    fn from(code: &str) -> Self {
        CategoryCode(code.to_string())
    }
}

/// 已持久化的成绩记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRecord {
    pub id: i64,
    /// 打乱序列 (对引擎不透明)
    pub scramble: String,
    /// 原始计时, 未计判罚 (毫秒)
    pub time_millis: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub penalty: Penalty,
    pub session: SessionId,
    pub category: CategoryCode,
}

impl SolveRecord {
    /// 计入判罚后的有效时长
    pub fn effective_time(&self) -> SolveTime {
        self.penalty.apply(self.time_millis)
    }
}

/// 待持久化的成绩记录 (id 由存储层分配)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSolve {
    pub scramble: String,
    pub time_millis: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub penalty: Penalty,
    pub session: SessionId,
    pub category: CategoryCode,
}

impl NewSolve {
    pub fn into_record(self, id: i64) -> SolveRecord {
        SolveRecord {
            id,
            scramble: self.scramble,
            time_millis: self.time_millis,
            timestamp: self.timestamp,
            penalty: self.penalty,
            session: self.session,
            category: self.category,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// 时间格式化
// ═══════════════════════════════════════════════════════════════════════════

/// 毫秒 → 展示字符串: `h:mm:ss.cc` / `m:ss.cc` / `s.cc`
pub fn format_millis(millis: i64) -> String {
    let millis = millis.max(0);
    let hours = millis / (1000 * 60 * 60);
    let minutes = (millis / (1000 * 60)) % 60;
    let seconds = (millis / 1000) % 60;
    let centis = (millis % 1000) / 10;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    } else if minutes > 0 {
        format!("{}:{:02}.{:02}", minutes, seconds, centis)
    } else {
        format!("{}.{:02}", seconds, centis)
    }
}
