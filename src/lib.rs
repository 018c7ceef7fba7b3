//! # CUBESTATS
//!
//! 增量式魔方计时统计引擎 - 滑动窗口截尾平均
//!
//! ## 核心能力
//!
//! - **有序多重集合** (average::AverageComponent): O(log N) 插入/删除, O(1) 缓存最值与求和
//! - **滑动窗口截尾平均** (average::AverageCalculator): 环形缓冲 + 三段截尾分区,
//!   每次插入 O(log N) 内更新 Ao-N / 最佳平均 / 最值 / 总和 / 标准差
//! - **分类统计聚合** (statistics::Statistics): 全局 + 当前分节双作用域,
//!   六个窗口 (3/5/12/50/100/1000) 并行喂入, 图表数据序列与展示用统计表
//! - **外观层** (context::StatsContext): 绑定分类选择/存储/聚合器,
//!   删除与改判通过全量重放恢复增量状态
//!
//! ## 架构设计
//!
//! ```text
//! 存储记录 (storage::SolveStore)
//!     ↓ 按分类查询/重放
//! 统计聚合 (statistics::Statistics)
//!     ↓ 每条成绩喂入 6 个窗口 × 2 个作用域
//! 窗口计算器 (average::AverageCalculator)
//!     ↓
//! 截尾分区 (average::TrimBands) ← 有序多重集合 (average::AverageComponent)
//! ```
//!
//! ## 约束
//!
//! - 单线程同步调用, 引擎内部无 I/O、无并发
//! - 引擎状态不持久化, 按需从存储记录重建
//! - 不支持任意值的增量删除: 删除/改判 = 重置 + 全量重放

// ============================================================================
// 外部依赖
// ============================================================================

// 序列化
pub use serde;
pub use serde_json;

// 时间
pub use chrono;

// 日志
pub use log;

// ============================================================================
// 内部模块
// ============================================================================

/// 成绩领域类型 - 时间值/判罚/成绩记录
pub mod solve;

/// 平均计算核心 - 有序多重集合/截尾分区/滑动窗口计算器
pub mod average;

/// 分类统计聚合 - 双作用域计算器组/图表数据/统计表
pub mod statistics;

/// 存储协作方 - 成绩记录存取接口与内存实现
pub mod storage;

/// 外观层 - 分类选择 + 存储 + 聚合器编排
pub mod context;

// ============================================================================
// 重导出常用类型
// ============================================================================

pub use average::{AverageCalculator, AverageOfN};
pub use context::StatsContext;
pub use solve::{CategoryCode, NewSolve, Penalty, SessionId, SolveRecord, SolveTime};
pub use statistics::{ChartPoint, StatEntry, StatScope, Statistics, StatsTables};
pub use storage::{MemoryStore, SessionFilter, SolveStore};

// ============================================================================
// 全局错误类型
// ============================================================================

/// 统计引擎错误类型
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Record not found: {0}")]
    NotFound(i64),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;
