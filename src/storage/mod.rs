//! 存储协作方
//!
//! 引擎自身不持久化: 成绩记录的存取通过 [`SolveStore`] 接口委托给调用方,
//! 统计状态按需从记录全量重建。附带 [`MemoryStore`] 内存实现,
//! 供测试与无持久化场景使用。

use serde::{Deserialize, Serialize};

use crate::solve::{CategoryCode, NewSolve, Penalty, SessionId, SolveRecord};
use crate::{Result, StatsError};

/// 按分节过滤查询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionFilter {
    /// 全部分节
    All,
    /// 仅指定分节
    Only(SessionId),
    /// 指定分节之外的历史记录
    Excluding(SessionId),
}

impl SessionFilter {
    pub fn matches(&self, session: SessionId) -> bool {
        match self {
            SessionFilter::All => true,
            SessionFilter::Only(id) => session == *id,
            SessionFilter::Excluding(id) => session != *id,
        }
    }
}

/// 成绩记录存储接口。
///
/// 实现方负责 id 分配与记录顺序; 查询按存储顺序返回,
/// 重放按该顺序逐条喂入聚合器。失败以 [`StatsError::StorageError`]
/// 或 [`StatsError::NotFound`] 原样上抛, 引擎不吞错。
pub trait SolveStore {
    /// 持久化一条新成绩, 返回分配的 id
    fn insert(&mut self, solve: &NewSolve) -> Result<i64>;

    /// 按 id 删除
    fn delete_by_id(&mut self, id: i64) -> Result<()>;

    /// 按 id 改判
    fn update_penalty_by_id(&mut self, id: i64, penalty: Penalty) -> Result<()>;

    /// 按分类查询, 可叠加分节过滤, 存储顺序返回
    fn query_by_category(
        &self,
        category: &CategoryCode,
        filter: SessionFilter,
    ) -> Result<Vec<SolveRecord>>;

    /// 出现过的分节 id, 升序去重
    fn sessions(&self) -> Result<Vec<SessionId>>;
}

// ═══════════════════════════════════════════════════════════════════════════
// MemoryStore - 内存实现
// ═══════════════════════════════════════════════════════════════════════════

/// 纯内存存储: 单调递增 id, 插入顺序即存储顺序
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    solves: Vec<SolveRecord>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            solves: Vec::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.solves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solves.is_empty()
    }
}

impl SolveStore for MemoryStore {
    fn insert(&mut self, solve: &NewSolve) -> Result<i64> {
        let id = self.next_id;
        self.next_id += 1;
        self.solves.push(solve.clone().into_record(id));
        log::debug!("MemoryStore: inserted solve id={}", id);
        Ok(id)
    }

    fn delete_by_id(&mut self, id: i64) -> Result<()> {
        let pos = self
            .solves
            .iter()
            .position(|s| s.id == id)
            .ok_or(StatsError::NotFound(id))?;
        self.solves.remove(pos);
        log::debug!("MemoryStore: deleted solve id={}", id);
        Ok(())
    }

    fn update_penalty_by_id(&mut self, id: i64, penalty: Penalty) -> Result<()> {
        let solve = self
            .solves
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StatsError::NotFound(id))?;
        solve.penalty = penalty;
        Ok(())
    }

    fn query_by_category(
        &self,
        category: &CategoryCode,
        filter: SessionFilter,
    ) -> Result<Vec<SolveRecord>> {
        Ok(self
            .solves
            .iter()
            .filter(|s| &s.category == category && filter.matches(s.session))
            .cloned()
            .collect())
    }

    fn sessions(&self) -> Result<Vec<SessionId>> {
        let mut sessions: Vec<SessionId> = self.solves.iter().map(|s| s.session).collect();
        sessions.sort_unstable();
        sessions.dedup();
        Ok(sessions)
    }
}
