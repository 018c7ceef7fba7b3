//! 外观层
//!
//! 将分类选择、存储访问与统计聚合编排为单一入口:
//! - 写入先行: 成绩先持久化, 成功后才改动内存统计
//! - 删除/改判没有增量路径: 存储操作成功后对当前分类重置 + 全量重放
//! - 分类切换即从存储全量重建, 统计实例逐分类缓存

use std::collections::HashMap;

use crate::solve::{CategoryCode, NewSolve, Penalty, SessionId};
use crate::statistics::{ChartPoint, StatEntry, StatScope, Statistics, StatsTables};
use crate::storage::{SessionFilter, SolveStore};
use crate::{Result, StatsError};

/// 统计引擎外观。
///
/// 每个实例持有自己的存储与分类→聚合器映射, 互不共享。
#[derive(Debug)]
pub struct StatsContext<S: SolveStore> {
    store: S,
    stats: HashMap<CategoryCode, Statistics>,
    current_category: CategoryCode,
    current_session: SessionId,
    trim_percent: f64,
}

impl<S: SolveStore> StatsContext<S> {
    /// 创建外观并从存储重建当前分类的统计。
    pub fn new(
        store: S,
        category: CategoryCode,
        session: SessionId,
        trim_percent: f64,
    ) -> Result<Self> {
        let mut ctx = StatsContext {
            store,
            stats: HashMap::new(),
            current_category: category.clone(),
            current_session: session,
            trim_percent,
        };
        ctx.rebuild_category(&category)?;
        Ok(ctx)
    }

    pub fn current_category(&self) -> &CategoryCode {
        &self.current_category
    }

    pub fn current_session(&self) -> SessionId {
        self.current_session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// 从存储全量重放一个分类, 覆盖/新建其聚合器
    fn rebuild_category(&mut self, category: &CategoryCode) -> Result<()> {
        let records = self.store.query_by_category(category, SessionFilter::All)?;
        log::info!(
            "StatsContext: rebuilding category {} from {} solves",
            category,
            records.len()
        );

        let mut stats = Statistics::new(self.trim_percent, self.current_session)?;
        for record in &records {
            stats.add_solve(record);
        }
        self.stats.insert(category.clone(), stats);
        Ok(())
    }

    /// 持久化一条成绩并更新其分类的统计。
    ///
    /// 存储失败时原样上抛, 内存状态不变。
    pub fn add_solve(&mut self, solve: NewSolve) -> Result<i64> {
        let id = self.store.insert(&solve)?;
        let record = solve.into_record(id);

        if let Some(stats) = self.stats.get_mut(&record.category) {
            stats.add_solve(&record);
            return Ok(id);
        }
        // 未缓存的分类: 重建已包含刚写入的记录
        let category = record.category.clone();
        self.rebuild_category(&category)?;
        Ok(id)
    }

    /// 删除成绩: 存储删除成功后重放当前分类
    pub fn remove_solve(&mut self, id: i64) -> Result<()> {
        self.store.delete_by_id(id)?;
        let category = self.current_category.clone();
        self.rebuild_category(&category)
    }

    /// 改判: 存储更新成功后重放当前分类
    pub fn change_penalty(&mut self, id: i64, penalty: Penalty) -> Result<()> {
        self.store.update_penalty_by_id(id, penalty)?;
        let category = self.current_category.clone();
        self.rebuild_category(&category)
    }

    /// 切换分类并从存储重建其统计
    pub fn change_category(&mut self, category: CategoryCode) -> Result<()> {
        self.rebuild_category(&category)?;
        self.current_category = category;
        Ok(())
    }

    fn current_stats(&self) -> Result<&Statistics> {
        self.stats
            .get(&self.current_category)
            .ok_or_else(|| StatsError::UnknownCategory(self.current_category.to_string()))
    }

    /// 当前分类的聚合器只读访问
    pub fn statistics(&self) -> Result<&Statistics> {
        self.current_stats()
    }

    pub fn stats_tables(&self) -> Result<StatsTables> {
        Ok(self.current_stats()?.stats_tables())
    }

    pub fn chart_data(&self, scope: StatScope) -> Result<&[ChartPoint]> {
        Ok(self.current_stats()?.chart_data(scope))
    }

    pub fn timer_entries(&self, scope: StatScope) -> Result<Vec<StatEntry>> {
        Ok(self.current_stats()?.timer_entries(scope))
    }

    /// 存储中出现过的分节 id
    pub fn sessions(&self) -> Result<Vec<SessionId>> {
        self.store.sessions()
    }
}
