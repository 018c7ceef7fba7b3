//! 有序多重集合 - 截尾分区的底层容器
//!
//! 基于 B 树的计数多重集合 (允许重复值)：
//! - O(log N) 插入/删除
//! - O(1) 读取运行求和 (剔除 DNF)
//! - 惰性缓存最小/最大值, 失效后读取时重算

use crate::solve::SolveTime;
use std::collections::BTreeMap;

/// 带缓存求和与最值的有序多重集合。
///
/// 求和不计 DNF; 最值缓存以 `None` 表示"待重算", 避免魔数哨兵与真实数据冲突。
#[derive(Debug, Clone, Default)]
pub struct AverageComponent {
    /// 值 → 出现次数
    tree: BTreeMap<SolveTime, usize>,
    /// 元素总数 (含重复)
    len: usize,
    /// 非 DNF 元素的运行求和, `None` 表示无有效值
    sum: Option<i64>,
    /// 缓存最小值, `None` = 失效
    least: Option<SolveTime>,
    /// 缓存最大值, `None` = 失效
    greatest: Option<SolveTime>,
}

impl AverageComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一个值。最值缓存仅在新值更极端时顺带更新, 否则维持原缓存。
    pub fn put(&mut self, val: SolveTime) {
        *self.tree.entry(val).or_insert(0) += 1;
        self.len += 1;

        if let Some(ms) = val.millis() {
            self.sum = Some(self.sum.unwrap_or(0) + ms);
        }

        if let Some(least) = self.least {
            if val < least {
                self.least = Some(val);
            }
        }
        if let Some(greatest) = self.greatest {
            if val > greatest {
                self.greatest = Some(val);
            }
        }
    }

    /// 删除一个值的单次出现。
    ///
    /// 值不存在时仅记录日志 (调用方按窗口位置推算被逐出值, 不追踪成员关系,
    /// 这里绝不能致命); debug 构建下升级为断言失败以便测试捕获分区失衡。
    pub fn remove(&mut self, val: SolveTime) {
        let found = match self.tree.get_mut(&val) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.tree.remove(&val);
                true
            }
            None => false,
        };

        if !found {
            log::error!("AverageComponent: value not present on remove: {:?}", val);
            debug_assert!(found, "remove of absent value: {:?}", val);
            return;
        }

        self.len -= 1;

        if let Some(ms) = val.millis() {
            self.sum = self.sum.map(|s| s - ms);
        }

        if self.least == Some(val) {
            self.least = None;
        }
        if self.greatest == Some(val) {
            self.greatest = None;
        }
    }

    /// 最小元素。缓存未命中时从树重算 (O(log N)), 均摊 O(1)。
    pub fn get_least(&mut self) -> SolveTime {
        if self.least.is_none() && self.len > 0 {
            self.least = self.tree.keys().next().copied();
        }
        self.least.unwrap_or(SolveTime::Unknown)
    }

    /// 最大元素。缓存未命中时从树重算。
    pub fn get_greatest(&mut self) -> SolveTime {
        if self.greatest.is_none() && self.len > 0 {
            self.greatest = self.tree.keys().next_back().copied();
        }
        self.greatest.unwrap_or(SolveTime::Unknown)
    }

    /// 非 DNF 元素求和; 无有效值时为 Unknown
    pub fn get_sum(&self) -> SolveTime {
        match self.sum {
            Some(s) => SolveTime::Time(s),
            None => SolveTime::Unknown,
        }
    }

    /// 求和的原始毫秒值
    pub fn sum_millis(&self) -> Option<i64> {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
        self.sum = None;
        self.least = None;
        self.greatest = None;
    }
}
