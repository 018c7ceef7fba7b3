//! 平均计算核心模块
//!
//! 提供截尾平均所需的各层构件：
//! - 有序多重集合 (component) - 带缓存最值/求和的平衡树容器
//! - Welford 算法 (welford) - 数值稳定的在线均值/方差
//! - 截尾分区 (trim) - 下段/中段/上段三向波纹更新
//! - 窗口计算器 (calculator) - 环形缓冲 + 全量增量统计

pub mod calculator;
pub mod component;
pub mod trim;
pub mod welford;

pub use calculator::{AverageCalculator, AverageOfN, MIN_N_TO_ALLOW_ONE_DNF};
pub use component::AverageComponent;
pub use trim::TrimBands;
pub use welford::WelfordState;
