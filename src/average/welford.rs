//! Welford 算法 - 数值稳定的在线统计计算
//!
//! 避免大数相减导致的精度损失, O(1) 时间复杂度更新。
//! 只喂入有效成绩 (DNF 不参与均值/方差)。

/// Welford 单变量统计状态
#[derive(Debug, Clone, Default)]
pub struct WelfordState {
    /// 有效样本数量
    pub count: u64,
    /// 均值
    pub mean: f64,
    /// M2 = Σ(x - mean)²
    pub m2: f64,
}

impl WelfordState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 增量更新
    pub fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    /// 样本方差。样本数需严格大于 2 才有定义。
    pub fn sample_variance(&self) -> Option<f64> {
        if self.count > 2 {
            Some(self.m2 / (self.count - 1) as f64)
        } else {
            None
        }
    }

    /// 样本标准差
    pub fn sample_std(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }

    /// 重置状态
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
