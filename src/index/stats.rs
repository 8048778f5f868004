use crate::error::{Result, SeedError};

const RANK_EPSILON: f64 = 1e-9;

/// 每个不同 key 的出现次数分布
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrequencyStats {
    pub max: usize,
    pub avg: f64,
    pub median: f64,
    /// 升序频率表中秩为 floor((1 - percentile) * n) 的值，可直接作为 `collect_hits` 的上限
    pub cutoff: usize,
}

impl FrequencyStats {
    /// 由每个 key 的出现次数计算统计量。`counts` 会被原地排序。
    pub fn from_counts(counts: &mut [usize], percentile: f64) -> Result<Self> {
        check_percentile(percentile)?;
        if counts.is_empty() {
            return Ok(Self::default());
        }
        counts.sort_unstable();

        let n = counts.len();
        let max = counts[n - 1];
        let avg = counts.iter().sum::<usize>() as f64 / n as f64;
        let median = if n % 2 == 0 {
            (counts[n / 2 - 1] + counts[n / 2]) as f64 / 2.0
        } else {
            counts[n / 2] as f64
        };
        // 1 - p 的舍入误差会让整数秩掉到下一个（p = 0.9, n = 10 时得到 0.999…）
        let rank = (((1.0 - percentile) * n as f64 + RANK_EPSILON).floor() as usize).min(n - 1);

        Ok(Self { max, avg, median, cutoff: counts[rank] })
    }
}

pub(crate) fn check_percentile(percentile: f64) -> Result<()> {
    // NaN 也会落到这里
    if !(0.0..=1.0).contains(&percentile) {
        return Err(SeedError::invalid(format!(
            "frequency percentile must be in [0.0, 1.0], got {}",
            percentile
        )));
    }
    Ok(())
}
