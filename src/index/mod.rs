//! 种子倒排索引

pub mod seed_index;
pub mod stats;

use std::collections::HashMap;

pub use seed_index::{SeedHit, SeedIndex};
pub use stats::FrequencyStats;

/// 序列 id → 序列长度（碱基数）的查询表，由外部序列库持有。
///
/// [`SeedIndex`] 只借用它，借用期必须覆盖索引的整个生命周期。
pub trait SequenceLengths: Sync {
    fn sequence_length(&self, seq_id: u32) -> Option<u32>;
}

impl SequenceLengths for [u32] {
    fn sequence_length(&self, seq_id: u32) -> Option<u32> {
        self.get(seq_id as usize).copied()
    }
}

impl SequenceLengths for Vec<u32> {
    fn sequence_length(&self, seq_id: u32) -> Option<u32> {
        self.as_slice().sequence_length(seq_id)
    }
}

impl SequenceLengths for HashMap<u32, u32> {
    fn sequence_length(&self, seq_id: u32) -> Option<u32> {
        self.get(&seq_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_tables() {
        let dense = vec![10u32, 20, 30];
        assert_eq!(dense.sequence_length(1), Some(20));
        assert_eq!(dense.sequence_length(3), None);

        let mut sparse = HashMap::new();
        sparse.insert(123u32, 96u32);
        assert_eq!(sparse.sequence_length(123), Some(96));
        assert_eq!(sparse.sequence_length(0), None);
    }
}
