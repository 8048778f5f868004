use std::fmt;

use serde::{Deserialize, Serialize};

use super::stats::{check_percentile, FrequencyStats};
use super::SequenceLengths;
use crate::error::Result;
use crate::seed::codec::{self, SeedRaw};

/// query 种子与 target 种子共享同一个 key 时产生的一次命中，下游比对器把它当作锚点
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeedHit {
    pub target_id: u32,
    /// 相对链方向：两个种子 strand 位的异或
    pub target_rev: bool,
    pub target_pos: u32,
    /// 预留给调用方，索引总是写 0
    pub flags: u32,
    pub query_pos: u32,
}

/// 种子倒排索引。
///
/// 构建时接管种子向量并按打包值升序排序，之后只读；同一 key 的所有出现位置
/// 在排序后连续存放（子序按 seq_id、position、strand）。构建时同时生成 key 区间表，
/// 每个不同 key 一项 `(key, start)`，查询只在区间表上二分。
/// 构建完成后可以在多个线程间共享只读访问。
pub struct SeedIndex<'a> {
    lengths: &'a dyn SequenceLengths,
    seeds: Vec<SeedRaw>,
    /// 按 key 升序；第 i 个 key 的种子是 `seeds[spans[i].1..spans[i + 1].1]`
    spans: Vec<(u64, usize)>,
}

impl<'a> SeedIndex<'a> {
    pub fn new(lengths: &'a dyn SequenceLengths, mut seeds: Vec<SeedRaw>) -> Self {
        seeds.sort_unstable();
        let spans = build_spans(&seeds);
        log::debug!("seed index built: {} seeds, {} distinct keys", seeds.len(), spans.len());
        Self { lengths, seeds, spans }
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// 不同 key 的个数
    pub fn num_keys(&self) -> usize {
        self.spans.len()
    }

    /// 排序后的全部种子
    pub fn seeds(&self) -> &[SeedRaw] {
        &self.seeds
    }

    pub fn sequence_length(&self, seq_id: u32) -> Option<u32> {
        self.lengths.sequence_length(seq_id)
    }

    /// 返回 key 相同的连续种子段；不存在的 key 返回空切片
    pub fn get_seeds(&self, key: u64) -> &[SeedRaw] {
        match self.spans.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(i) => &self.seeds[self.span_range(i)],
            Err(_) => &[],
        }
    }

    fn span_range(&self, i: usize) -> std::ops::Range<usize> {
        let end = self.spans.get(i + 1).map_or(self.seeds.len(), |&(_, start)| start);
        self.spans[i].1..end
    }

    /// 见 [`SeedIndex::collect_hits_into`]
    pub fn collect_hits(&self, query: &[SeedRaw], freq_cutoff: usize) -> Vec<SeedHit> {
        let mut hits = Vec::new();
        self.collect_hits_into(query, freq_cutoff, &mut hits);
        hits
    }

    /// 对每个 query 种子（按输入顺序）取出索引中同 key 的全部出现位置，追加命中到 `hits`。
    ///
    /// `freq_cutoff > 0` 时，出现次数超过它的 key 整体跳过（抑制重复区域）；
    /// `freq_cutoff == 0` 表示不限制。同一个 query 种子的命中按索引排序顺序输出。
    pub fn collect_hits_into(&self, query: &[SeedRaw], freq_cutoff: usize, hits: &mut Vec<SeedHit>) {
        for &q in query {
            let qs = codec::decode(q);
            let run = self.get_seeds(qs.key);
            if run.is_empty() || (freq_cutoff > 0 && run.len() > freq_cutoff) {
                continue;
            }
            hits.reserve(run.len());
            for &t in run {
                hits.push(SeedHit {
                    target_id: codec::seq_id_of(t),
                    target_rev: qs.is_rev != codec::is_rev_of(t),
                    target_pos: codec::pos_of(t),
                    flags: 0,
                    query_pos: qs.pos,
                });
            }
        }
    }

    /// 统计每个不同 key 的出现次数分布。`percentile` 不在 [0, 1] 时返回错误，索引本身不会被修改。
    pub fn compute_frequency_stats(&self, percentile: f64) -> Result<FrequencyStats> {
        check_percentile(percentile)?;
        let mut counts = self.key_counts();
        FrequencyStats::from_counts(&mut counts, percentile)
    }

    fn key_counts(&self) -> Vec<usize> {
        (0..self.spans.len()).map(|i| self.span_range(i).len()).collect()
    }
}

impl fmt::Debug for SeedIndex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedIndex")
            .field("seeds", &self.seeds.len())
            .field("num_keys", &self.spans.len())
            .finish()
    }
}

fn build_spans(sorted: &[SeedRaw]) -> Vec<(u64, usize)> {
    let mut spans: Vec<(u64, usize)> = Vec::new();
    for (i, &raw) in sorted.iter().enumerate() {
        let key = codec::key_of(raw);
        if spans.last().map_or(true, |&(k, _)| k != key) {
            spans.push((key, i));
        }
    }
    spans
}
