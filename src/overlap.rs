use anyhow::{anyhow, bail, Result};
use rayon::prelude::*;
use std::io::Write;

use crate::index::stats::check_percentile;
use crate::index::{FrequencyStats, SeedIndex};
use crate::io::hits::{HitBatch, HitFormat, HitWriter};
use crate::io::SequenceSet;
use crate::seed::{sketch_batch, SketchParams};

/// overlap 流程参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapOpt {
    pub sketch: SketchParams,
    /// 由种子频率分布推导上限时使用的分位数
    pub freq_percentile: f64,
    /// 固定的频率上限，给出时忽略 `freq_percentile`；0 表示不限制
    pub freq_cutoff: Option<usize>,
    /// all-vs-all 模式下丢弃 query 与自身的命中
    pub skip_self: bool,
    pub format: HitFormat,
    /// 每块处理的 query 条数，限制同时驻留内存的命中数
    pub batch_size: usize,
}

impl Default for OverlapOpt {
    fn default() -> Self {
        Self {
            sketch: SketchParams::default(),
            freq_percentile: 0.0002,
            freq_cutoff: None,
            skip_self: true,
            format: HitFormat::Tsv,
            batch_size: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlapSummary {
    pub targets: usize,
    pub queries: usize,
    pub target_seeds: usize,
    pub query_seeds: usize,
    pub stats: FrequencyStats,
    pub freq_cutoff: usize,
    pub hits: usize,
}

/// 在 target 上建种子索引，然后为每条 query 收集命中并写出。
///
/// `queries` 为 `None` 时做 all-vs-all：query 即 target 本身，此时 `skip_self` 生效。
/// 参数在读任何序列之前校验。
pub fn find_overlaps<W: Write>(
    targets: &SequenceSet,
    queries: Option<&SequenceSet>,
    opt: &OverlapOpt,
    writer: &mut HitWriter<W>,
) -> Result<OverlapSummary> {
    opt.sketch.validate()?;
    check_percentile(opt.freq_percentile)?;
    if opt.batch_size == 0 {
        bail!("query batch size must be at least 1");
    }

    let self_mode = queries.is_none();
    let queries = queries.unwrap_or(targets);

    let target_seeds: Vec<_> = sketch_batch(&targets.id_seq_pairs(), &opt.sketch)?.concat();
    let n_target_seeds = target_seeds.len();
    log::info!(
        "sketched {} target sequences ({} bp): {} seeds",
        targets.len(),
        targets.total_bases(),
        n_target_seeds
    );

    let index = SeedIndex::new(targets, target_seeds);
    let stats = index.compute_frequency_stats(opt.freq_percentile)?;
    let freq_cutoff = opt.freq_cutoff.unwrap_or(stats.cutoff);
    log::info!(
        "seed frequency: max={} avg={:.2} median={:.1} cutoff={} (percentile {})",
        stats.max,
        stats.avg,
        stats.median,
        freq_cutoff,
        opt.freq_percentile
    );

    writer.write_header(&opt.sketch, freq_cutoff)?;

    // query 按块处理：每块提取种子、收集命中、写出后即释放
    let query_pairs = queries.id_seq_pairs();
    let mut n_query_seeds = 0usize;
    let mut n_hits = 0usize;
    for chunk in query_pairs.chunks(opt.batch_size) {
        let chunk_seeds = sketch_batch(chunk, &opt.sketch)?;
        n_query_seeds += chunk_seeds.iter().map(Vec::len).sum::<usize>();

        let batches: Vec<HitBatch> = chunk
            .par_iter()
            .zip(chunk_seeds.par_iter())
            .map(|(&(qid, _), seeds)| {
                let mut hits = index.collect_hits(seeds, freq_cutoff);
                if self_mode && opt.skip_self {
                    hits.retain(|h| h.target_id != qid);
                }
                HitBatch {
                    query_id: qid,
                    query_name: queries.name(qid).unwrap_or("*").to_string(),
                    hits,
                }
            })
            .collect();

        for batch in batches.iter().filter(|b| !b.hits.is_empty()) {
            n_hits += batch.hits.len();
            writer
                .write_batch(batch, targets)
                .map_err(|e| anyhow!("cannot write hits for '{}': {}", batch.query_name, e))?;
        }
        log::debug!("query block of {} sequences done, {} hits so far", chunk.len(), n_hits);
    }
    log::info!(
        "sketched {} query sequences: {} seeds; wrote {} seed hits",
        queries.len(),
        n_query_seeds,
        n_hits
    );

    Ok(OverlapSummary {
        targets: targets.len(),
        queries: queries.len(),
        target_seeds: n_target_seeds,
        query_seeds: n_query_seeds,
        stats,
        freq_cutoff,
        hits: n_hits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SeqRecord;

    fn make_seq(len: usize, seed: u32) -> Vec<u8> {
        let bases = [b'A', b'C', b'G', b'T'];
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                bases[(x >> 16) as usize % 4]
            })
            .collect()
    }

    fn small_opt() -> OverlapOpt {
        OverlapOpt {
            sketch: SketchParams { k: 15, w: 10, ..Default::default() },
            freq_percentile: 0.0,
            freq_cutoff: Some(0),
            ..Default::default()
        }
    }

    fn overlapping_reads() -> SequenceSet {
        // 两条 read 共享 400bp，第三条无关
        let genome = make_seq(1_200, 11);
        let mut set = SequenceSet::new();
        set.push(SeqRecord { name: "a".into(), seq: genome[..800].to_vec() }).unwrap();
        set.push(SeqRecord { name: "b".into(), seq: genome[400..].to_vec() }).unwrap();
        set.push(SeqRecord { name: "c".into(), seq: make_seq(600, 99) }).unwrap();
        set
    }

    #[test]
    fn all_vs_all_finds_shared_region() {
        let reads = overlapping_reads();
        let mut w = HitWriter::new(Vec::new(), HitFormat::Tsv);
        let summary = find_overlaps(&reads, None, &small_opt(), &mut w).unwrap();
        let text = String::from_utf8(w.finish().unwrap()).unwrap();

        assert_eq!(summary.targets, 3);
        assert!(summary.hits > 0);
        let rows: Vec<Vec<&str>> = text
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(|l| l.split('\t').collect())
            .collect();
        assert_eq!(rows.len(), summary.hits);
        // 不输出自身命中；a/b 之间有命中且位于共享区域的对角线上
        assert!(rows.iter().all(|r| r[0] != r[2]));
        let ab: Vec<&Vec<&str>> = rows.iter().filter(|r| r[0] == "a" && r[2] == "b").collect();
        assert!(!ab.is_empty());
        for r in ab {
            let qpos: i64 = r[1].parse().unwrap();
            let tpos: i64 = r[5].parse().unwrap();
            assert_eq!(r[4], "+");
            assert_eq!(qpos - tpos, 400);
        }
    }

    #[test]
    fn keep_self_hits_when_requested() {
        let reads = overlapping_reads();
        let opt = OverlapOpt { skip_self: false, ..small_opt() };
        let mut w = HitWriter::new(Vec::new(), HitFormat::Tsv);
        let with_self = find_overlaps(&reads, None, &opt, &mut w).unwrap();
        let mut w = HitWriter::new(Vec::new(), HitFormat::Tsv);
        let without_self = find_overlaps(&reads, None, &small_opt(), &mut w).unwrap();
        assert!(with_self.hits > without_self.hits);
    }

    #[test]
    fn derived_cutoff_comes_from_stats() {
        let reads = overlapping_reads();
        let opt = OverlapOpt { freq_cutoff: None, freq_percentile: 0.5, ..small_opt() };
        let mut w = HitWriter::new(Vec::new(), HitFormat::Tsv);
        let summary = find_overlaps(&reads, None, &opt, &mut w).unwrap();
        assert_eq!(summary.freq_cutoff, summary.stats.cutoff);
        assert!(summary.freq_cutoff >= 1);
    }

    #[test]
    fn invalid_options_fail_before_output() {
        let reads = overlapping_reads();
        for opt in [
            OverlapOpt { freq_percentile: 1.5, ..small_opt() },
            OverlapOpt { sketch: SketchParams { w: 0, ..small_opt().sketch }, ..small_opt() },
            OverlapOpt { batch_size: 0, ..small_opt() },
        ] {
            let mut w = HitWriter::new(Vec::new(), HitFormat::Tsv);
            assert!(find_overlaps(&reads, None, &opt, &mut w).is_err());
            assert!(w.finish().unwrap().is_empty());
        }
    }

    #[test]
    fn output_independent_of_batch_size() {
        let reads = overlapping_reads();
        let run = |batch_size: usize| {
            let opt = OverlapOpt { batch_size, ..small_opt() };
            let mut w = HitWriter::new(Vec::new(), HitFormat::Bincode);
            let summary = find_overlaps(&reads, None, &opt, &mut w).unwrap();
            let (_, batches) = crate::io::hits::read_bincode_hits(&w.finish().unwrap()[..]).unwrap();
            (summary, batches)
        };
        let (whole, whole_batches) = run(1_000);
        assert!(whole.hits > 0);
        for batch_size in [1, 2] {
            let (summary, batches) = run(batch_size);
            assert_eq!(summary, whole);
            assert_eq!(batches, whole_batches);
        }
    }

    #[test]
    fn separate_query_set() {
        let reads = overlapping_reads();
        let mut queries = SequenceSet::new();
        queries
            .push(SeqRecord { name: "q".into(), seq: reads.seq(0).unwrap()[100..500].to_vec() })
            .unwrap();
        let mut w = HitWriter::new(Vec::new(), HitFormat::Bincode);
        let summary = find_overlaps(&reads, Some(&queries), &small_opt(), &mut w).unwrap();
        assert_eq!(summary.queries, 1);
        let bytes = w.finish().unwrap();
        let (_, batches) = crate::io::hits::read_bincode_hits(&bytes[..]).unwrap();
        assert_eq!(batches.len(), 1);
        // 与 target a 的命中对角线偏移为 -100
        assert!(batches[0]
            .hits
            .iter()
            .filter(|h| h.target_id == 0)
            .all(|h| h.target_pos as i64 - h.query_pos as i64 == 100));
        assert!(batches[0].hits.iter().any(|h| h.target_id == 0));
    }
}
