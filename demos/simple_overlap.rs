//! 演示如何在 library 模式下使用 minidex 查找两条 read 之间的种子命中。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_overlap
//! ```

use minidex::index::SeedIndex;
use minidex::seed::{codec, generate_minimizers, SketchParams};
use minidex::util::dna;

fn make_genome(len: usize) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut x: u32 = 2024;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            bases[(x >> 16) as usize % 4]
        })
        .collect()
}

fn main() -> minidex::Result<()> {
    // 1. 两条在 genome[300..600] 上重叠的 read，第二条取反向互补
    let genome = make_genome(900);
    let read_a = genome[..600].to_vec();
    let read_b = dna::revcomp(&genome[300..]);
    println!("read_a: {} bp, read_b: {} bp（反向互补）", read_a.len(), read_b.len());

    // 2. 对 target（read_a）提取最小化器并建索引
    let params = SketchParams { k: 15, w: 10, ..Default::default() };
    let mut target_seeds = Vec::new();
    generate_minimizers(&mut target_seeds, &read_a, 0, &params)?;
    let lengths = vec![read_a.len() as u32];
    let index = SeedIndex::new(&lengths, target_seeds);
    println!("索引：{} 个种子，{} 个不同 key", index.len(), index.num_keys());

    let stats = index.compute_frequency_stats(0.01)?;
    println!(
        "频率：max={} avg={:.2} median={:.1} cutoff={}",
        stats.max, stats.avg, stats.median, stats.cutoff
    );

    // 3. 用 read_b 查询
    let mut query_seeds = Vec::new();
    generate_minimizers(&mut query_seeds, &read_b, 1, &params)?;
    let hits = index.collect_hits(&query_seeds, stats.cutoff);
    println!("\n{} 个命中：", hits.len());
    for h in hits.iter().take(10) {
        println!(
            "  query_pos={} -> target {}:{} strand={}",
            h.query_pos,
            h.target_id,
            h.target_pos,
            if h.target_rev { '-' } else { '+' }
        );
    }

    // 4. 种子本身是一个 u128
    if let Some(&raw) = index.seeds().first() {
        let seed = codec::decode(raw);
        println!("\n首个种子 {:#034x} -> {:?}", raw, seed);
    }
    Ok(())
}
