//! # minidex
//!
//! 面向长读长 overlap 检测的最小化器（minimizer）种子索引。
//!
//! 本 crate 提供：
//!
//! - **种子编码**：把 (key, seq_id, pos, strand) 打包进一个 `u128`，整数顺序即排序顺序
//! - **最小化器提取**：滚动 k-mer 哈希 + 窗口最小值（winnowing），支持反向互补、spaced seed 与 homopolymer 压缩
//! - **种子索引**：按 key 排序的种子数组，二分定位命中并按频率上限过滤重复种子
//! - **overlap 流程**：读入 FASTA / FASTQ / FOFN，并行提取种子，输出 TSV 或 bincode 命中
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use minidex::index::SeedIndex;
//! use minidex::seed::{generate_minimizers, SketchParams};
//!
//! let params = SketchParams { k: 15, w: 5, ..Default::default() };
//! let target = b"ACGTTGCAGGCTAGCTAGGATCGATCGGATTACAGGCT".to_vec();
//! let query = target[5..].to_vec();
//!
//! let mut seeds = Vec::new();
//! generate_minimizers(&mut seeds, &target, 0, &params)?;
//! let lengths = vec![target.len() as u32];
//! let index = SeedIndex::new(&lengths, seeds);
//!
//! let mut query_seeds = Vec::new();
//! generate_minimizers(&mut query_seeds, &query, 0, &params)?;
//! for hit in index.collect_hits(&query_seeds, 0) {
//!     println!("q{} -> t{}:{}", hit.query_pos, hit.target_id, hit.target_pos);
//! }
//! # Ok::<(), minidex::error::SeedError>(())
//! ```
//!
//! ## 模块说明
//!
//! - [`seed`]：种子打包编码与最小化器提取
//! - [`index`]：种子索引、命中收集与频率统计
//! - [`io`]：序列输入与命中输出
//! - [`overlap`]：建索引 + 收集命中的端到端流程
//! - [`util`]：2-bit 编码 / 反向互补 / 整数哈希

pub mod error;
pub mod index;
pub mod io;
pub mod overlap;
pub mod seed;
pub mod util;

pub use error::{Result, SeedError};
pub use index::{FrequencyStats, SeedHit, SeedIndex, SequenceLengths};
pub use seed::{MinimizerSketcher, SeedRaw, SketchParams};
