//! 种子：打包编码与最小化器（minimizer）提取

pub mod codec;
pub mod minimizer;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeedError};

pub use codec::{decode, encode, try_encode, Seed, SeedRaw};
pub use minimizer::{generate_minimizers, sketch_batch, MinimizerSketcher};

/// k-mer 的 2-bit 编码必须放进一个 u64
pub const MAX_KMER_SIZE: usize = 32;

/// 最小化器提取参数
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchParams {
    /// k-mer 长度（采样碱基数）
    pub k: usize,
    /// 窗口内连续 k-mer 的个数
    pub w: usize,
    /// spaced seed：相邻采样碱基之间跳过的碱基数，0 表示连续 k-mer
    pub spacing: usize,
    /// 在正反链之间取 canonical 最小值
    pub use_rc: bool,
    /// homopolymer 压缩
    pub use_hpc: bool,
    /// 压缩时单个符号最多吸收的 run 长度，0 表示整段 run 折叠为一个符号
    pub max_hpc_len: usize,
}

impl Default for SketchParams {
    fn default() -> Self {
        Self {
            k: 30,
            w: 80,
            spacing: 0,
            use_rc: true,
            use_hpc: false,
            max_hpc_len: 10,
        }
    }
}

impl SketchParams {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 || self.k > MAX_KMER_SIZE {
            return Err(SeedError::invalid(format!(
                "k must be in 1..={}, got {}",
                MAX_KMER_SIZE, self.k
            )));
        }
        if self.w == 0 {
            return Err(SeedError::invalid("w must be > 0"));
        }
        self.span()?;
        Ok(())
    }

    /// 一个（spaced）k-mer 在碱基流上覆盖的长度：(k-1)(spacing+1)+1
    pub fn span(&self) -> Result<usize> {
        self.spacing
            .checked_add(1)
            .and_then(|step| (self.k.saturating_sub(1)).checked_mul(step))
            .and_then(|s| s.checked_add(1))
            .ok_or_else(|| SeedError::invalid(format!("spacing {} overflows the k-mer span", self.spacing)))
    }
}
