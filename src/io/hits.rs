use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::str::FromStr;

use super::SequenceSet;
use crate::index::SeedHit;
use crate::seed::SketchParams;

/// 命中输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFormat {
    /// 制表符分隔文本，便于查看
    Tsv,
    /// bincode 记录流：一个 [`HitFileHeader`] 后跟若干 [`HitBatch`]，供下游比对器读取
    Bincode,
}

impl FromStr for HitFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "bin" | "bincode" => Ok(Self::Bincode),
            other => Err(format!("unknown hit format '{}' (expected tsv or bincode)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitFileHeader {
    pub params: SketchParams,
    pub freq_cutoff: usize,
    pub created: String,
}

/// 一条 query 序列的全部命中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitBatch {
    pub query_id: u32,
    pub query_name: String,
    pub hits: Vec<SeedHit>,
}

pub struct HitWriter<W: Write> {
    out: W,
    format: HitFormat,
}

impl<W: Write> HitWriter<W> {
    pub fn new(out: W, format: HitFormat) -> Self {
        Self { out, format }
    }

    pub fn write_header(&mut self, params: &SketchParams, freq_cutoff: usize) -> Result<()> {
        let created = chrono::Utc::now().to_rfc3339();
        match self.format {
            HitFormat::Tsv => {
                writeln!(self.out, "#created\t{}", created)?;
                writeln!(
                    self.out,
                    "#params\tk={},w={},spacing={},hpc={},hpc_len={},rc={},freq_cutoff={}",
                    params.k,
                    params.w,
                    params.spacing,
                    params.use_hpc as u8,
                    params.max_hpc_len,
                    params.use_rc as u8,
                    freq_cutoff
                )?;
                writeln!(self.out, "#query\tquery_pos\ttarget\ttarget_len\tstrand\ttarget_pos")?;
            }
            HitFormat::Bincode => {
                let header = HitFileHeader { params: *params, freq_cutoff, created };
                bincode::serialize_into(&mut self.out, &header)?;
            }
        }
        Ok(())
    }

    pub fn write_batch(&mut self, batch: &HitBatch, targets: &SequenceSet) -> Result<()> {
        match self.format {
            HitFormat::Tsv => {
                for h in &batch.hits {
                    let tname = targets.name(h.target_id).unwrap_or("*");
                    let tlen = targets.seq(h.target_id).map_or(0, <[u8]>::len);
                    writeln!(
                        self.out,
                        "{}\t{}\t{}\t{}\t{}\t{}",
                        batch.query_name,
                        h.query_pos,
                        tname,
                        tlen,
                        if h.target_rev { '-' } else { '+' },
                        h.target_pos
                    )?;
                }
            }
            HitFormat::Bincode => bincode::serialize_into(&mut self.out, batch)?,
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// 读回 bincode 格式的命中文件
pub fn read_bincode_hits<R: BufRead>(mut input: R) -> Result<(HitFileHeader, Vec<HitBatch>)> {
    let header: HitFileHeader =
        bincode::deserialize_from(&mut input).map_err(|e| anyhow!("cannot read hit file header: {}", e))?;
    let mut batches = Vec::new();
    while !input.fill_buf()?.is_empty() {
        let batch: HitBatch = bincode::deserialize_from(&mut input)?;
        batches.push(batch);
    }
    Ok((header, batches))
}
