//! 序列输入（FASTA / FASTQ / FOFN）与命中输出

pub mod fofn;
pub mod hits;
pub mod reader;

use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::index::SequenceLengths;
use crate::seed::codec::MAX_POSITION;

pub use reader::{SeqReader, SeqRecord};

/// 按载入顺序编号的序列集合：序列 id 即下标
#[derive(Debug, Default, Clone)]
pub struct SequenceSet {
    names: Vec<String>,
    seqs: Vec<Vec<u8>>,
    lengths: Vec<u32>,
}

impl SequenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 展开输入（含 FOFN）并读入全部记录
    pub fn load<P: AsRef<Path>>(inputs: &[P]) -> Result<Self> {
        let mut set = Self::new();
        for path in fofn::expand_inputs(inputs)? {
            let fh = std::fs::File::open(&path)
                .with_context(|| format!("cannot open input '{}'", path.display()))?;
            let input: Box<dyn BufRead> = if fofn::is_gzipped(&path) {
                log::debug!("reading gzip input '{}'", path.display());
                Box::new(BufReader::new(MultiGzDecoder::new(fh)))
            } else {
                Box::new(BufReader::new(fh))
            };
            let mut reader = SeqReader::new(input);
            while let Some(rec) = reader
                .next_record()
                .with_context(|| format!("malformed input '{}'", path.display()))?
            {
                set.push(rec)?;
            }
        }
        Ok(set)
    }

    /// 追加一条记录，返回分配的序列 id
    pub fn push(&mut self, rec: SeqRecord) -> Result<u32> {
        if self.seqs.len() > u32::MAX as usize {
            bail!("too many sequences");
        }
        if rec.seq.len() > MAX_POSITION as usize + 1 {
            bail!("sequence '{}' is too long ({} bp)", rec.name, rec.seq.len());
        }
        let id = self.seqs.len() as u32;
        self.lengths.push(rec.seq.len() as u32);
        self.names.push(rec.name);
        self.seqs.push(rec.seq);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn seq(&self, id: u32) -> Option<&[u8]> {
        self.seqs.get(id as usize).map(Vec::as_slice)
    }

    pub fn total_bases(&self) -> usize {
        self.lengths.iter().map(|&l| l as usize).sum()
    }

    /// `(id, bases)`，可以直接交给 [`crate::seed::sketch_batch`]
    pub fn id_seq_pairs(&self) -> Vec<(u32, &[u8])> {
        self.seqs.iter().enumerate().map(|(i, s)| (i as u32, s.as_slice())).collect()
    }
}

impl SequenceLengths for SequenceSet {
    fn sequence_length(&self, seq_id: u32) -> Option<u32> {
        self.lengths.sequence_length(seq_id)
    }
}
