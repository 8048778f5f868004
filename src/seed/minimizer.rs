use rayon::prelude::*;

use super::codec::{encode, SeedRaw, MAX_POSITION};
use super::SketchParams;
use crate::error::{Result, SeedError};
use crate::util::dna::{self, INVALID_BASE};

/// 窗口中的候选 k-mer
#[derive(Clone, Copy, Debug, Default)]
struct Candidate {
    hash: u64,
    /// k-mer 在碱基流中的序号（HPC 时为压缩后的序号），窗口按它滑动
    index: usize,
    /// 原始序列坐标
    pos: u32,
    is_rev: bool,
}

/// 定长环形缓冲区实现的单调队列，容量为 w，整个提取过程不再分配内存
#[derive(Clone, Debug)]
struct MinQueue {
    buf: Vec<Candidate>,
    head: usize,
    len: usize,
}

impl MinQueue {
    fn new() -> Self {
        Self { buf: Vec::new(), head: 0, len: 0 }
    }

    fn reset(&mut self, capacity: usize) {
        if self.buf.len() != capacity {
            self.buf.clear();
            self.buf.resize(capacity, Candidate::default());
        }
        self.head = 0;
        self.len = 0;
    }

    #[inline]
    fn slot(&self, i: usize) -> usize {
        let j = self.head + i;
        if j >= self.buf.len() { j - self.buf.len() } else { j }
    }

    #[inline]
    fn front(&self) -> Option<&Candidate> {
        if self.len == 0 { None } else { Some(&self.buf[self.head]) }
    }

    #[inline]
    fn back(&self) -> Option<&Candidate> {
        if self.len == 0 { None } else { Some(&self.buf[self.slot(self.len - 1)]) }
    }

    #[inline]
    fn pop_front(&mut self) {
        if self.len > 0 {
            self.head = self.slot(1);
            self.len -= 1;
        }
    }

    #[inline]
    fn pop_back(&mut self) {
        if self.len > 0 {
            self.len -= 1;
        }
    }

    #[inline]
    fn push_back(&mut self, c: Candidate) {
        debug_assert!(self.len < self.buf.len());
        let s = self.slot(self.len);
        self.buf[s] = c;
        self.len += 1;
    }
}

/// 最小化器提取器（winnowing）。
///
/// 持有可跨调用复用的工作缓冲区：碱基流、HPC 坐标映射表、按相位拆开的滚动寄存器和单调队列。
/// 同一个实例可以顺序处理多条序列；并行时每个线程一个实例（见 [`sketch_batch`]）。
#[derive(Clone, Debug)]
pub struct MinimizerSketcher {
    params: SketchParams,
    span: usize,
    mask: u64,
    shift: u32,
    codes: Vec<u8>,
    coords: Vec<u32>,
    fwd: Vec<u64>,
    rev: Vec<u64>,
    filled: Vec<usize>,
    queue: MinQueue,
}

impl MinimizerSketcher {
    pub fn new(params: SketchParams) -> Result<Self> {
        params.validate()?;
        let span = params.span()?;
        let mask = if params.k == 32 { u64::MAX } else { (1u64 << (2 * params.k)) - 1 };
        Ok(Self {
            params,
            span,
            mask,
            shift: 2 * (params.k as u32 - 1),
            codes: Vec::new(),
            coords: Vec::new(),
            fwd: Vec::new(),
            rev: Vec::new(),
            filled: Vec::new(),
            queue: MinQueue::new(),
        })
    }

    pub fn params(&self) -> &SketchParams {
        &self.params
    }

    /// 在共享缓冲区 `buffer[offset..offset + len]` 上提取最小化器。
    /// offset 只用于定位切片，输出坐标始终是该序列内从 0 开始的局部坐标。
    pub fn sketch_range(
        &mut self,
        buffer: &[u8],
        offset: usize,
        len: usize,
        seq_id: u32,
        out: &mut Vec<SeedRaw>,
    ) -> Result<usize> {
        let end = offset
            .checked_add(len)
            .filter(|&e| e <= buffer.len())
            .ok_or_else(|| {
                SeedError::invalid(format!(
                    "range {}+{} is outside a buffer of length {}",
                    offset,
                    len,
                    buffer.len()
                ))
            })?;
        self.sketch_into(&buffer[offset..end], seq_id, out)
    }

    /// 提取 `seq` 的最小化器并追加到 `out`，返回本次追加的种子数。
    /// 追加的种子按 position 严格递增。
    pub fn sketch_into(&mut self, seq: &[u8], seq_id: u32, out: &mut Vec<SeedRaw>) -> Result<usize> {
        if seq.len() > MAX_POSITION as usize + 1 {
            return Err(SeedError::capacity(format!(
                "sequence {} has length {}, positions above {} cannot be encoded",
                seq_id,
                seq.len(),
                MAX_POSITION
            )));
        }

        self.fill_stream(seq);
        if self.codes.len() < self.span {
            return Ok(0);
        }

        let before = out.len();
        self.winnow(seq_id, out);
        Ok(out.len() - before)
    }

    /// 把序列转成 2-bit 碱基流；开启 HPC 时同时生成压缩序号 → 原始坐标的映射表
    fn fill_stream(&mut self, seq: &[u8]) {
        self.codes.clear();
        self.coords.clear();

        if !self.params.use_hpc {
            self.codes.extend(seq.iter().map(|&b| dna::to_2bit(b)));
            return;
        }

        let max_run = self.params.max_hpc_len;
        let mut prev = INVALID_BASE;
        let mut run = 0usize;
        for (i, &b) in seq.iter().enumerate() {
            let c = dna::to_2bit(b);
            if c != INVALID_BASE && c == prev && (max_run == 0 || run < max_run) {
                run += 1;
                continue;
            }
            self.codes.push(c);
            self.coords.push(i as u32);
            prev = c;
            run = 1;
        }
    }

    fn winnow(&mut self, seq_id: u32, out: &mut Vec<SeedRaw>) {
        let k = self.params.k;
        let w = self.params.w;
        let use_rc = self.params.use_rc;
        // k = 1 时 span 为 1，spacing 不起作用
        let phases = (self.params.spacing + 1).min(self.span);
        let (mask, shift, span) = (self.mask, self.shift, self.span);

        self.fwd.clear();
        self.fwd.resize(phases, 0);
        self.rev.clear();
        self.rev.resize(phases, 0);
        self.filled.clear();
        self.filled.resize(phases, 0);
        let n_kmers = self.codes.len() - span + 1;
        // 队列中的元素都落在最近 w 个 k-mer 内
        self.queue.reset(w.min(n_kmers));
        let mut last_emitted: Option<usize> = None;

        for t in 0..self.codes.len() {
            let c = self.codes[t];
            let ph = t % phases;
            if c == INVALID_BASE {
                // N 打断所有相位：覆盖到它的 k-mer 都无效
                self.fwd.iter_mut().for_each(|v| *v = 0);
                self.rev.iter_mut().for_each(|v| *v = 0);
                self.filled.iter_mut().for_each(|v| *v = 0);
            } else {
                let comp = dna::complement_2bit(c) as u64;
                self.fwd[ph] = ((self.fwd[ph] << 2) | c as u64) & mask;
                self.rev[ph] = (self.rev[ph] >> 2) | (comp << shift);
                self.filled[ph] += 1;
            }

            if t + 1 < span {
                continue;
            }
            let j = t + 1 - span;

            while self.queue.front().map_or(false, |f| f.index + w <= j) {
                self.queue.pop_front();
            }

            if c != INVALID_BASE && self.filled[ph] >= k {
                let hf = dna::hash64(self.fwd[ph], mask);
                let (hash, is_rev) = if use_rc {
                    let hr = dna::hash64(self.rev[ph], mask);
                    if hr < hf { (hr, true) } else { (hf, false) }
                } else {
                    (hf, false)
                };
                let pos = if self.params.use_hpc { self.coords[j] } else { j as u32 };
                while self.queue.back().map_or(false, |b| b.hash >= hash) {
                    self.queue.pop_back();
                }
                self.queue.push_back(Candidate { hash, index: j, pos, is_rev });
            }

            // 只在完整窗口上输出；不足 w 个 k-mer 的短序列在末尾输出一次
            let window_full = j + 1 >= w;
            let last_kmer = j + 1 == n_kmers;
            if window_full || last_kmer {
                if let Some(front) = self.queue.front() {
                    if last_emitted != Some(front.index) {
                        out.push(encode(front.hash, seq_id, front.pos, front.is_rev));
                        last_emitted = Some(front.index);
                    }
                }
            }
        }
    }
}

/// 单条序列的便捷入口
pub fn generate_minimizers(
    out: &mut Vec<SeedRaw>,
    seq: &[u8],
    seq_id: u32,
    params: &SketchParams,
) -> Result<usize> {
    MinimizerSketcher::new(*params)?.sketch_into(seq, seq_id, out)
}

/// 并行提取多条相互独立序列的最小化器，结果按输入顺序返回（每条序列一个 Vec）。
/// 参数非法时在开始任何工作之前返回错误。
pub fn sketch_batch(seqs: &[(u32, &[u8])], params: &SketchParams) -> Result<Vec<Vec<SeedRaw>>> {
    let sketcher = MinimizerSketcher::new(*params)?;
    seqs.par_iter()
        .map_init(
            || sketcher.clone(),
            |sk, &(seq_id, seq)| {
                let mut out = Vec::new();
                sk.sketch_into(seq, seq_id, &mut out)?;
                Ok(out)
            },
        )
        .collect()
}
