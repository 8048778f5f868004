use crate::error::{Result, SeedError};

/// 打包后的种子出现位置。
///
/// 位布局（高位 → 低位）：
///
/// ```text
/// | 127 ..... 64 | 63 ..... 32 | 31 ..... 1 |  0   |
/// |     key      |   seq_id    |    pos     | rev  |
/// ```
///
/// 按无符号整数比较即等价于按 `(key, seq_id, pos, is_rev)` 字典序比较，
/// 索引中的全部二分查找都依赖这一点。
pub type SeedRaw = u128;

pub const MAX_SEQ_ID: u32 = u32::MAX;
pub const MAX_POSITION: u32 = (1 << 31) - 1;

const KEY_SHIFT: u32 = 64;
const SEQ_ID_SHIFT: u32 = 32;
const POS_SHIFT: u32 = 1;
const POS_MASK: u128 = MAX_POSITION as u128;

/// 解码后的种子
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seed {
    pub key: u64,
    pub seq_id: u32,
    pub pos: u32,
    pub is_rev: bool,
}

impl Seed {
    pub fn new(key: u64, seq_id: u32, pos: u32, is_rev: bool) -> Self {
        Self { key, seq_id, pos, is_rev }
    }

    #[inline]
    pub fn encode(&self) -> SeedRaw {
        encode(self.key, self.seq_id, self.pos, self.is_rev)
    }
}

impl From<SeedRaw> for Seed {
    fn from(raw: SeedRaw) -> Self {
        decode(raw)
    }
}

/// 打包一个种子。
///
/// `pos` 必须 `<= MAX_POSITION`：种子由上游生成，越界属于调用方的编程错误，
/// debug 构建下直接断言；release 构建下截断为 31 位。需要运行期检查时用
/// [`try_encode`]。
#[inline]
pub fn encode(key: u64, seq_id: u32, pos: u32, is_rev: bool) -> SeedRaw {
    debug_assert!(pos <= MAX_POSITION, "seed position {} exceeds 31 bits", pos);
    ((key as u128) << KEY_SHIFT)
        | ((seq_id as u128) << SEQ_ID_SHIFT)
        | (((pos as u128) & POS_MASK) << POS_SHIFT)
        | (is_rev as u128)
}

/// 带边界检查的 [`encode`]
pub fn try_encode(key: u64, seq_id: u32, pos: u32, is_rev: bool) -> Result<SeedRaw> {
    if pos > MAX_POSITION {
        return Err(SeedError::capacity(format!(
            "position {} exceeds maximum {}",
            pos, MAX_POSITION
        )));
    }
    Ok(encode(key, seq_id, pos, is_rev))
}

#[inline]
pub fn decode(raw: SeedRaw) -> Seed {
    Seed {
        key: key_of(raw),
        seq_id: seq_id_of(raw),
        pos: pos_of(raw),
        is_rev: is_rev_of(raw),
    }
}

#[inline]
pub fn key_of(raw: SeedRaw) -> u64 {
    (raw >> KEY_SHIFT) as u64
}

#[inline]
pub fn seq_id_of(raw: SeedRaw) -> u32 {
    (raw >> SEQ_ID_SHIFT) as u32
}

#[inline]
pub fn pos_of(raw: SeedRaw) -> u32 {
    ((raw >> POS_SHIFT) & POS_MASK) as u32
}

#[inline]
pub fn is_rev_of(raw: SeedRaw) -> bool {
    raw & 1 == 1
}
