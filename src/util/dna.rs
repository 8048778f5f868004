/// 非 ACGT 碱基的 2-bit 编码占位值
pub const INVALID_BASE: u8 = 4;

/// ASCII → 2-bit 编码表：A=0, C=1, G=2, T/U=3，大小写不敏感，其余为 4
const BASE_TO_2BIT: [u8; 256] = {
    let mut t = [INVALID_BASE; 256];
    t[b'A' as usize] = 0;
    t[b'a' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'g' as usize] = 2;
    t[b'T' as usize] = 3;
    t[b't' as usize] = 3;
    t[b'U' as usize] = 3;
    t[b'u' as usize] = 3;
    t
};

#[inline]
pub fn to_2bit(b: u8) -> u8 {
    BASE_TO_2BIT[b as usize]
}

/// 2-bit 编码下的互补碱基（A<->T, C<->G）
#[inline]
pub fn complement_2bit(c: u8) -> u8 {
    3 - c
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        _ => b'N',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// 可逆的 64 位整数哈希（Thomas Wang 混合函数），结果限制在 `mask` 内。
///
/// 对 2k 位的 k-mer 编码而言是 [0, 2^2k) 上的双射，避免按字典序选最小值带来的偏置。
#[inline]
pub fn hash64(key: u64, mask: u64) -> u64 {
    let mut key = (!key).wrapping_add(key << 21) & mask;
    key ^= key >> 24;
    key = key.wrapping_add(key << 3).wrapping_add(key << 8) & mask;
    key ^= key >> 14;
    key = key.wrapping_add(key << 2).wrapping_add(key << 4) & mask;
    key ^= key >> 28;
    key = key.wrapping_add(key << 31) & mask;
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn two_bit_encoding() {
        assert_eq!(to_2bit(b'A'), 0);
        assert_eq!(to_2bit(b'c'), 1);
        assert_eq!(to_2bit(b'G'), 2);
        assert_eq!(to_2bit(b'u'), 3);
        assert_eq!(to_2bit(b'N'), INVALID_BASE);
        assert_eq!(to_2bit(b'-'), INVALID_BASE);
        for &b in b"ACGT" {
            assert_eq!(complement_2bit(to_2bit(b)), to_2bit(complement(b)));
        }
    }

    #[test]
    fn revcomp_basic() {
        assert_eq!(revcomp(b"ACGTN"), b"NACGT");
        assert_eq!(revcomp(b"aacg"), b"CGTT");
    }

    #[test]
    fn hash64_is_injective_on_small_domain() {
        // k = 5 -> 10 bits
        let mask = (1u64 << 10) - 1;
        let hashes: HashSet<u64> = (0..=mask).map(|x| hash64(x, mask)).collect();
        assert_eq!(hashes.len(), (mask + 1) as usize);
        assert!(hashes.iter().all(|&h| h <= mask));
    }
}
