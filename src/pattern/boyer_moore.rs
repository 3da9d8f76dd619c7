// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Boyer-Moore bad-character and good-suffix-period tables for the S5
//! fallback strategy in `advance`, plus the `lcp`/`lcs` rarest-byte
//! selection shared by the S2/S3 Karp-Rabin sieve. Tables are computed
//! eagerly at build time rather than lazily on first use, since a
//! `CompiledPattern` is meant to be built once and read many times.

use super::freq::FREQ;

/// Precomputed shift tables for one literal prefix.
#[derive(Clone, Debug)]
pub struct BoyerMoore {
    /// Bad-character shift: `bms[b]` bytes to skip when a mismatch occurs
    /// on byte `b`. Satisfies `bms[b] <= len` and, for every `i` with
    /// `pat[i] == b`, `bms[b] <= len - i - 1`.
    pub bms: [u8; 256],
    /// Good-suffix period: the smallest `d` such that
    /// `pat[len-1-d] == pat[len-1]`, or `len` if no such `d < len` exists.
    pub bmd: usize,
    /// Index of the rarest byte in the prefix.
    pub lcp: usize,
    /// Index of the second-rarest byte in the prefix, distinct from `lcp`.
    pub lcs: usize,
    /// The literal's final byte, checked directly by the S5 fast-skip
    /// strategy before handing a candidate to the interpreter for full
    /// verification.
    pub last: u8,
}

impl BoyerMoore {
    pub fn build(pat: &[u8]) -> BoyerMoore {
        assert!(!pat.is_empty(), "Boyer-Moore tables require a non-empty prefix");
        let len = pat.len();
        let cap = len.min(255) as u8;

        let mut bms = [cap; 256];
        for i in 0..len.saturating_sub(1) {
            let shift = (len - i - 1).min(255) as u8;
            bms[pat[i] as usize] = shift;
        }
        // Last-occurrence rule for the final byte too: absent this, an
        // exact match at the far right would shift by `cap` instead of 0.
        bms[pat[len - 1] as usize] = 0;

        let bmd = good_suffix_period(pat);
        let (lcp, lcs) = rarest_two(pat);

        BoyerMoore { bms, bmd, lcp, lcs, last: pat[len - 1] }
    }

    /// Mean bad-character shift, used by [`npy`](super::npy) to weigh this
    /// strategy against a plain `memchr` scan.
    pub fn mean_shift(&self) -> f64 {
        let total: u64 = self.bms.iter().map(|&b| b as u64).sum();
        total as f64 / 256.0
    }
}

fn good_suffix_period(pat: &[u8]) -> usize {
    let len = pat.len();
    let last = pat[len - 1];
    for d in 1..len {
        if pat[len - 1 - d] == last {
            return d;
        }
    }
    len
}

/// Pick the two rarest, distinct byte positions in `pat` by [`FREQ`].
fn rarest_two(pat: &[u8]) -> (usize, usize) {
    let mut lcp = 0;
    for i in 1..pat.len() {
        if FREQ[pat[i] as usize] < FREQ[pat[lcp] as usize] {
            lcp = i;
        }
    }
    let mut lcs = if lcp == 0 { 1.min(pat.len() - 1) } else { 0 };
    for i in 0..pat.len() {
        if i == lcp {
            continue;
        }
        if FREQ[pat[i] as usize] < FREQ[pat[lcs] as usize] {
            lcs = i;
        }
    }
    (lcp, lcs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_char_soundness() {
        // bms[b] <= len, and bms[pat[i]] <= len - i - 1.
        let pat = b"needle";
        let bm = BoyerMoore::build(pat);
        for &b in bm.bms.iter() {
            assert!(b as usize <= pat.len());
        }
        for (i, &b) in pat.iter().enumerate() {
            assert!(bm.bms[b as usize] as usize <= pat.len() - i - 1);
        }
    }

    #[test]
    fn lcp_lcs_distinct() {
        let bm = BoyerMoore::build(b"hay");
        assert_ne!(bm.lcp, bm.lcs);
    }

    #[test]
    fn good_suffix_period_repeat() {
        // "abab": last byte 'b' also occurs at index 1, distance 2.
        let bm = BoyerMoore::build(b"abab");
        assert_eq!(bm.bmd, 2);
    }

    #[test]
    fn good_suffix_period_no_repeat() {
        let bm = BoyerMoore::build(b"abcd");
        assert_eq!(bm.bmd, 4);
    }
}
