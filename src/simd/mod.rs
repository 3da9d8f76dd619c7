// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! CPU feature dispatch: the fast-skip engine's Karp-Rabin pair sieve
//! (S2/S3) runs a hand-vectorized AVX2 kernel when the host supports it
//! and falls back to the scalar kernel otherwise. The probe runs once per
//! process, not once per call — repeated `is_x86_feature_detected!` checks
//! would otherwise sit on the hot path of every `advance` call.

mod scalar;
#[cfg(target_arch = "x86_64")]
mod x86;

use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Scalar,
    Avx2,
    Avx512Bw,
}

fn detect() -> Backend {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx512bw") {
            return Backend::Avx512Bw;
        }
        if is_x86_feature_detected!("avx2") {
            return Backend::Avx2;
        }
    }
    Backend::Scalar
}

fn backend() -> Backend {
    static BACKEND: OnceLock<Backend> = OnceLock::new();
    *BACKEND.get_or_init(detect)
}

/// Scan `hay` for the earliest offset `i` such that
/// `hay[i + off_a] == a && hay[i + off_b] == b`, both offsets required to
/// be in bounds. This is the S2 (single-literal, `off_a == off_b`-free)
/// and S3 (alternating-literal) Karp-Rabin pair sieve:
/// a sound, possibly-over-eager prefilter — every real match's first byte
/// satisfies this pair test, but not every offset this returns need be a
/// real match (the interpreter always re-verifies).
pub fn pair_sieve(hay: &[u8], off_a: usize, a: u8, off_b: usize, b: u8) -> Option<usize> {
    let width = off_a.max(off_b) + 1;
    if hay.len() < width {
        return None;
    }
    match backend() {
        #[cfg(target_arch = "x86_64")]
        Backend::Avx512Bw | Backend::Avx2 => unsafe { x86::pair_sieve(hay, off_a, a, off_b, b) },
        _ => scalar::pair_sieve(hay, off_a, a, off_b, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_cached_and_consistent() {
        assert_eq!(backend(), backend());
    }

    #[test]
    fn pair_sieve_matches_scalar_reference() {
        let hay = b"xxaxbxxxaybxx";
        let fast = pair_sieve(hay, 0, b'a', 2, b'b');
        let slow = scalar::pair_sieve(hay, 0, b'a', 2, b'b');
        assert_eq!(fast, slow);
    }

    #[test]
    fn pair_sieve_none_when_width_exceeds_haystack() {
        assert_eq!(pair_sieve(b"ab", 0, b'a', 5, b'b'), None);
    }
}
