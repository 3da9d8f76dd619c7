// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The compiled-pattern data model and the accelerator tables that live
//! inside it. A `CompiledPattern` is produced once (see
//! [`builder::PatternBuilder`]) and is immutable and `Arc`-shared read-only
//! from then on — built once and subsequently only read by the matching
//! engines.

pub mod bitset;
pub mod boyer_moore;
pub mod builder;
pub mod freq;
pub mod prefilter;

use std::sync::Arc;

use self::bitset::ByteSet;
use self::boyer_moore::BoyerMoore;
use self::prefilter::{GramHash, QuadPredictor};

pub use self::builder::PatternBuilder;

/// Up to 16 parallel "pinned needle character" slots for the S2/S3
/// Karp-Rabin sieve in `advance` (`chr[]`/`pin`).
#[derive(Clone, Debug)]
pub struct NeedleTable {
    /// How many alternative byte values are stored per slot: `0` (no
    /// needle), `1` (S2, single literal), or `2..=8`/`16` (S3, an
    /// alternation of that many literal prefixes).
    pub pin: u8,
    /// Offset within the prefix of the primary pinned byte.
    pub lcp: usize,
    /// Offset within the prefix of the secondary pinned byte, `!= lcp`.
    pub lcs: usize,
    pub vals_lcp: [u8; 16],
    pub vals_lcs: [u8; 16],
}

impl NeedleTable {
    pub fn none() -> NeedleTable {
        NeedleTable { pin: 0, lcp: 0, lcs: 0, vals_lcp: [0; 16], vals_lcs: [0; 16] }
    }

    pub fn alternatives(&self) -> &[u8] {
        &self.vals_lcp[..self.pin as usize]
    }

    /// True if `b` matches any stored alternative at the `lcp` offset.
    #[inline]
    pub fn matches_lcp(&self, b: u8) -> bool {
        self.vals_lcp[..self.pin as usize].contains(&b)
    }

    #[inline]
    pub fn matches_lcs(&self, b: u8) -> bool {
        self.vals_lcs[..self.pin as usize].contains(&b)
    }
}

/// The immutable, shareable compiled-pattern artifact consumed by
/// [`crate::interp::Interp`] and [`crate::advance`]. See [`PatternBuilder`]
/// for how one is constructed; compiling regex syntax down to an opcode
/// tape is out of scope for this crate.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    pub(crate) opc: Arc<[u32]>,
    pub(crate) fst: ByteSet,
    pub(crate) bit: [u8; 256],
    pub(crate) pmh: GramHash,
    pub(crate) pma: QuadPredictor,
    pub(crate) chr: NeedleTable,
    pub(crate) bm: Option<BoyerMoore>,
    pub(crate) min: usize,
    pub(crate) len: usize,
    pub(crate) lbk: usize,
    pub(crate) cbk: ByteSet,
    pub(crate) lbm: usize,
    pub(crate) npy: u8,
    pub(crate) one: bool,
    pub(crate) ascii_only: bool,
}

impl CompiledPattern {
    /// The opcode tape, as consumed by [`crate::interp::Interp`].
    #[inline]
    pub fn opcodes(&self) -> &[u32] {
        &self.opc
    }

    #[inline]
    pub fn first_bytes(&self) -> &ByteSet {
        &self.fst
    }

    #[inline]
    pub fn bit_table(&self) -> &[u8; 256] {
        &self.bit
    }

    #[inline]
    pub fn gram_hash(&self) -> &GramHash {
        &self.pmh
    }

    #[inline]
    pub fn quad_predictor(&self) -> &QuadPredictor {
        &self.pma
    }

    #[inline]
    pub fn needles(&self) -> &NeedleTable {
        &self.chr
    }

    #[inline]
    pub fn boyer_moore(&self) -> Option<&BoyerMoore> {
        self.bm.as_ref()
    }

    /// Minimum length, in bytes, of any match.
    #[inline]
    pub fn min_len(&self) -> usize {
        self.min
    }

    /// Exact length of the pattern's fixed literal prefix, `0` if none.
    #[inline]
    pub fn prefix_len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn lookback_window(&self) -> usize {
        self.lbk
    }

    #[inline]
    pub fn lookback_admissible(&self) -> &ByteSet {
        &self.cbk
    }

    #[inline]
    pub fn lookback_min(&self) -> usize {
        self.lbm
    }

    /// `0..=63` needle-payoff heuristic: higher favors the Karp-Rabin sieve
    /// or Boyer-Moore over a plain first-byte scan.
    #[inline]
    pub fn needle_payoff(&self) -> u8 {
        self.npy
    }

    /// True iff the whole pattern is exactly one fixed literal, enabling
    /// the `memchr`-only fast path.
    #[inline]
    pub fn is_single_literal(&self) -> bool {
        self.one
    }

    #[inline]
    pub fn ascii_only(&self) -> bool {
        self.ascii_only
    }

    /// Convenience constructor for the common case of a pattern that is
    /// exactly one fixed byte string with no metacharacters: builds a
    /// trivial opcode tape (one GOTO per byte, then TAKE) and the full
    /// accelerator table set via [`PatternBuilder`]. Whole-pattern literals
    /// degrade cleanly to a plain substring search this way.
    pub fn literal(bytes: &[u8]) -> CompiledPattern {
        assert!(!bytes.is_empty(), "literal pattern must not be empty");
        let mut opc = Vec::with_capacity(bytes.len() + 1);
        for (i, &b) in bytes.iter().enumerate() {
            // Each GOTO jumps to the next instruction on a match; the
            // final byte jumps straight into the TAKE that follows the
            // chain.
            opc.push(crate::opcode::encode_goto(b, b, (i + 1) as u16));
        }
        opc.push(crate::opcode::encode_take(1));
        let mut builder =
            PatternBuilder::new().opcodes(opc).prefixes(vec![bytes.to_vec()]);
        if bytes.len() == 1 {
            builder = builder.exact_single_literal(true);
        }
        builder.build()
    }
}
