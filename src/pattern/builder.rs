// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Assembles a [`CompiledPattern`] from an opcode tape plus literal-prefix
//! metadata. This is *not* a regex parser — compiling regex syntax down to
//! an opcode tape is somebody else's problem; this module turns an
//! already-built tape (however the caller obtained it — hand-assembled, or
//! deserialized from disk) into a fully accelerated `CompiledPattern` by
//! deriving `fst`/`bit`/`pmh`/`pma`/`chr`/`pin`/`bms`/`bmd`/`npy` from the
//! tape and its literal prefixes.

use std::sync::Arc;

use super::bitset::ByteSet;
use super::boyer_moore::BoyerMoore;
use super::freq::FREQ;
use super::prefilter::{GramHash, QuadPredictor};
use super::{CompiledPattern, NeedleTable};

const MAX_ALTERNATIVES: usize = 16;

#[derive(Default)]
pub struct PatternBuilder {
    opc: Vec<u32>,
    prefixes: Vec<Vec<u8>>,
    first_bytes: Option<ByteSet>,
    min_length: Option<usize>,
    lookback: Option<(usize, ByteSet, usize)>,
    ascii_only: bool,
    exact_single_literal: bool,
}

impl PatternBuilder {
    pub fn new() -> PatternBuilder {
        PatternBuilder::default()
    }

    /// The opcode tape the interpreter will execute. Required.
    pub fn opcodes(mut self, opc: Vec<u32>) -> PatternBuilder {
        self.opc = opc;
        self
    }

    /// One or more alternative literal prefixes that must appear at the
    /// start of any match (e.g. `["foo", "bar"]` for `foo|bar`). Leave
    /// empty for patterns with no fixed literal prefix (strategy S0/S4).
    ///
    /// When more than one alternative is given, they should share a
    /// common length; the needle sieve (S3) pins two byte offsets shared
    /// across all alternatives, so only the common prefix length is used
    /// for that purpose. Alternatives beyond [`MAX_ALTERNATIVES`] are
    /// dropped from the needle table (the pattern still matches correctly
    /// through the opcode tape — only the fast-skip acceleration degrades,
    /// which soundness never depends on).
    pub fn prefixes(mut self, prefixes: Vec<Vec<u8>>) -> PatternBuilder {
        self.prefixes = prefixes;
        self
    }

    /// Overrides the minimum match length. Defaults to the common prefix
    /// length when omitted.
    pub fn min_length(mut self, min: usize) -> PatternBuilder {
        self.min_length = Some(min);
        self
    }

    /// The set of bytes that may legally start a match, when that set is
    /// known but narrower than what the prefixes alone would imply (e.g. a
    /// pattern with no literal prefix but a restricted first-byte class).
    pub fn first_bytes(mut self, fst: ByteSet) -> PatternBuilder {
        self.first_bytes = Some(fst);
        self
    }

    /// Configures the look-back window for right-anchored fragments
    ///: `lbk` chars to
    /// rewind at most, `cbk` the admissible look-back bytes, `lbm` the
    /// minimum look-back required for the pattern to possibly match.
    pub fn lookback(mut self, lbk: usize, cbk: ByteSet, lbm: usize) -> PatternBuilder {
        self.lookback = Some((lbk, cbk, lbm));
        self
    }

    pub fn ascii_only(mut self, yes: bool) -> PatternBuilder {
        self.ascii_only = yes;
        self
    }

    /// Marks that the whole pattern (not just a prefix) is one fixed
    /// literal, enabling the `memchr`-only fast path (`one`).
    pub fn exact_single_literal(mut self, yes: bool) -> PatternBuilder {
        self.exact_single_literal = yes;
        self
    }

    pub fn build(self) -> CompiledPattern {
        assert!(!self.opc.is_empty(), "pattern builder requires a non-empty opcode tape");

        let common_len =
            self.prefixes.iter().map(Vec::len).min().unwrap_or(0);
        let min = self.min_length.unwrap_or(common_len);

        let fst = self.first_bytes.unwrap_or_else(|| {
            if self.prefixes.is_empty() {
                ByteSet::full()
            } else {
                let mut set = ByteSet::empty();
                for p in &self.prefixes {
                    if let Some(&b) = p.first() {
                        set.insert(b);
                    }
                }
                set
            }
        });

        let bit = build_bit_table(&self.prefixes, common_len);
        let pmh = build_gram_hash(&self.prefixes, min, common_len);
        let pma = build_quad_predictor(&bit, min);
        let chr = build_needle_table(&self.prefixes, common_len);
        let bm = build_boyer_moore(&self.prefixes);
        let npy = needle_payoff(&bm, &self.prefixes);

        let (lbk, cbk, lbm) =
            self.lookback.unwrap_or((0, ByteSet::empty(), 0));

        CompiledPattern {
            opc: Arc::from(self.opc.into_boxed_slice()),
            fst,
            bit,
            pmh,
            pma,
            chr,
            bm,
            min,
            len: common_len,
            lbk,
            cbk,
            lbm,
            npy,
            one: self.exact_single_literal,
            ascii_only: self.ascii_only,
        }
    }
}

fn build_bit_table(prefixes: &[Vec<u8>], common_len: usize) -> [u8; 256] {
    let mut bit = [0u8; 256];
    let window = common_len.min(4);
    for p in prefixes {
        for (i, &b) in p.iter().take(window).enumerate() {
            bit[b as usize] |= 1 << i;
        }
    }
    bit
}

fn build_gram_hash(prefixes: &[Vec<u8>], min: usize, common_len: usize) -> GramHash {
    if min < 4 || prefixes.is_empty() || common_len < min {
        return GramHash::empty();
    }
    let mut gh = GramHash::new(min, prefixes.len());
    for p in prefixes {
        if p.len() >= min {
            gh.insert(&p[..min]);
        }
    }
    gh
}

fn build_quad_predictor(bit: &[u8; 256], min: usize) -> QuadPredictor {
    if min >= 4 {
        // GramHash handles min >= 4; QuadPredictor stays permissive so it
        // is never consulted as the limiting factor in that regime.
        return QuadPredictor::empty();
    }
    let mut admissible = [ByteSet::empty(); 4];
    let mut any = false;
    for b in 0..=255u8 {
        let mask = bit[b as usize];
        if mask == 0 {
            continue;
        }
        any = true;
        for k in 0..4 {
            if mask & (1 << k) != 0 {
                admissible[k].insert(b);
            }
        }
    }
    if !any {
        return QuadPredictor::empty();
    }
    QuadPredictor::from_admissible(admissible)
}

fn build_needle_table(prefixes: &[Vec<u8>], common_len: usize) -> NeedleTable {
    if prefixes.is_empty() || common_len == 0 {
        return NeedleTable::none();
    }
    let pin = prefixes.len().min(MAX_ALTERNATIVES) as u8;
    let lcp = 0;
    let lcs = if common_len >= 2 { common_len - 1 } else { 0 };

    let mut vals_lcp = [0u8; 16];
    let mut vals_lcs = [0u8; 16];
    for (i, p) in prefixes.iter().take(MAX_ALTERNATIVES).enumerate() {
        vals_lcp[i] = p[lcp];
        vals_lcs[i] = p[lcs];
    }

    NeedleTable { pin, lcp, lcs, vals_lcp, vals_lcs }
}

fn build_boyer_moore(prefixes: &[Vec<u8>]) -> Option<BoyerMoore> {
    if prefixes.len() == 1 && prefixes[0].len() > 1 {
        Some(BoyerMoore::build(&prefixes[0]))
    } else {
        None
    }
}

fn needle_payoff(bm: &Option<BoyerMoore>, prefixes: &[Vec<u8>]) -> u8 {
    let freq_component = prefixes
        .first()
        .and_then(|p| p.first())
        .map(|&b| FREQ[b as usize] as f64)
        .unwrap_or(0.0);
    let shift_component = bm.as_ref().map(BoyerMoore::mean_shift).unwrap_or(0.0);
    // Both components are small (freq <= 59, shift <= 255); fold into the
    // 0..=63 range this field is stored in.
    let combined = (freq_component + shift_component) / (59.0 + 255.0) * 63.0;
    combined.clamp(0.0, 63.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    fn literal_tape(bytes: &[u8]) -> Vec<u32> {
        let mut opc = Vec::new();
        for (i, &b) in bytes.iter().enumerate() {
            opc.push(opcode::encode_goto(b, b, (i + 1) as u16));
        }
        opc.push(opcode::encode_take(1));
        opc
    }

    #[test]
    fn single_literal_builds_boyer_moore_and_needle() {
        let p = PatternBuilder::new()
            .opcodes(literal_tape(b"needle"))
            .prefixes(vec![b"needle".to_vec()])
            .build();
        assert!(p.boyer_moore().is_some());
        assert_eq!(p.needles().pin, 1);
        assert!(p.first_bytes().contains(b'n'));
        assert!(!p.first_bytes().contains(b'x'));
    }

    #[test]
    fn alternation_builds_multi_pin_needle() {
        let p = PatternBuilder::new()
            .opcodes(literal_tape(b"foo"))
            .prefixes(vec![b"foo".to_vec(), b"bar".to_vec(), b"baz".to_vec()])
            .build();
        assert_eq!(p.needles().pin, 3);
        assert!(p.boyer_moore().is_none());
        assert!(p.first_bytes().contains(b'f'));
        assert!(p.first_bytes().contains(b'b'));
    }

    #[test]
    fn no_prefix_accepts_any_first_byte() {
        let p = PatternBuilder::new().opcodes(vec![opcode::encode_take(1)]).build();
        assert!(p.first_bytes().contains(0));
        assert!(p.first_bytes().contains(255));
        assert_eq!(p.prefix_len(), 0);
    }
}
