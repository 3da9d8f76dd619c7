// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The fast-skip engine: given a [`CompiledPattern`] and the
//! current [`Window`], find the next byte offset worth handing to the
//! opcode interpreter, without ever walking past a real match. Every
//! strategy here is a *prefilter*: it may return false positives (an
//! offset that turns out not to match once the interpreter looks closer)
//! but never a false negative.
//!
//! Strategy is picked once per `CompiledPattern` from its accelerator
//! fields, choosing among a small family of search strategies based on
//! what the pattern's literal prefix looks like:
//!
//! - S0: no usable skip — every offset in `fst` is a candidate.
//! - S1: single-byte literal — `memchr`.
//! - S2: single multi-byte literal — two-byte Karp-Rabin pair sieve.
//! - S3: a small alternation of literal prefixes — pair sieve per
//!   candidate, verified against every alternative's pinned bytes.
//! - S4: minimum-length gram scan, no fixed literal prefix — the rolling
//!   hash (`pmh`) for `min_len() >= 4`, or the admissible-byte-set
//!   predictor (`pma`) for `min_len()` of 2 or 3, too short for a sound
//!   four-byte rolling hash.
//! - S5: Boyer-Moore, used as the tie-break over S2 when `npy` favors it.

use crate::buffer::Window;
use crate::error::MatchResult;
use crate::pattern::CompiledPattern;
use crate::simd;
use crate::source::Source;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    S0NoSkip,
    S1SingleByte,
    S2PairSieve,
    S3Alternation,
    S4GramScan,
    S5BoyerMoore,
}

/// Picks the strategy a [`CompiledPattern`]'s accelerator fields support,
/// favoring the cheapest sound option. `npy` breaks the tie between S2 and
/// S5 when both are available for a single multi-byte literal.
pub fn strategy_for(pat: &CompiledPattern) -> Strategy {
    let needles = pat.needles();
    if pat.is_single_literal() && pat.prefix_len() == 1 {
        return Strategy::S1SingleByte;
    }
    if needles.pin == 1 {
        if pat.boyer_moore().is_some() && pat.needle_payoff() < 32 {
            return Strategy::S5BoyerMoore;
        }
        return Strategy::S2PairSieve;
    }
    if (2..=8).contains(&needles.pin) || needles.pin == 16 {
        return Strategy::S3Alternation;
    }
    if pat.boyer_moore().is_some() {
        return Strategy::S5BoyerMoore;
    }
    if pat.prefix_len() == 0 && (pat.min_len() >= 4 || (2..=3).contains(&pat.min_len())) {
        return Strategy::S4GramScan;
    }
    Strategy::S0NoSkip
}

/// Outcome of one [`advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A candidate start offset for the interpreter to attempt.
    Candidate(usize),
    /// The source is exhausted before a candidate could be found.
    Exhausted,
}

/// Find the next candidate match-start offset at or after `from`.
/// Idempotent: calling this again with the same `from`
/// returns the same candidate, since it only reads already-buffered bytes
/// plus whatever [`Window::peek_more`] appends — it never discards state
/// based on a prior call.
pub fn advance<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    match strategy_for(pat) {
        Strategy::S0NoSkip => advance_no_skip(win, pat, from),
        Strategy::S1SingleByte => advance_single_byte(win, pat, from),
        Strategy::S2PairSieve => advance_pair_sieve(win, pat, from),
        Strategy::S3Alternation => advance_alternation(win, pat, from),
        Strategy::S4GramScan => advance_gram_scan(win, pat, from),
        Strategy::S5BoyerMoore => advance_boyer_moore(win, pat, from),
    }
}

fn advance_no_skip<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let mut at = from;
    loop {
        if !win.peek_more(at)? {
            return Ok(AdvanceOutcome::Exhausted);
        }
        if pat.first_bytes().contains(win.get(at)) {
            return Ok(AdvanceOutcome::Candidate(at));
        }
        at += 1;
    }
}

fn advance_single_byte<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let needle = pat.needles().vals_lcp[0];
    let mut at = from;
    loop {
        win.fill_to(at + 4096)?;
        let hay = win.slice(at, win.end());
        match memchr::memchr(needle, hay) {
            Some(off) => return Ok(AdvanceOutcome::Candidate(at + off)),
            None => {
                at = win.end();
                if win.at_eof() {
                    return Ok(AdvanceOutcome::Exhausted);
                }
            }
        }
    }
}

fn advance_pair_sieve<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let needles = pat.needles();
    let a = needles.vals_lcp[0];
    let b = needles.vals_lcs[0];
    let mut at = from;
    loop {
        win.fill_to(at + 4096)?;
        let hay = win.slice(at, win.end());
        match simd::pair_sieve(hay, needles.lcp, a, needles.lcs, b) {
            Some(off) => return Ok(AdvanceOutcome::Candidate(at + off)),
            None => {
                if win.at_eof() {
                    return Ok(AdvanceOutcome::Exhausted);
                }
                // Every offset up through `hay.len() - width` was tested
                // and rejected; the remaining tail lacked enough bytes for
                // a full window and must be retested once more data
                // arrives, so resume just past the last fully-tested spot.
                let width = needles.lcp.max(needles.lcs) + 1;
                let tested = hay.len().saturating_sub(width - 1);
                at += tested.max(1);
            }
        }
    }
}

fn advance_alternation<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let needles = pat.needles();
    let mut at = from;
    loop {
        if !win.peek_more(at + needles.lcs.max(needles.lcp))? {
            // Not enough bytes left for a full needle window; still worth
            // trying the interpreter on whatever remains (short input).
            return if win.peek_more(at)? {
                Ok(AdvanceOutcome::Candidate(at))
            } else {
                Ok(AdvanceOutcome::Exhausted)
            };
        }
        let lcp_byte = win.get(at + needles.lcp);
        let lcs_byte = win.get(at + needles.lcs);
        if needles.matches_lcp(lcp_byte) && needles.matches_lcs(lcs_byte) {
            return Ok(AdvanceOutcome::Candidate(at));
        }
        at += 1;
    }
}

fn advance_gram_scan<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    if pat.min_len() >= 4 {
        advance_gram_hash(win, pat, from)
    } else {
        advance_quad_predict(win, pat, from)
    }
}

fn advance_gram_hash<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let min = pat.min_len();
    let mut at = from;
    loop {
        if !win.peek_more(at + min - 1)? {
            return if win.peek_more(at)? {
                Ok(AdvanceOutcome::Candidate(at))
            } else {
                Ok(AdvanceOutcome::Exhausted)
            };
        }
        let gram = win.slice(at, at + min);
        if pat.gram_hash().predict(gram) {
            return Ok(AdvanceOutcome::Candidate(at));
        }
        at += 1;
    }
}

/// S4 for `min_len()` of 2 or 3: too short to roll a sound four-byte gram
/// hash over, so each candidate window is checked directly against the
/// admissible first-byte sets `pma` recorded per offset.
fn advance_quad_predict<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let mut at = from;
    loop {
        win.fill_to(at + 4)?;
        let avail = win.available_from(at).min(4);
        if avail == 0 {
            return Ok(AdvanceOutcome::Exhausted);
        }
        let window = win.slice(at, at + avail);
        match pat.quad_predictor().predict(window) {
            Some(k) => return Ok(AdvanceOutcome::Candidate(at + k)),
            None => {
                if win.at_eof() && avail < 4 {
                    return Ok(AdvanceOutcome::Exhausted);
                }
                at += avail.max(1);
            }
        }
    }
}

/// Boyer-Moore preflight: only the last byte of the candidate window is
/// checked here (against the literal's own last byte). A match on that one
/// byte is handed to the interpreter as a candidate, which re-verifies the
/// whole literal — `advance` never needs the full literal bytes itself,
/// only the bad-character shift table.
fn advance_boyer_moore<S: Source>(
    win: &mut Window<S>,
    pat: &CompiledPattern,
    from: usize,
) -> MatchResult<AdvanceOutcome> {
    let bm = pat.boyer_moore().expect("S5 requires a Boyer-Moore table");
    let len = pat.prefix_len();
    let mut at = from;
    loop {
        if !win.peek_more(at + len - 1)? {
            return Ok(AdvanceOutcome::Exhausted);
        }
        let last = win.get(at + len - 1);
        if last == bm.last {
            return Ok(AdvanceOutcome::Candidate(at));
        }
        let shift = bm.bms[last as usize].max(1) as usize;
        at += shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::CompiledPattern;
    use crate::source::SliceSource;

    #[test]
    fn single_byte_strategy_finds_needle() {
        let pat = CompiledPattern::literal(b"x");
        assert_eq!(strategy_for(&pat), Strategy::S1SingleByte);
        let mut win = Window::new(SliceSource::new(b"aaaaxaaaa"));
        match advance(&mut win, &pat, 0).unwrap() {
            AdvanceOutcome::Candidate(off) => assert_eq!(off, 4),
            AdvanceOutcome::Exhausted => panic!("expected a candidate"),
        }
    }

    #[test]
    fn pair_sieve_strategy_finds_multi_byte_literal() {
        let pat = CompiledPattern::literal(b"needle");
        let mut win = Window::new(SliceSource::new(b"hay hay needle hay"));
        match advance(&mut win, &pat, 0).unwrap() {
            AdvanceOutcome::Candidate(off) => assert_eq!(off, 8),
            AdvanceOutcome::Exhausted => panic!("expected a candidate"),
        }
    }

    #[test]
    fn exhausted_when_needle_absent() {
        let pat = CompiledPattern::literal(b"zzz");
        let mut win = Window::new(SliceSource::new(b"no such thing here"));
        assert_eq!(advance(&mut win, &pat, 0).unwrap(), AdvanceOutcome::Exhausted);
    }

    #[test]
    fn advance_is_idempotent_for_the_same_offset() {
        let pat = CompiledPattern::literal(b"needle");
        let mut win = Window::new(SliceSource::new(b"hay needle hay"));
        let first = advance(&mut win, &pat, 0).unwrap();
        let second = advance(&mut win, &pat, 0).unwrap();
        assert_eq!(first, second);
    }
}
