// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The public matching API: [`Matcher`] wraps a
//! [`CompiledPattern`] and a [`Window`] over some [`Source`] and drives the
//! fast-skip engine and the opcode interpreter together, offering the
//! handful of top-level search entry points above them.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, trace};

use crate::advance::{self, AdvanceOutcome};
use crate::buffer::Window;
use crate::error::MatchResult;
use crate::indent::IndentTracker;
use crate::interp::{Interp, Method, Outcome as StepOutcome, RunOptions};
use crate::pattern::CompiledPattern;
use crate::source::Source;

/// Per-matcher tunables: the caller-visible knobs the tape interpreter and
/// indentation tracker consult at match time.
#[derive(Clone, Debug)]
pub struct Options {
    /// Bytes read from the source per refill, when the source doesn't
    /// otherwise constrain it.
    pub chunk_size: usize,
    /// Accept zero-length matches. Gates `find`'s and `split`'s handling
    /// of an empty `Take`: with this off, an empty match is never reported
    /// except implicitly when a pattern can only match the empty string
    /// and the scan has nowhere left to advance.
    pub allow_empty_match: bool,
    /// Reject input containing a byte `>= 0x80` with `EncodingReject`
    /// rather than matching through it. Distinct from
    /// [`CompiledPattern::ascii_only`](crate::pattern::CompiledPattern::ascii_only),
    /// which is a property of the compiled tape, not of the input stream.
    pub ascii_only: bool,
    /// Whether a compiled `.`-class byte range was built to include
    /// newline. This crate never compiles regex syntax, so it has nothing
    /// to act on here; the field exists for interface completeness and is
    /// forwarded, unread, the same way [`Match::group`] is a documented
    /// no-op for capture indices this core never produces.
    pub allow_dotall: bool,
    /// Treat `Bol`/`Eol` anchors as per-line rather than whole-buffer.
    pub multiline: bool,
    /// For the runtime-resolved `Wbb`/`Wbe` word-boundary metas, classify
    /// bytes `>= 0x80` as word bytes instead of only ASCII alphanumerics
    /// and `_`. The tape's own `Bwe`/`Ewe`/`Nwe` metas always use this
    /// wider classification regardless of this flag, since a tape author
    /// who reached for the explicitly Unicode-flavored opcode meant it.
    pub word_boundary_uses_unicode: bool,
    /// Number of columns one tab stop advances the indentation tracker's
    /// column counter by.
    pub tab_size: u32,
    /// Enables the `Ind`/`Und`/`Ded` indentation metas. When off, they
    /// never hold, regardless of what the indentation tracker has
    /// measured — a tape author who doesn't need column-sensitive anchors
    /// shouldn't pay for a `Redo` round trip that can never matter.
    pub indent_sensitive: bool,
    /// Re-check the cancellation flag at most this often (in candidate
    /// offsets advanced), trading cancellation latency for overhead.
    pub cancel_check_interval: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            chunk_size: 64 * 1024,
            allow_empty_match: false,
            ascii_only: false,
            allow_dotall: false,
            multiline: true,
            word_boundary_uses_unicode: false,
            tab_size: 8,
            indent_sensitive: false,
            cancel_check_interval: 256,
        }
    }
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder(Options::default())
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            multiline: self.multiline,
            unicode_words: self.word_boundary_uses_unicode,
            indent_sensitive: self.indent_sensitive,
            ascii_only: self.ascii_only,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OptionsBuilder(Options);

impl OptionsBuilder {
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.0.chunk_size = n;
        self
    }
    pub fn allow_empty_match(mut self, yes: bool) -> Self {
        self.0.allow_empty_match = yes;
        self
    }
    pub fn ascii_only(mut self, yes: bool) -> Self {
        self.0.ascii_only = yes;
        self
    }
    pub fn allow_dotall(mut self, yes: bool) -> Self {
        self.0.allow_dotall = yes;
        self
    }
    pub fn multiline(mut self, yes: bool) -> Self {
        self.0.multiline = yes;
        self
    }
    pub fn word_boundary_uses_unicode(mut self, yes: bool) -> Self {
        self.0.word_boundary_uses_unicode = yes;
        self
    }
    pub fn tab_size(mut self, n: u32) -> Self {
        self.0.tab_size = n;
        self
    }
    pub fn indent_sensitive(mut self, yes: bool) -> Self {
        self.0.indent_sensitive = yes;
        self
    }
    pub fn cancel_check_interval(mut self, n: usize) -> Self {
        self.0.cancel_check_interval = n;
        self
    }
    pub fn build(self) -> Options {
        self.0
    }
}

/// A successful match: the half-open byte range `[begin, end)` in the
/// stream's absolute offsets, and which alternative (`Take(k)`) produced
/// it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    begin: usize,
    end: usize,
    alt: u32,
}

impl Match {
    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// The alternative id the pattern's `Take` opcode reported.
    pub fn capture_id(&self) -> u32 {
        self.alt
    }
}

/// The result of one [`Matcher`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Found(Match),
    NotFound,
    /// The caller's cancellation flag was observed set between match
    /// cycles. Cooperative, not an error.
    Cancelled,
}

pub struct Matcher<S> {
    win: Window<S>,
    indent: IndentTracker,
    interp: Interp,
    opts: Options,
}

impl<S: Source> Matcher<S> {
    pub fn new(source: S, opts: Options) -> Matcher<S> {
        Matcher {
            win: Window::with_chunk_size(source, opts.chunk_size),
            indent: IndentTracker::new(),
            interp: Interp::new(),
            opts,
        }
    }

    /// Anchor a match attempt at exactly `at`.
    pub fn matches_at(&mut self, pat: &CompiledPattern, at: usize) -> MatchResult<MatchOutcome> {
        self.step(pat, at, Method::Match, None)
    }

    /// Search forward from `from` for the first match, checking
    /// `cancelled` between candidate offsets.
    pub fn find(
        &mut self,
        pat: &CompiledPattern,
        from: usize,
        cancelled: &AtomicBool,
    ) -> MatchResult<MatchOutcome> {
        self.step(pat, from, Method::Find, Some(cancelled))
    }

    /// Like [`find`](Self::find), but guarantees forward progress even
    /// when a match is empty, for callers that repeatedly scan (e.g.
    /// `findall`).
    pub fn scan(
        &mut self,
        pat: &CompiledPattern,
        from: usize,
        cancelled: &AtomicBool,
    ) -> MatchResult<MatchOutcome> {
        self.step(pat, from, Method::Scan, Some(cancelled))
    }

    /// Splits the stream on matches of `pat`, reporting one segment of
    /// non-matching bytes at a time. Call again with the returned `next`
    /// offset to get the following segment; a trailing `Final` segment is
    /// reported once after the last match (or over the whole input, if
    /// there was never a match), unless the input was empty to begin with.
    pub fn split(
        &mut self,
        pat: &CompiledPattern,
        from: usize,
        cancelled: &AtomicBool,
    ) -> MatchResult<SplitOutcome> {
        match self.step(pat, from, Method::Split, Some(cancelled))? {
            MatchOutcome::Found(m) => Ok(SplitOutcome::Segment {
                begin: from,
                end: m.begin(),
                next: m.end_offset().max(m.begin() + 1),
            }),
            MatchOutcome::NotFound => {
                if from == self.win.end() && from == 0 {
                    Ok(SplitOutcome::Done)
                } else {
                    Ok(SplitOutcome::Final {
                        begin: from,
                        end: self.win.end(),
                    })
                }
            }
            MatchOutcome::Cancelled => Ok(SplitOutcome::Cancelled),
        }
    }

    fn step(
        &mut self,
        pat: &CompiledPattern,
        from: usize,
        method: Method,
        cancelled: Option<&AtomicBool>,
    ) -> MatchResult<MatchOutcome> {
        let mut at = from;
        let mut checks_since_cancel = 0usize;
        let cfg = self.opts.run_options();

        if method != Method::Match {
            debug!("{:?} starting at {} using {:?}", method, from, advance::strategy_for(pat));
        }

        loop {
            if let Some(flag) = cancelled {
                checks_since_cancel += 1;
                if checks_since_cancel >= self.opts.cancel_check_interval.max(1) {
                    checks_since_cancel = 0;
                    if flag.load(Ordering::Relaxed) {
                        return Ok(MatchOutcome::Cancelled);
                    }
                }
            }

            let candidate = if method == Method::Match {
                AdvanceOutcome::Candidate(at)
            } else {
                advance::advance(&mut self.win, pat, at)?
            };

            let at_now = match candidate {
                AdvanceOutcome::Candidate(off) => off,
                AdvanceOutcome::Exhausted => return Ok(MatchOutcome::NotFound),
            };

            trace!("candidate at offset {}", at_now);

            match self.interp.run(&mut self.win, pat, &mut self.indent, cfg, at_now)? {
                StepOutcome::Take(step) => {
                    let is_empty = step.end == at_now;
                    let reached_eob = self.win.at_eob(step.end);
                    let skip = match method {
                        Method::Match => false,
                        Method::Find => {
                            is_empty && (!reached_eob || !self.opts.allow_empty_match)
                        }
                        Method::Scan | Method::Split => is_empty && !self.opts.allow_empty_match,
                    };
                    if skip {
                        if method == Method::Match {
                            return Ok(MatchOutcome::NotFound);
                        }
                        at = at_now + 1;
                        continue;
                    }
                    self.win.set_current_match(at_now, pat.lookback_window());
                    return Ok(MatchOutcome::Found(Match {
                        begin: at_now,
                        end: step.end,
                        alt: step.alt,
                    }));
                }
                StepOutcome::Fail => {
                    if method == Method::Match {
                        return Ok(MatchOutcome::NotFound);
                    }
                    at = at_now + 1;
                }
                StepOutcome::Redo { at: redo_at } => {
                    let col = self.measure_indent_column(redo_at)?;
                    self.indent.measure_line(col);
                    trace!(
                        "indent re-measured at {}: column {}, depth {}, pending dedents {}",
                        redo_at,
                        col,
                        self.indent.depth(),
                        self.indent.pending_dedents(),
                    );
                    at = redo_at;
                }
            }
        }
    }

    /// Walks backward from `at` to the start of its line and counts the
    /// column width of the leading whitespace, expanding tabs to
    /// [`Options::tab_size`] stops. Only called on `Redo`, so it's fine
    /// for this to cost O(line length) rather than being tracked
    /// incrementally.
    fn measure_indent_column(&mut self, at: usize) -> MatchResult<u32> {
        let mut line_start = at;
        while line_start > 0 && self.win.byte_before(line_start) != Some(b'\n') {
            line_start -= 1;
        }
        let mut col = 0u32;
        let mut i = line_start;
        loop {
            if !self.win.peek_more(i)? || i >= at {
                break;
            }
            match self.win.get(i) {
                b' ' => col += 1,
                b'\t' => col += self.opts.tab_size - (col % self.opts.tab_size),
                _ => break,
            }
            i += 1;
        }
        Ok(col)
    }
}

/// One step of a [`Matcher::split`] call: the non-matching segment found
/// and where to resume the next call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitOutcome {
    /// A segment between two matches (or before the first one).
    Segment { begin: usize, end: usize, next: usize },
    /// The final segment after the last match, or the whole input if `pat`
    /// never matched.
    Final { begin: usize, end: usize },
    /// The input was wholly empty; there is nothing to split.
    Done,
    /// The caller's cancellation flag was observed set.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::CompiledPattern;
    use crate::source::SliceSource;

    #[test]
    fn find_locates_a_literal_mid_stream() {
        let pat = CompiledPattern::literal(b"needle");
        let mut m = Matcher::new(SliceSource::new(b"hay hay needle hay"), Options::default());
        let cancelled = AtomicBool::new(false);
        match m.find(&pat, 0, &cancelled).unwrap() {
            MatchOutcome::Found(found) => {
                assert_eq!(found.begin(), 8);
                assert_eq!(found.end_offset(), 14);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn find_reports_not_found_when_absent() {
        let pat = CompiledPattern::literal(b"zzz");
        let mut m = Matcher::new(SliceSource::new(b"no such thing"), Options::default());
        let cancelled = AtomicBool::new(false);
        assert_eq!(m.find(&pat, 0, &cancelled).unwrap(), MatchOutcome::NotFound);
    }

    #[test]
    fn matches_at_requires_exact_anchor() {
        let pat = CompiledPattern::literal(b"cat");
        let mut m = Matcher::new(SliceSource::new(b"the cat"), Options::default());
        assert_eq!(m.matches_at(&pat, 0).unwrap(), MatchOutcome::NotFound);
        match m.matches_at(&pat, 4).unwrap() {
            MatchOutcome::Found(found) => assert_eq!(found.len(), 3),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn cooperative_cancellation_is_observed() {
        let pat = CompiledPattern::literal(b"zzz");
        let mut m = Matcher::new(
            SliceSource::new(&vec![b'a'; 10_000][..]),
            Options::builder().cancel_check_interval(1).build(),
        );
        let cancelled = AtomicBool::new(true);
        assert_eq!(m.find(&pat, 0, &cancelled).unwrap(), MatchOutcome::Cancelled);
    }

    #[test]
    fn split_walks_segments_between_matches_and_a_final_tail() {
        let pat = CompiledPattern::literal(b",");
        let mut m = Matcher::new(SliceSource::new(b"aa,bb,ccc"), Options::default());
        let cancelled = AtomicBool::new(false);

        let first = match m.split(&pat, 0, &cancelled).unwrap() {
            SplitOutcome::Segment { begin, end, next } => (begin, end, next),
            other => panic!("expected a Segment, got {:?}", other),
        };
        assert_eq!(first, (0, 2, 3));

        let second = match m.split(&pat, first.2, &cancelled).unwrap() {
            SplitOutcome::Segment { begin, end, next } => (begin, end, next),
            other => panic!("expected a Segment, got {:?}", other),
        };
        assert_eq!(second, (3, 5, 6));

        match m.split(&pat, second.2, &cancelled).unwrap() {
            SplitOutcome::Final { begin, end } => assert_eq!((begin, end), (6, 9)),
            other => panic!("expected the final tail segment, got {:?}", other),
        }
    }

    #[test]
    fn split_reports_done_on_wholly_empty_input() {
        let pat = CompiledPattern::literal(b",");
        let mut m = Matcher::new(SliceSource::new(b""), Options::default());
        let cancelled = AtomicBool::new(false);
        assert_eq!(m.split(&pat, 0, &cancelled).unwrap(), SplitOutcome::Done);
    }
}
