// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The opcode interpreter: walks a [`CompiledPattern`]'s
//! tape from a candidate start offset, consuming bytes on `Goto`
//! transitions and testing `Meta` transitions without consuming any. Only
//! one backtrack point is ever live — `(pc, pos)` at the last `Goto` run
//! that had an untried alternative — which is what lets this stay a flat
//! loop instead of needing an explicit thread stack.

use crate::buffer::Window;
use crate::error::{pattern_internal, MatchError, MatchResult};
use crate::indent::IndentTracker;
use crate::opcode::{self, Meta, Opcode};
use crate::pattern::CompiledPattern;
use crate::source::Source;

/// The subset of [`Options`](crate::matcher::Options) the interpreter
/// consults while walking a tape. Kept separate from `Options` itself so
/// this module has no dependency on `matcher`.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub multiline: bool,
    pub unicode_words: bool,
    pub indent_sensitive: bool,
    pub ascii_only: bool,
}

/// Which top-level operation is driving this interpreter run; each has a
/// different empty-match policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Anchor the match at exactly `pos`; fail if it doesn't reach a
    /// `Take` without consuming any byte beyond `pos` if `pos == end`.
    Match,
    /// Search forward from `pos` for the first position that reaches a
    /// `Take`; an empty match is accepted only if no prior non-empty
    /// candidate exists at an earlier offset (callers searching via
    /// `advance` never present an earlier one, since advance's candidates
    /// are already sorted ascending).
    Find,
    /// Like `Find`, but the caller intends to keep scanning past this
    /// match (e.g. `split`/`findall`); an empty match advances by one byte
    /// afterward so the scan can't stall.
    Scan,
    /// Splits input on matches; empty matches are accepted but never
    /// permitted to consume zero bytes twice at the same offset.
    Split,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepResult {
    pub end: usize,
    pub alt: u32,
}

pub enum Outcome {
    Take(StepResult),
    /// No `Take` reachable from this start offset.
    Fail,
    /// The tape requested an indentation re-measurement at `at` (the
    /// `Redo` opcode); the caller should update the [`IndentTracker`] for
    /// the line starting at `at` and re-enter the interpreter at the same
    /// offset.
    Redo { at: usize },
}

pub struct Interp {
    /// Lookahead save slots addressed by `Head(la)`/`Tail(la)`.
    head: [Option<usize>; 256],
}

impl Interp {
    pub fn new() -> Interp {
        Interp { head: [None; 256] }
    }

    /// Run the tape from `start`, consuming bytes from `win` as `Goto`
    /// transitions succeed. The interpreter always reports whatever `Take`
    /// it reaches first, honoring the single-backtrack-point rule; the
    /// caller (`matcher.rs`) applies its own per-operation empty-match
    /// policy on top of that result.
    pub fn run<S: Source>(
        &mut self,
        win: &mut Window<S>,
        pat: &CompiledPattern,
        indent: &mut IndentTracker,
        cfg: RunOptions,
        start: usize,
    ) -> MatchResult<Outcome> {
        self.head = [None; 256];
        let tape = pat.opcodes();

        let mut pc: usize = 0;
        let mut pos: usize = start;
        let mut backtrack: Option<(usize, usize)> = None;

        loop {
            if pc >= tape.len() {
                pattern_internal!("pc {} ran off the end of a {}-word tape", pc, tape.len());
            }
            let word = tape[pc];
            match opcode::decode(word, pc) {
                Opcode::Goto { lo, hi, target } => {
                    if !win.peek_more(pos)? {
                        match backtrack.take() {
                            Some((bpc, bpos)) => {
                                pc = bpc;
                                pos = bpos;
                            }
                            None => return Ok(Outcome::Fail),
                        }
                        continue;
                    }
                    let b = win.get(pos);
                    if cfg.ascii_only && b >= 0x80 {
                        return Err(MatchError::EncodingReject { offset: pos });
                    }
                    if b >= lo && b <= hi {
                        // A later alternative at this same dispatch run,
                        // if any, becomes the one backtrack point.
                        if pc + 1 < tape.len() && is_goto(tape[pc + 1]) {
                            backtrack = Some((pc + 1, pos));
                        }
                        pc = target as usize;
                        pos += 1;
                        win.set_pos(pos);
                    } else {
                        pc += 1;
                    }
                }
                Opcode::Meta { meta, target } => {
                    if meta_holds(meta, win, indent, cfg, pos) {
                        pc = target as usize;
                    } else {
                        pc += 1;
                    }
                }
                Opcode::Head { la } => {
                    self.head[la as usize] = Some(pos);
                    pc += 1;
                }
                Opcode::Tail { la } => {
                    if let Some(saved) = self.head[la as usize] {
                        pos = saved;
                    }
                    pc += 1;
                }
                Opcode::Redo => return Ok(Outcome::Redo { at: pos }),
                Opcode::Take { k } => return Ok(Outcome::Take(StepResult { end: pos, alt: k })),
                Opcode::Long => {
                    let next = pc + 1;
                    if next >= tape.len() {
                        pattern_internal!("LONG at pc {} has no following target word", pc);
                    }
                    pc = opcode::decode_long_target(tape[next]);
                }
                Opcode::Halt => match backtrack.take() {
                    Some((bpc, bpos)) => {
                        pc = bpc;
                        pos = bpos;
                    }
                    None => return Ok(Outcome::Fail),
                },
            }
        }
    }
}

impl Default for Interp {
    fn default() -> Interp {
        Interp::new()
    }
}

fn is_goto(word: u32) -> bool {
    // Mirrors opcode::decode's tag dispatch without needing a valid `pc`
    // for the (unreachable, since this is only ever a real tape word)
    // panic path.
    let tag = (word >> 24) as u8;
    tag <= 0xFA
}

fn meta_holds<S: Source>(
    meta: Meta,
    win: &Window<S>,
    indent: &mut IndentTracker,
    cfg: RunOptions,
    pos: usize,
) -> bool {
    match meta {
        Meta::Bob => win.at_bob(pos),
        Meta::Bol => !cfg.multiline || win.at_bol(pos),
        Meta::Eob => win.at_eob(pos),
        Meta::Eol => !cfg.multiline || win.at_eol(pos),
        // Tape-fixed ASCII word boundaries: always the narrow classifier,
        // regardless of what the caller asked for at runtime.
        Meta::Bwb => win.at_bow(pos),
        Meta::Ewb => win.at_eow(pos),
        Meta::Nwb => !win.at_bow(pos) && !win.at_eow(pos),
        // Tape-fixed Unicode-lenient word boundaries: always the wide
        // classifier, since a tape author who reached for these opcodes
        // specifically meant the wider class.
        Meta::Bwe => win.at_bow_unicode(pos),
        Meta::Ewe => win.at_eow_unicode(pos),
        Meta::Nwe => !win.at_bow_unicode(pos) && !win.at_eow_unicode(pos),
        // Runtime-resolved word boundaries: follow `Options::word_boundary_uses_unicode`.
        Meta::Wbb => {
            if cfg.unicode_words {
                win.at_bow_unicode(pos)
            } else {
                win.at_bow(pos)
            }
        }
        Meta::Wbe => {
            if cfg.unicode_words {
                win.at_eow_unicode(pos)
            } else {
                win.at_eow(pos)
            }
        }
        Meta::Ded => cfg.indent_sensitive && indent.take_dedent(),
        Meta::Ind => cfg.indent_sensitive && indent.is_indent(),
        Meta::Und => cfg.indent_sensitive && indent.is_undent(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::CompiledPattern;
    use crate::source::SliceSource;

    fn test_opts() -> RunOptions {
        RunOptions {
            multiline: true,
            unicode_words: false,
            indent_sensitive: true,
            ascii_only: false,
        }
    }

    #[test]
    fn literal_match_at_anchor_succeeds() {
        let pat = CompiledPattern::literal(b"cat");
        let mut win = Window::new(SliceSource::new(b"cat"));
        let mut indent = IndentTracker::new();
        let mut interp = Interp::new();
        match interp.run(&mut win, &pat, &mut indent, test_opts(), 0).unwrap() {
            Outcome::Take(r) => assert_eq!(r.end, 3),
            other => panic!("expected a match, got {:?}", matches!(other, Outcome::Fail)),
        }
    }

    #[test]
    fn literal_mismatch_fails_without_panicking() {
        let pat = CompiledPattern::literal(b"cat");
        let mut win = Window::new(SliceSource::new(b"dog"));
        let mut indent = IndentTracker::new();
        let mut interp = Interp::new();
        assert!(matches!(
            interp.run(&mut win, &pat, &mut indent, test_opts(), 0).unwrap(),
            Outcome::Fail
        ));
    }

    #[test]
    fn literal_match_partway_through_buffer() {
        let pat = CompiledPattern::literal(b"cat");
        let mut win = Window::new(SliceSource::new(b"the cat sat"));
        let mut indent = IndentTracker::new();
        let mut interp = Interp::new();
        match interp.run(&mut win, &pat, &mut indent, test_opts(), 4).unwrap() {
            Outcome::Take(r) => assert_eq!(r.end, 7),
            Outcome::Fail => panic!("expected a match"),
            Outcome::Redo { .. } => panic!("no indentation opcodes in this tape"),
        }
    }
}
