// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end boundary scenarios exercised through the public API only:
//! a match sitting exactly at the start of the stream, a match whose
//! bytes straddle two refill chunks, a match that ends exactly at
//! end-of-stream, a search that finds nothing before the source is
//! exhausted, cooperative cancellation, and indentation-aware anchors.

use std::sync::atomic::AtomicBool;

use streammatch_core::matcher::{MatchOutcome, Matcher, Options};
use streammatch_core::opcode::{encode_goto, encode_halt, encode_meta, encode_redo, encode_take, Meta};
use streammatch_core::pattern::{CompiledPattern, PatternBuilder};
use streammatch_core::source::SliceSource;

fn find_with_chunk(haystack: &[u8], needle: &[u8], chunk_size: usize) -> MatchOutcome {
    let pat = CompiledPattern::literal(needle);
    let opts = Options::builder().chunk_size(chunk_size).build();
    let mut matcher = Matcher::new(SliceSource::new(haystack), opts);
    let cancelled = AtomicBool::new(false);
    matcher.find(&pat, 0, &cancelled).unwrap()
}

#[test]
fn match_at_absolute_start_of_stream() {
    match find_with_chunk(b"needle in a haystack", b"needle", 4096) {
        MatchOutcome::Found(m) => {
            assert_eq!(m.begin(), 0);
            assert_eq!(m.end_offset(), 6);
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn match_ending_exactly_at_end_of_stream() {
    match find_with_chunk(b"a haystack with a needle", b"needle", 4096) {
        MatchOutcome::Found(m) => assert_eq!(m.end_offset(), 24),
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn refill_transparency_holds_across_chunk_sizes() {
    let haystack = b"the quick brown fox jumps over the lazy dog and the needle hides here";
    let expected_begin = haystack.windows(6).position(|w| w == b"needle").unwrap();
    for chunk in [1usize, 2, 3, 5, 7, 16, 31, 32, 33, 4096] {
        match find_with_chunk(haystack, b"needle", chunk) {
            MatchOutcome::Found(m) => {
                assert_eq!(m.begin(), expected_begin, "chunk size {}", chunk);
            }
            other => panic!("chunk size {}: expected Found, got {:?}", chunk, other),
        }
    }
}

#[test]
fn needle_split_exactly_across_a_refill_boundary() {
    // "needle" starts at offset 5; with chunk_size 5 the first refill ends
    // precisely at the needle's first byte, forcing a second refill mid-tape.
    match find_with_chunk(b"hay. needle.", b"needle", 5) {
        MatchOutcome::Found(m) => assert_eq!(m.begin(), 5),
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn search_exhausts_source_cleanly_when_absent() {
    match find_with_chunk(b"no such byte string anywhere in here", b"zzzzz", 8) {
        MatchOutcome::NotFound => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn pre_cancelled_search_never_scans() {
    let pat = CompiledPattern::literal(b"needle");
    let opts = Options::builder().cancel_check_interval(1).build();
    let mut matcher = Matcher::new(SliceSource::new(b"needle right here"), opts);
    let cancelled = AtomicBool::new(true);
    assert_eq!(matcher.find(&pat, 0, &cancelled).unwrap(), MatchOutcome::Cancelled);
}

#[test]
fn anchored_match_rejects_offset_matches() {
    let pat = CompiledPattern::literal(b"cat");
    let mut matcher = Matcher::new(SliceSource::new(b"a cat sat"), Options::default());
    assert_eq!(matcher.matches_at(&pat, 0).unwrap(), MatchOutcome::NotFound);
    match matcher.matches_at(&pat, 2).unwrap() {
        MatchOutcome::Found(m) => assert_eq!(m.len(), 3),
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn single_byte_alternation_finds_every_listed_first_byte() {
    for (needle, haystack, expect) in [
        (&b"a"[..], &b"xxxaxxx"[..], 3usize),
        (&b"z"[..], &b"xxxxxxz"[..], 6usize),
    ] {
        match find_with_chunk(haystack, needle, 4096) {
            MatchOutcome::Found(m) => assert_eq!(m.begin(), expect),
            other => panic!("expected Found, got {:?}", other),
        }
    }
}

/// Hand-assembles `\bword\b`: a word-boundary meta, then a literal "word"
/// dispatched one byte per state (each state's single alternative is
/// followed by a `Halt` so a mismatch fails the state outright instead of
/// falling into the next state's dispatch), then a closing word-boundary
/// meta and `Take`.
fn word_boundary_pattern() -> CompiledPattern {
    let tape = vec![
        encode_meta(Meta::Wbb, 2),
        encode_halt(),
        encode_goto(b'w', b'w', 4),
        encode_halt(),
        encode_goto(b'o', b'o', 6),
        encode_halt(),
        encode_goto(b'r', b'r', 8),
        encode_halt(),
        encode_goto(b'd', b'd', 10),
        encode_halt(),
        encode_meta(Meta::Wbe, 12),
        encode_halt(),
        encode_take(1),
    ];
    PatternBuilder::new().opcodes(tape).build()
}

#[test]
fn word_boundary_anchors_skip_embedded_occurrences() {
    // "word" occurs at 0, inside "words" at 5, inside "sword" at 12, and
    // again at 17; only the first and last are bounded by non-word bytes
    // (or the edges of the stream) on both sides.
    let haystack = b"word words sword word";
    let pat = word_boundary_pattern();
    let mut matcher = Matcher::new(SliceSource::new(haystack), Options::default());
    let cancelled = AtomicBool::new(false);

    let first = match matcher.find(&pat, 0, &cancelled).unwrap() {
        MatchOutcome::Found(m) => m,
        other => panic!("expected Found, got {:?}", other),
    };
    assert_eq!((first.begin(), first.end_offset()), (0, 4));

    let second = match matcher.find(&pat, first.end_offset(), &cancelled).unwrap() {
        MatchOutcome::Found(m) => m,
        other => panic!("expected Found, got {:?}", other),
    };
    assert_eq!((second.begin(), second.end_offset()), (17, 21));
}

/// An anchor probe reaching `Take` only through an `Ind`/`Und`/`Ded` meta,
/// used to drive the indentation tracker without needing real literal
/// content around each anchor.
fn indent_event_probe(gate: Meta) -> CompiledPattern {
    let tape = vec![encode_meta(gate, 2), encode_redo(), encode_take(1)];
    PatternBuilder::new().opcodes(tape).build()
}

/// Like [`indent_event_probe`], but drains every pending dedent (via `Ded`)
/// once `Und` confirms the current line has already been measured as a
/// dedent, rather than accepting on the first `Ded` check. A tracker that
/// never decrements its pending-dedent count loops forever here.
fn dedent_drain_probe() -> CompiledPattern {
    let tape = vec![
        encode_meta(Meta::Und, 2),
        encode_redo(),
        encode_meta(Meta::Ded, 2),
        encode_take(1),
    ];
    PatternBuilder::new().opcodes(tape).build()
}

#[test]
fn indentation_anchors_track_multi_level_indent_and_dedent() {
    // Lines: "a" (col 0), "  b" (col 2, one indent), "    c" (col 4,
    // another indent), "d" (col 0, a two-level dedent).
    let text = b"a\n  b\n    c\nd";
    let opts = Options::builder().indent_sensitive(true).build();
    let mut matcher = Matcher::new(SliceSource::new(&text[..]), opts);

    let ind = indent_event_probe(Meta::Ind);
    match matcher.matches_at(&ind, 4).unwrap() {
        MatchOutcome::Found(m) => assert_eq!(m.begin(), 4),
        other => panic!("expected the 'b' line to register as an indent, got {:?}", other),
    }
    match matcher.matches_at(&ind, 10).unwrap() {
        MatchOutcome::Found(m) => assert_eq!(m.begin(), 10),
        other => panic!("expected the 'c' line to register as a further indent, got {:?}", other),
    }

    // 'd' sits two indent levels below 'c'; draining both pending dedents
    // must terminate rather than loop forever re-checking the same meta.
    let ded = dedent_drain_probe();
    match matcher.matches_at(&ded, 12).unwrap() {
        MatchOutcome::Found(m) => assert_eq!(m.begin(), 12),
        other => panic!("expected the 'd' line's dedents to drain, got {:?}", other),
    }
}
