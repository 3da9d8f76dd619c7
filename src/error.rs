// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;

/// Recoverable failures that can surface from a single match cycle.
///
/// Only genuinely recoverable conditions live here. An out-of-range jump
/// target or any other tape invariant violation is a bug in whatever built
/// the `CompiledPattern`, not a condition a caller can act on, so it panics
/// instead of appearing as a variant (see `pattern_internal!` below).
#[derive(thiserror::Error, Debug)]
pub enum MatchError {
    /// The input source's `fill` call returned an I/O failure. The
    /// matcher's `Window` is left in whatever partial state it had; the
    /// caller should discard this `Matcher` rather than keep calling it.
    #[error("input source error: {0}")]
    Io(#[from] io::Error),

    /// A pattern compiled with strict Unicode validation hit a byte
    /// sequence that isn't valid UTF-8 at the given absolute offset.
    #[error("invalid encoding at offset {offset}")]
    EncodingReject { offset: usize },
}

pub type MatchResult<T> = Result<T, MatchError>;

/// Panics with a message identifying the invariant that the opcode tape
/// violated. Used at the handful of sites in `interp`/`advance` where the
/// tape is assumed well-formed.
macro_rules! pattern_internal {
    ($($arg:tt)*) => {
        panic!("pattern internal error (compiler bug, not a user error): {}", format!($($arg)*))
    };
}

pub(crate) use pattern_internal;
