// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A streaming, SIMD-accelerated matching core built for recursive search
//! tools: feed it bytes in whatever chunks arrive, hand it an already
//! compiled pattern, and it finds matches without ever materializing the
//! whole input in memory.
//!
//! This crate does not parse regex syntax — [`pattern::PatternBuilder`]
//! assembles a [`pattern::CompiledPattern`] from an opcode tape and literal
//! metadata the caller already has. What it does provide is everything
//! below that: the sliding buffer window, the fast-skip prefilters, the
//! tape interpreter, and the indentation tracker a caller's own compiler
//! can be built on top of.
//!
//! ```no_run
//! use std::sync::atomic::AtomicBool;
//! use streammatch_core::matcher::{Matcher, MatchOutcome, Options};
//! use streammatch_core::pattern::CompiledPattern;
//! use streammatch_core::source::SliceSource;
//!
//! let pattern = CompiledPattern::literal(b"needle");
//! let mut matcher = Matcher::new(SliceSource::new(b"hay needle hay"), Options::default());
//! let cancelled = AtomicBool::new(false);
//! match matcher.find(&pattern, 0, &cancelled).unwrap() {
//!     MatchOutcome::Found(m) => assert_eq!(m.begin(), 4),
//!     _ => unreachable!(),
//! }
//! ```

pub mod advance;
pub mod buffer;
pub mod error;
pub mod indent;
pub mod interp;
pub mod matcher;
pub mod opcode;
pub mod pattern;
mod simd;
pub mod source;

pub use error::{MatchError, MatchResult};
pub use matcher::{Match, MatchOutcome, Matcher, Options, SplitOutcome};
pub use pattern::{CompiledPattern, PatternBuilder};
