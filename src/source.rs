// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The input source adapter: anything that can be asked to fill a buffer.
//! Kept deliberately narrow so callers can wrap a file, a pipe, a
//! decompressor, or an in-memory slice with the same
//! [`Window`](crate::buffer::Window) logic above it.

use std::io::{self, Read};

/// A byte producer for [`Window`](crate::buffer::Window). `fill` must
/// return `Ok(0)` only at true end-of-stream; a transient "no bytes right
/// now" condition belongs to the caller's I/O layer, not this trait.
pub trait Source {
    /// Write up to `dst.len()` bytes into `dst`, returning how many were
    /// written. `Ok(0)` means end-of-stream.
    fn fill(&mut self, dst: &mut [u8]) -> io::Result<usize>;

    /// The absolute byte offset of the next byte this source will produce,
    /// if the source can report one (e.g. a seekable file). Used only for
    /// diagnostics; the matching core never depends on it.
    fn file_position(&self) -> Option<u64> {
        None
    }
}

/// A [`Source`] over an in-memory byte slice. Exercises the matching core
/// exactly as a `Read`-backed source would, just without any I/O latency —
/// useful for the refill-transparency property tests (P5).
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> SliceSource<'a> {
        SliceSource { data, pos: 0 }
    }
}

impl<'a> Source for SliceSource<'a> {
    fn fill(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.pos..];
        let n = remaining.len().min(dst.len());
        dst[..n].copy_from_slice(&remaining[..n]);
        self.pos += n;
        Ok(n)
    }

    fn file_position(&self) -> Option<u64> {
        Some(self.pos as u64)
    }
}

/// A [`Source`] wrapping any [`Read`] — files, pipes, decompressing
/// readers, anything.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> ReaderSource<R> {
        ReaderSource { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Source for ReaderSource<R> {
    fn fill(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.reader.read(dst) {
                Ok(n) => return Ok(n),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
