// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Indentation tracking for the `\i`/`\j`/`\k` (INDENT/DEDENT/UNDENT)
//! meta-transitions: a tab-stop stack much like a hand-rolled version of
//! Python's tokenizer indent stack, driven one line at a time by whatever
//! walks the buffer window past a newline.

/// What the most recent [`IndentTracker::measure_line`] call found,
/// consulted by the `Ind`/`Und` meta-transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineEvent {
    Same,
    Indent,
    Dedent,
}

pub struct IndentTracker {
    tab: Vec<u32>,
    col: u32,
    ded: u32,
    last: LineEvent,
}

impl IndentTracker {
    pub fn new() -> IndentTracker {
        IndentTracker { tab: vec![0], col: 0, ded: 0, last: LineEvent::Same }
    }

    /// Current nesting depth (number of indent levels pushed).
    pub fn depth(&self) -> usize {
        self.tab.len() - 1
    }

    /// The column width of the line currently being scanned.
    pub fn column(&self) -> u32 {
        self.col
    }

    /// Number of DEDENT events still owed before the indent stack matches
    /// `col`. The `Ded` meta-transition is taken unconditionally while
    /// this is nonzero.
    pub fn pending_dedents(&self) -> u32 {
        self.ded
    }

    /// Consume one pending dedent. Returns `false` (and does nothing) if
    /// none were pending.
    pub fn take_dedent(&mut self) -> bool {
        if self.ded > 0 {
            self.ded -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_indent(&self) -> bool {
        self.last == LineEvent::Indent
    }

    pub fn is_undent(&self) -> bool {
        self.last == LineEvent::Dedent && self.ded == 0
    }

    /// Record a new line's leading-whitespace width (tabs already expanded
    /// to stops by the caller) and update the stack. A deeper column
    /// pushes one new level (`Ind`); a shallower column pops every level
    /// strictly deeper than `col`, queuing one `Ded` per pop, and the
    /// final pop is additionally reported as `Und`.
    pub fn measure_line(&mut self, col: u32) {
        self.col = col;
        let top = *self.tab.last().expect("indent stack is never empty");
        if col > top {
            self.tab.push(col);
            self.last = LineEvent::Indent;
        } else if col < top {
            while self.tab.len() > 1 && col < *self.tab.last().unwrap() {
                self.tab.pop();
                self.ded += 1;
            }
            self.last = LineEvent::Dedent;
        } else {
            self.last = LineEvent::Same;
        }
    }
}

impl Default for IndentTracker {
    fn default() -> IndentTracker {
        IndentTracker::new()
    }
}
