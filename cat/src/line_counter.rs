//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Line number field for `cat -n` and `cat -b`.
//!
//! The number is kept as ASCII digits in a fixed buffer and incremented in
//! place, so producing the next field never formats an integer or allocates.
//! An 18 digit counter needs about a thousand years of output to fill up;
//! if it ever does, the leftmost cell turns into `>` and the counter stops.

/// Digit cells in the default counter.
pub const LINE_COUNTER_DIGITS: usize = 18;

/// Minimum width of the rendered number, not counting the tab.
pub const LINE_NUMBER_WIDTH: usize = 6;

/// Replaces the leftmost digit once the counter runs out of cells.
pub const OVERFLOW_MARKER: u8 = b'>';

#[derive(Debug, Clone)]
pub struct LineCounter {
    /// Digit cells followed by a single tab cell.
    cells: Box<[u8]>,
    /// First cell rendered; may point at leading padding.
    print: usize,
    /// Leftmost significant digit.
    start: usize,
    /// Rightmost digit.  Never moves.
    end: usize,
    saturated: bool,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::with_capacity(LINE_COUNTER_DIGITS, LINE_NUMBER_WIDTH)
    }

    /// A counter with `digits` digit cells, right aligned in a field at
    /// least `width` characters wide.  The value starts at 0.
    pub fn with_capacity(digits: usize, width: usize) -> Self {
        let digits = digits.max(1);
        let width = width.clamp(1, digits);

        let mut cells = vec![b' '; digits + 1].into_boxed_slice();
        let end = digits - 1;
        cells[end] = b'0';
        cells[digits] = b'\t';

        LineCounter {
            cells,
            print: digits - width,
            start: end,
            end,
            saturated: false,
        }
    }

    /// Add one.
    pub fn advance(&mut self) {
        if self.saturated {
            return;
        }

        let mut pos = self.end;
        loop {
            if self.cells[pos] < b'9' {
                self.cells[pos] += 1;
                return;
            }
            self.cells[pos] = b'0';
            if pos == self.start {
                break;
            }
            pos -= 1;
        }

        // carry out of the leftmost digit
        if self.start > 0 {
            self.start -= 1;
            self.cells[self.start] = b'1';
        } else {
            self.cells[0] = OVERFLOW_MARKER;
            self.saturated = true;
        }

        if self.start < self.print {
            self.print -= 1;
        }
    }

    /// The padded number followed by a tab.
    pub fn render(&self) -> &[u8] {
        &self.cells[self.print..=self.end + 1]
    }

    pub fn is_saturated(&self) -> bool {
        self.saturated
    }
}

impl Default for LineCounter {
    fn default() -> Self {
        Self::new()
    }
}
