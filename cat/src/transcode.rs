//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! The `cat` output transformations: `-n`, `-b`, `-s`, `-E`, `-T` and `-v`.
//!
//! Input is read into a buffer with one spare byte, and a newline is always
//! stored just past the data that was read.  The scanning loops below only
//! stop at newlines, so that sentinel is what ends a chunk; telling it apart
//! from a real newline is a single index comparison.

use std::io::{self, Write};

use log::{debug, trace};
use plib::BUFSZ;

use crate::error::{CatError, Result};
use crate::input::{is_unsupported_query, InputSource};
use crate::line_counter::{LineCounter, LINE_COUNTER_DIGITS};

/// Which transformations to apply.  Combining flags (`-A`, `-e`, `-t`, `-b`
/// implying `-n`) is left to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub show_nonprinting: bool,
    pub show_tabs: bool,
    pub number: bool,
    pub number_nonblank: bool,
    pub show_ends: bool,
    pub squeeze_blank: bool,
}

impl Options {
    /// True when output would be a byte-for-byte copy of the input.
    pub fn is_plain(&self) -> bool {
        !(self.show_nonprinting
            || self.show_tabs
            || self.number
            || self.number_nonblank
            || self.show_ends
            || self.squeeze_blank)
    }
}

/// State that survives from one input file to the next.
///
/// Numbering continues across files, and a run of blank lines or a
/// carriage return split across a file boundary is handled as if the files
/// were one stream.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// -1 in the middle of a line, 0 at the start of a line, 1 after an
    /// empty line, 2 after two or more.
    newlines: i32,
    /// A CR was the last byte of a chunk and may still turn out to end a line.
    pending_cr: bool,
    counter: LineCounter,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(counter: LineCounter) -> Self {
        Session {
            counter,
            ..Self::default()
        }
    }

    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }

    pub fn has_pending_cr(&self) -> bool {
        self.pending_cr
    }

    /// Emit a CR still held back when the last input ended.
    pub fn finish<W: Write + ?Sized>(&mut self, output: &mut W) -> Result<()> {
        if self.pending_cr {
            self.pending_cr = false;
            output
                .write_all(b"\r")
                .and_then(|_| output.flush())
                .map_err(CatError::Write)?;
        }
        Ok(())
    }
}

/// I/O buffers, allocated once and reused for every input.
#[derive(Debug)]
pub struct Buffers {
    inbuf: Vec<u8>,
    insize: usize,
    outbuf: Vec<u8>,
    outsize: usize,
}

impl Buffers {
    /// `insize` bytes are requested per read and output is written in
    /// blocks of `outsize` bytes.
    pub fn new(insize: usize, outsize: usize) -> Self {
        let insize = insize.max(1);
        let outsize = outsize.max(1);

        // Output is only checked against `outsize` at newlines, so one
        // whole chunk can land in it first: every byte may become four
        // ("M-^X"), plus a number field before and after and "^M$\n".
        let headroom = insize * 4 + 2 * (LINE_COUNTER_DIGITS + 1) + 4;

        Buffers {
            inbuf: vec![0; insize + 1],
            insize,
            outbuf: Vec::with_capacity(outsize + headroom),
            outsize,
        }
    }
}

impl Default for Buffers {
    fn default() -> Self {
        Self::new(BUFSZ, BUFSZ)
    }
}

/// Append the `-v` rendering of `ch`, which is not a newline.
fn push_visible(out: &mut Vec<u8>, ch: u8, show_tabs: bool) {
    if ch >= 128 {
        out.extend_from_slice(b"M-");
        push_visible(out, ch - 128, true);
    } else if ch == 127 {
        out.extend_from_slice(b"^?");
    } else if ch >= 32 {
        out.push(ch);
    } else if ch == b'\t' && !show_tabs {
        out.push(b'\t');
    } else {
        out.push(b'^');
        out.push(ch + 64);
    }
}

/// Write out everything buffered.
fn write_pending<W: Write + ?Sized>(output: &mut W, outbuf: &mut Vec<u8>) -> Result<()> {
    if !outbuf.is_empty() {
        trace!("write_pending: {} bytes", outbuf.len());
        output.write_all(outbuf).map_err(CatError::Write)?;
        output.flush().map_err(CatError::Write)?;
        outbuf.clear();
    }
    Ok(())
}

/// Write whole `outsize` blocks and keep the remainder at the front.
fn write_blocks<W: Write + ?Sized>(
    output: &mut W,
    outbuf: &mut Vec<u8>,
    outsize: usize,
) -> Result<()> {
    let mut written = 0;
    while outbuf.len() - written >= outsize {
        output
            .write_all(&outbuf[written..written + outsize])
            .map_err(CatError::Write)?;
        written += outsize;
    }
    outbuf.drain(..written);
    Ok(())
}

/// Copy `input` to `output`, applying `options`.
///
/// A read error is returned after everything processed so far has been
/// written.  A `CatError::Write` means the output is broken and the caller
/// should give up entirely.
pub fn cat<R, W>(
    input: &mut R,
    output: &mut W,
    buffers: &mut Buffers,
    options: &Options,
    session: &mut Session,
) -> Result<()>
where
    R: InputSource + ?Sized,
    W: Write + ?Sized,
{
    let Buffers {
        inbuf,
        insize,
        outbuf,
        outsize,
    } = buffers;
    let (insize, outsize) = (*insize, *outsize);

    let mut use_fionread = true;

    // End of valid data in `inbuf`; the sentinel lives here.
    let mut eob = 0;
    // Next byte to look at.  Starting past `eob` forces an immediate read.
    let mut bpin = eob + 1;

    outbuf.clear();

    loop {
        // Newlines, one at a time, until some other byte turns up.
        let mut ch = loop {
            if outbuf.len() >= outsize {
                write_blocks(output, outbuf, outsize)?;
            }

            if bpin > eob {
                // About to read.  Unless input is already waiting, the read
                // may block, so don't sit on output in the meantime.
                let mut input_pending = false;
                if use_fionread {
                    match input.pending_bytes() {
                        Ok(Some(n)) => input_pending = n > 0,
                        Ok(None) => use_fionread = false,
                        Err(e) if is_unsupported_query(&e) => {
                            debug!("cat: pending byte count unavailable ({e})");
                            use_fionread = false;
                        }
                        Err(e) => {
                            write_pending(output, outbuf)?;
                            return Err(CatError::Ioctl(e));
                        }
                    }
                }

                if !input_pending {
                    write_pending(output, outbuf)?;
                }

                let n_read = loop {
                    match input.read(&mut inbuf[..insize]) {
                        Ok(n) => break n,
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            write_pending(output, outbuf)?;
                            return Err(CatError::Read(e));
                        }
                    }
                };
                trace!("cat: read {n_read} bytes");

                if n_read == 0 {
                    write_pending(output, outbuf)?;
                    return Ok(());
                }

                bpin = 0;
                eob = n_read;
                inbuf[eob] = b'\n';
            } else {
                // A real newline.  Two or more in a row mean the line that
                // just ended was empty.
                session.newlines += 1;

                let mut suppress = false;
                if session.newlines > 0 {
                    if session.newlines >= 2 {
                        // keep it from growing on long runs of empty lines
                        session.newlines = 2;
                        suppress = options.squeeze_blank;
                    }

                    if !suppress && options.number && !options.number_nonblank {
                        session.counter.advance();
                        outbuf.extend_from_slice(session.counter.render());
                    }
                }

                if !suppress {
                    if options.show_ends {
                        if session.pending_cr {
                            outbuf.extend_from_slice(b"^M");
                            session.pending_cr = false;
                        }
                        outbuf.push(b'$');
                    }
                    outbuf.push(b'\n');
                }
            }

            let ch = inbuf[bpin];
            bpin += 1;
            if ch != b'\n' {
                break ch;
            }
        };

        // A held back CR that was not followed by a newline after all.
        if session.pending_cr {
            outbuf.push(b'\r');
            session.pending_cr = false;
        }

        if session.newlines >= 0 && options.number {
            session.counter.advance();
            outbuf.extend_from_slice(session.counter.render());
        }

        // Scan to the next newline, real or sentinel.
        if options.show_nonprinting {
            loop {
                if ch == b'\n' {
                    session.newlines = -1;
                    break;
                }
                push_visible(outbuf, ch, options.show_tabs);

                ch = inbuf[bpin];
                bpin += 1;
            }
        } else {
            loop {
                if ch == b'\n' {
                    session.newlines = -1;
                    break;
                }

                if ch == b'\t' && options.show_tabs {
                    outbuf.extend_from_slice(b"^I");
                } else if ch == b'\r' && options.show_ends && inbuf[bpin] == b'\n' {
                    if bpin == eob {
                        // only the sentinel follows; decide after the next read
                        session.pending_cr = true;
                    } else {
                        outbuf.extend_from_slice(b"^M");
                    }
                } else {
                    outbuf.push(ch);
                }

                ch = inbuf[bpin];
                bpin += 1;
            }
        }
    }
}
