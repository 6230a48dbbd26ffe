//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::fs::File;
use std::io::Seek;
use std::os::fd::AsRawFd;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use clap::Parser;
use gettextrs::gettext;
use log::debug;
use plib::BUFSZ;

pub mod copy;
pub mod error;
pub mod input;
pub mod line_counter;
pub mod transcode;

use copy::CopyOutcome;
use error::{CatError, Result};
use transcode::{Buffers, Options, Session};

/// cat - concatenate and print files
#[derive(Parser, Debug, Default)]
#[command(version, about = gettext("cat - concatenate and print files"))]
pub struct Args {
    #[arg(short = 'A', long, help = gettext("Equivalent to -vET"))]
    pub show_all: bool,

    #[arg(short = 'b', long, help = gettext("Number nonempty output lines, overrides -n"))]
    pub number_nonblank: bool,

    #[arg(short = 'e', help = gettext("Equivalent to -vE"))]
    pub show_nonprinting_ends: bool,

    #[arg(short = 'E', long, help = gettext("Display $ at end of each line"))]
    pub show_ends: bool,

    #[arg(short = 'n', long, help = gettext("Number all output lines"))]
    pub number: bool,

    #[arg(short = 's', long, help = gettext("Suppress repeated empty output lines"))]
    pub squeeze_blank: bool,

    #[arg(short = 't', help = gettext("Equivalent to -vT"))]
    pub show_nonprinting_tabs: bool,

    #[arg(short = 'T', long, help = gettext("Display TAB characters as ^I"))]
    pub show_tabs: bool,

    /// Disable output buffering (a no-op, for POSIX compat.)
    #[arg(short = 'u')]
    pub unbuffered: bool,

    #[arg(short = 'v', long, help = gettext("Use ^ and M- notation, except for LFD and TAB"))]
    pub show_nonprinting: bool,

    #[arg(help = gettext("Files to read as input.  Use \"-\" or no-args for stdin."))]
    pub files: Vec<PathBuf>,
}

impl Args {
    pub fn options(&self) -> Options {
        Options {
            show_nonprinting: self.show_nonprinting
                || self.show_all
                || self.show_nonprinting_ends
                || self.show_nonprinting_tabs,
            show_tabs: self.show_tabs || self.show_all || self.show_nonprinting_tabs,
            number: self.number || self.number_nonblank,
            number_nonblank: self.number_nonblank,
            show_ends: self.show_ends || self.show_all || self.show_nonprinting_ends,
            squeeze_blank: self.squeeze_blank,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId {
    dev: u64,
    ino: u64,
}

enum Mode {
    Plain { buf: Vec<u8> },
    Transform { buffers: Buffers },
}

/// Copies inputs to one output in turn, keeping line numbers and the other
/// transcoder state running from one input to the next.
pub struct Concatenator {
    options: Options,
    mode: Mode,
    session: Session,
    /// Set when the output is a regular file.
    output_id: Option<FileId>,
}

impl Concatenator {
    pub fn new(options: Options, output: &File) -> Self {
        let mode = if options.is_plain() {
            Mode::Plain {
                buf: vec![0; BUFSZ],
            }
        } else {
            Mode::Transform {
                buffers: Buffers::default(),
            }
        };

        let output_id = output
            .metadata()
            .ok()
            .filter(|md| md.file_type().is_file())
            .map(|md| FileId {
                dev: md.dev(),
                ino: md.ino(),
            });

        Concatenator {
            options,
            mode,
            session: Session::new(),
            output_id,
        }
    }

    /// Open `path` ("-" is standard input) and copy it.
    pub fn cat_path(&mut self, path: &Path, output: &mut File) -> Result<()> {
        let mut input = plib::io::input_file(path, true).map_err(CatError::Open)?;
        self.cat_file(&mut input, output)
    }

    /// Copy one already open input.
    pub fn cat_file(&mut self, input: &mut File, output: &mut File) -> Result<()> {
        self.check_not_output(input)?;

        match &mut self.mode {
            Mode::Plain { buf } => {
                if copy::copy_range(input.as_raw_fd(), output.as_raw_fd())? == CopyOutcome::Copied
                {
                    return Ok(());
                }
                copy::simple_copy(input, output, buf)
            }
            Mode::Transform { buffers } => {
                transcode::cat(input, output, buffers, &self.options, &mut self.session)
            }
        }
    }

    /// Flush state left over after the last input.
    pub fn finish(&mut self, output: &mut File) -> Result<()> {
        self.session.finish(output)
    }

    /// Copying a nonempty regular file onto itself would only fill the disk.
    fn check_not_output(&self, input: &mut File) -> Result<()> {
        let Some(out) = self.output_id else {
            return Ok(());
        };

        let md = input.metadata().map_err(CatError::Read)?;
        if md.file_type().is_file() && md.dev() == out.dev && md.ino() == out.ino {
            let pos = input.stream_position().map_err(CatError::Read)?;
            if pos < md.len() {
                return Err(CatError::SameFile);
            }
        }
        Ok(())
    }
}

/// Run `cat` with parsed arguments; returns the exit status.
pub fn run(mut args: Args) -> i32 {
    let options = args.options();
    debug!("cat: {options:?}");

    if args.files.is_empty() {
        args.files.push(PathBuf::from("-"));
    }

    let mut output = match plib::io::stdout_file() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cat: {}", CatError::Write(e));
            return 1;
        }
    };

    let mut concat = Concatenator::new(options, &output);
    let mut exit_code = 0;

    for filename in &args.files {
        match concat.cat_path(filename, &mut output) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                eprintln!("cat: {}", e);
                return 1;
            }
            Err(e) => {
                exit_code = 1;
                eprintln!("cat: {}: {}", filename.display(), e);
            }
        }
    }

    if let Err(e) = concat.finish(&mut output) {
        eprintln!("cat: {}", e);
        return 1;
    }

    exit_code
}
