//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use gettextrs::gettext;
use std::ffi::CStr;
use std::fs;
use std::io;
use std::os::fd::AsFd;
use std::path::Path;

/// Returns true if `pathname` names standard input.
pub fn is_stdin(pathname: &Path, dashed_stdin: bool) -> bool {
    let path_str = pathname.as_os_str();
    (dashed_stdin && path_str == "-") || (!dashed_stdin && path_str.is_empty())
}

/// Open a file, or stdin, as an unbuffered `File`.
///
/// Standard input is duplicated rather than borrowed through `io::Stdin`,
/// so reads go straight to the descriptor and bypass the std line buffer.
/// The duplicate shares the file offset with descriptor 0.
pub fn input_file(pathname: &Path, dashed_stdin: bool) -> io::Result<fs::File> {
    if is_stdin(pathname, dashed_stdin) {
        let fd = io::stdin().as_fd().try_clone_to_owned()?;
        Ok(fs::File::from(fd))
    } else {
        fs::File::open(pathname)
    }
}

/// Standard output as an unbuffered `File`, sharing descriptor 1's offset.
pub fn stdout_file() -> io::Result<fs::File> {
    let fd = io::stdout().as_fd().try_clone_to_owned()?;
    Ok(fs::File::from(fd))
}

/// Return the error message without the "(os error N)" suffix that
/// `format!("{e}")` appends.
pub fn error_string(e: &io::Error) -> String {
    let s = match e.raw_os_error() {
        Some(errno) => {
            let mut buf = [0; 128];

            unsafe {
                if libc::strerror_r(errno as _, buf.as_mut_ptr(), buf.len()) == 0 {
                    String::from_utf8_lossy(CStr::from_ptr(buf.as_ptr()).to_bytes()).to_string()
                } else {
                    String::from("Unknown error")
                }
            }
        }
        None => format!("{e}"),
    };

    gettext(s)
}
