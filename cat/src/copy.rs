//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Plain copying, used when no output transformation was requested.

use std::io::{self, Read, Write};
use std::os::fd::RawFd;

use log::{debug, trace};

use crate::error::{CatError, Result};

/// Largest request handed to `copy_file_range` in one call: the smaller of
/// `isize::MAX` and `usize::MAX`, rounded down to a multiple of 1 GiB.
pub const COPY_MAX: usize = (isize::MAX as usize) >> 30 << 30;

/// What the zero-copy path managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The whole input was moved.
    Copied,
    /// Nothing was moved; use `simple_copy` instead.
    Fallback,
}

/// Copy `input` to `output` through `buf`, without looking at the data.
pub fn simple_copy<R, W>(input: &mut R, output: &mut W, buf: &mut [u8]) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    loop {
        let n_read = match input.read(buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CatError::Read(e)),
        };

        if n_read == 0 {
            return Ok(());
        }

        trace!("simple_copy: relaying {n_read} bytes");
        output.write_all(&buf[..n_read]).map_err(CatError::Write)?;
    }
}

/// Errors from `copy_file_range` that only mean it cannot be used for this
/// pair of descriptors.
fn is_unsupported_copy(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(
            libc::ENOSYS
                | libc::EOPNOTSUPP
                | libc::EINVAL
                | libc::EBADF
                | libc::EXDEV
                | libc::ETXTBSY
                | libc::EPERM
        )
    ) || e.raw_os_error() == Some(libc::ENOTSUP)
}

/// Copy from `input_fd` to `output_fd` inside the kernel.
///
/// Some kernels wrongly report 0 bytes when reading from procfs, so a
/// first call that moves nothing is treated as "try the ordinary way"
/// rather than as an empty input.
pub fn copy_range(input_fd: RawFd, output_fd: RawFd) -> Result<CopyOutcome> {
    let mut some_copied = false;

    loop {
        match plib::platform::copy_file_range(input_fd, output_fd, COPY_MAX) {
            Ok(0) => {
                if some_copied {
                    return Ok(CopyOutcome::Copied);
                }
                debug!("copy_range: nothing copied, falling back");
                return Ok(CopyOutcome::Fallback);
            }
            Ok(n) => {
                trace!("copy_range: moved {n} bytes");
                some_copied = true;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_unsupported_copy(&e) => {
                debug!("copy_range: unsupported ({e}), falling back");
                return Ok(CopyOutcome::Fallback);
            }
            Err(e) => return Err(CatError::Read(e)),
        }
    }
}
