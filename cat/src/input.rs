//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::fs;
use std::io::{self, Read};
use std::os::fd::AsRawFd;

/// A byte source for the transcoder.
///
/// Besides reading, a source may be able to say how many bytes could be read
/// right now without blocking.  The transcoder uses that to avoid flushing
/// its output while more input is already waiting.
pub trait InputSource: Read {
    /// `Ok(None)` means the source cannot tell.
    fn pending_bytes(&mut self) -> io::Result<Option<usize>> {
        Ok(None)
    }
}

impl InputSource for fs::File {
    fn pending_bytes(&mut self) -> io::Result<Option<usize>> {
        plib::platform::bytes_readable(self.as_raw_fd()).map(Some)
    }
}

impl InputSource for &[u8] {}

impl<T: AsRef<[u8]>> InputSource for io::Cursor<T> {}

impl<R: InputSource + ?Sized> InputSource for &mut R {
    fn pending_bytes(&mut self) -> io::Result<Option<usize>> {
        (**self).pending_bytes()
    }
}

impl<R: InputSource + ?Sized> InputSource for Box<R> {
    fn pending_bytes(&mut self) -> io::Result<Option<usize>> {
        (**self).pending_bytes()
    }
}

/// Errors from `pending_bytes` that mean "not supported for this kind of
/// file", as opposed to a real failure.
pub fn is_unsupported_query(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(libc::EOPNOTSUPP | libc::ENOTTY | libc::EINVAL | libc::ENODEV | libc::ENOSYS)
    )
}
