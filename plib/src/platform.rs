//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io;
use std::os::fd::RawFd;

fn errno_error() -> io::Error {
    io::Error::from_raw_os_error(errno::errno().0)
}

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// Move up to `len` bytes from `in_fd` to `out_fd` inside the kernel,
        /// using and updating both descriptors' file offsets.
        pub fn copy_file_range(in_fd: RawFd, out_fd: RawFd, len: usize) -> io::Result<usize> {
            let ret = unsafe {
                libc::copy_file_range(
                    in_fd,
                    std::ptr::null_mut(),
                    out_fd,
                    std::ptr::null_mut(),
                    len,
                    0,
                )
            };

            if ret < 0 {
                Err(errno_error())
            } else {
                Ok(ret as usize)
            }
        }
    } else {
        /// The primitive does not exist here; report it the way the kernel
        /// reports an unimplemented system call.
        pub fn copy_file_range(_in_fd: RawFd, _out_fd: RawFd, _len: usize) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(libc::ENOSYS))
        }
    }
}

/// Number of bytes that can be read from `fd` without blocking (FIONREAD).
pub fn bytes_readable(fd: RawFd) -> io::Result<usize> {
    let mut n_to_read: libc::c_int = 0;

    let ret = unsafe { libc::ioctl(fd, libc::FIONREAD, &mut n_to_read as *mut libc::c_int) };

    if ret < 0 {
        Err(errno_error())
    } else {
        Ok(n_to_read.max(0) as usize)
    }
}
