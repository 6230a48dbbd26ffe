//
// Copyright (c) 2024 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io;

use plib::io::error_string;

#[derive(thiserror::Error, Debug)]
pub enum CatError {
    /// Reading the input failed.  Only this input is affected.
    #[error("{}", error_string(.0))]
    Read(#[source] io::Error),
    /// Asking the input how much data is pending failed unexpectedly.
    #[error("cannot do ioctl: {}", error_string(.0))]
    Ioctl(#[source] io::Error),
    /// Writing the output failed.  The output can no longer be trusted, so
    /// callers must stop.
    #[error("write error: {}", error_string(.0))]
    Write(#[source] io::Error),
    #[error("{}", error_string(.0))]
    Open(#[source] io::Error),
    #[error("input file is output file")]
    SameFile,
}

impl CatError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CatError::Write(_))
    }
}

pub type Result<T> = std::result::Result<T, CatError>;
