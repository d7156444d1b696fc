// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use std::fmt;

/// Errors that abort a run. Both kinds are fatal; there is nothing to retry since every run is a
/// single read-only query.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The external status command could not be run, exited non-zero, or a snapshot of its
    /// output could not be read or written.
    Execution(String),
    /// An invalid flag value, flag combination, or configuration file.
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn execution(msg: impl Into<String>) -> Self {
        Error::Execution(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Execution(msg) => write!(f, "execution error: {msg}"),
            Error::Configuration(msg) => write!(f, "configuration error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
