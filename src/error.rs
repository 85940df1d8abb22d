// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;

/// Top-level error type for stanza parsing and building.
#[derive(Debug)]
pub enum Error {
    /// A required attribute or child was missing.
    Missing(&'static str),
    /// An attribute or child had a value this crate doesn't understand.
    Invalid(String),
    /// The element did not match the type being parsed.
    Mismatch,
    /// An integer attribute failed to parse.
    ParseInt(std::num::ParseIntError),
    /// Base64-encoded text failed to decode.
    Base64(base64::DecodeError),
    /// Malformed JID.
    Jid(jid::Error),
    /// I/O error opening or writing a file sink.
    Io(IoError),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Missing(what) => write!(fmt, "required field '{}' missing", what),
            Error::Invalid(msg) => write!(fmt, "{}", msg),
            Error::Mismatch => write!(fmt, "element does not match expected name or namespace"),
            Error::ParseInt(e) => write!(fmt, "integer parse error: {}", e),
            Error::Base64(e) => write!(fmt, "base64 decode error: {}", e),
            Error::Jid(e) => write!(fmt, "jid parse error: {}", e),
            Error::Io(e) => write!(fmt, "I/O error: {}", e),
        }
    }
}

impl StdError for Error {}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

impl From<jid::Error> for Error {
    fn from(e: jid::Error) -> Self {
        Error::Jid(e)
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(e: std::num::ParseIntError) -> Self {
        Error::ParseInt(e)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Base64(e)
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(e: std::convert::Infallible) -> Self {
        match e {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;
