//
// Copyright (c) The Netconf Client Contributors
//
// SPDX-License-Identifier: MIT
//

// YANG data errors.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidPath(String, &'static str),
}

// ===== impl Error =====

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidPath(path, reason) => {
                write!(f, "invalid instance path '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}
