// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use reqwest::StatusCode;

use crate::validate::TypeMismatch;

/// Operational failure of a credential exchange. Logged where it happens and
/// handed back to the caller as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status.
    Status(StatusCode),
    /// The request never produced a response (DNS, connect, TLS, I/O).
    Transport(String),
}

impl FetchFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status(_) => "HTTP_STATUS",
            Self::Transport(_) => "TRANSPORT",
        }
    }

    /// Status code for `Status` failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Transport(_) => None,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{code}"),
            Self::Transport(reason) => f.write_str(reason),
        }
    }
}

/// Errors a credential exchange propagates instead of logging.
#[derive(Debug)]
pub enum CredentialError {
    /// An input failed its kind check; no request was sent.
    TypeMismatch(TypeMismatch),
    /// A 2xx response whose body could not be used.
    MalformedBody { operation: &'static str, detail: String },
}

impl CredentialError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch(_) => "TYPE_MISMATCH",
            Self::MalformedBody { .. } => "MALFORMED_BODY",
        }
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch(e) => write!(f, "{e}"),
            Self::MalformedBody { operation, detail } => {
                write!(f, "malformed response body in {operation}: {detail}")
            }
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TypeMismatch(e) => Some(e),
            Self::MalformedBody { .. } => None,
        }
    }
}

impl From<TypeMismatch> for CredentialError {
    fn from(e: TypeMismatch) -> Self {
        Self::TypeMismatch(e)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
