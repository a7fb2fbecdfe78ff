// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed status-code enumeration and the error type handlers throw.
//!
//! Mirrors the gRPC status taxonomy (the protocol borrows grpc's codes
//! without depending on grpc) — see `error_map` in `catena-transport` for
//! the bit-exact mapping to each transport's native codes.

use std::fmt;

/// The closed set of status codes the core ever produces.
///
/// New members may only be appended; removing or renumbering a variant
/// would break the transport-specific mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Unauthenticated,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
        };
        f.write_str(s)
    }
}

/// A `(code, message)` pair — the only failure shape the core produces.
///
/// Handler bodies return this as the `Err` arm of a `Result`; the RPC
/// handler template (`rpc::template`) is where it gets converted to a
/// transport-specific response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct CatenaError {
    pub code: StatusCode,
    pub message: String,
}

impl CatenaError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

/// Builds a [`CatenaError`] with a consistent message format, the Rust
/// analog of the original SDK's `BAD_STATUS` macro.
#[macro_export]
macro_rules! catena_error {
    ($code:expr, $($arg:tt)*) => {
        $crate::status::CatenaError::new($code, format!($($arg)*))
    };
}

pub type CatenaResult<T> = Result<T, CatenaError>;

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
