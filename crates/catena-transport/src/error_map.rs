// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! §6 bit-exact `StatusCode` → transport-code mapping, generalizing the
//! teacher's `ErrorCode::http_status`/`grpc_code`/`to_grpc_status` from a
//! small fixed enum to the full status taxonomy of spec.md §7.

use axum::http::StatusCode as HttpStatusCode;
use axum::Json;
use catena_core::status::{CatenaError, StatusCode};
use serde::{Deserialize, Serialize};

/// Top-level error response envelope shared across HTTP and SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body containing a machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// HTTP status for a given [`StatusCode`] (§6, bit-exact).
pub fn http_status(code: StatusCode) -> u16 {
    match code {
        StatusCode::Ok => 200,
        StatusCode::Cancelled => 499,
        StatusCode::Unknown => 500,
        StatusCode::InvalidArgument => 400,
        StatusCode::DeadlineExceeded => 504,
        StatusCode::NotFound => 404,
        StatusCode::AlreadyExists => 409,
        StatusCode::PermissionDenied => 403,
        StatusCode::Unauthenticated => 401,
        StatusCode::ResourceExhausted => 429,
        StatusCode::FailedPrecondition => 412,
        StatusCode::Aborted => 409,
        StatusCode::OutOfRange => 400,
        StatusCode::Unimplemented => 501,
        StatusCode::Internal => 500,
        StatusCode::Unavailable => 503,
        StatusCode::DataLoss => 500,
    }
}

/// gRPC status code for a given [`StatusCode`]. `tonic::Code` already names
/// this taxonomy 1:1, so the mapping is a straight rename.
pub fn grpc_code(code: StatusCode) -> tonic::Code {
    match code {
        StatusCode::Ok => tonic::Code::Ok,
        StatusCode::Cancelled => tonic::Code::Cancelled,
        StatusCode::Unknown => tonic::Code::Unknown,
        StatusCode::InvalidArgument => tonic::Code::InvalidArgument,
        StatusCode::DeadlineExceeded => tonic::Code::DeadlineExceeded,
        StatusCode::NotFound => tonic::Code::NotFound,
        StatusCode::AlreadyExists => tonic::Code::AlreadyExists,
        StatusCode::PermissionDenied => tonic::Code::PermissionDenied,
        StatusCode::Unauthenticated => tonic::Code::Unauthenticated,
        StatusCode::ResourceExhausted => tonic::Code::ResourceExhausted,
        StatusCode::FailedPrecondition => tonic::Code::FailedPrecondition,
        StatusCode::Aborted => tonic::Code::Aborted,
        StatusCode::OutOfRange => tonic::Code::OutOfRange,
        StatusCode::Unimplemented => tonic::Code::Unimplemented,
        StatusCode::Internal => tonic::Code::Internal,
        StatusCode::Unavailable => tonic::Code::Unavailable,
        StatusCode::DataLoss => tonic::Code::DataLoss,
    }
}

/// Converts a [`CatenaError`] into a [`tonic::Status`].
pub fn to_grpc_status(err: &CatenaError) -> tonic::Status {
    tonic::Status::new(grpc_code(err.code), err.message.clone())
}

/// Converts a [`CatenaError`] into an axum JSON error response.
pub fn to_http_response(err: &CatenaError) -> (HttpStatusCode, Json<ErrorResponse>) {
    let status = HttpStatusCode::from_u16(http_status(err.code)).unwrap_or(HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse {
        error: ErrorBody { code: format!("{}", err.code), message: err.message.clone() },
    };
    (status, Json(body))
}

#[cfg(test)]
#[path = "error_map_tests.rs"]
mod tests;
