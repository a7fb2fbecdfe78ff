// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire bindings for `catena-core`: a tonic gRPC service and an axum
//! HTTP/SSE router, both calling into the same transport-agnostic handler
//! functions in `catena_core::rpc::handlers`.

pub mod error_map;
pub mod grpc;
pub mod http;
pub mod state;
