// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gRPC transport implementing the `Catena` service defined in `catena.v1`.

pub mod convert;
mod service;

use std::sync::Arc;

use crate::state::ServiceState;

/// Generated protobuf types for the `catena.v1` package.
pub mod proto {
    tonic::include_proto!("catena.v1");
}

/// gRPC implementation of the `catena.v1.Catena` service.
pub struct CatenaGrpc {
    state: Arc<ServiceState>,
}

impl CatenaGrpc {
    pub fn new(state: Arc<ServiceState>) -> Self {
        Self { state }
    }

    /// Builds a [`tonic`] router serving this service.
    pub fn into_router(self) -> tonic::transport::server::Router {
        tonic::transport::Server::builder().add_service(proto::catena_server::CatenaServer::new(self))
    }

    fn bearer_header<'a, T>(request: &'a tonic::Request<T>) -> Option<&'a str> {
        request.metadata().get("authorization").and_then(|v| v.to_str().ok())
    }
}
