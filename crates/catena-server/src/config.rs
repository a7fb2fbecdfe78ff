// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// ST2138 device-control server: serves the `Catena` protocol over gRPC and
/// HTTP/SSE from a single process.
#[derive(Debug, Parser)]
#[command(name = "catena-server", version, about)]
pub struct Config {
    /// Host address to bind to.
    #[arg(long, env = "CATENA_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// gRPC port to listen on.
    #[arg(long, env = "CATENA_GRPC_PORT", default_value = "6001")]
    pub grpc_port: u16,

    /// HTTP/SSE port to listen on.
    #[arg(long, env = "CATENA_HTTP_PORT", default_value = "6002")]
    pub http_port: u16,

    /// Health-check-only HTTP port.
    #[arg(long, env = "CATENA_HEALTH_PORT")]
    pub health_port: Option<u16>,

    /// Require a JWS bearer token on every request.
    #[arg(long, env = "CATENA_AUTH")]
    pub auth: bool,

    /// Maximum concurrent Connect sessions.
    #[arg(long, env = "CATENA_MAX_CONNECTIONS", default_value = "64")]
    pub max_connections: usize,

    /// Log format (json or text).
    #[arg(long, env = "CATENA_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "CATENA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
