// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol core for an ST2138 device-control service: status codes, paths,
//! scopes, authorization, the parameter visitor, subscription management,
//! the Connect streaming dispatcher, and the RPC handler template.
//!
//! This crate is transport-agnostic: it never depends on tonic or axum, and
//! never depends on a concrete device/parameter implementation. See
//! `catena-transport` for the wire bindings and `catena_core::testing` for
//! an in-memory `Device` used by this crate's own test suite.

pub mod authz;
pub mod connect;
pub mod device;
pub mod path;
pub mod rpc;
pub mod scopes;
pub mod status;
pub mod subscription;
pub mod testing;
pub mod visitor;

pub use authz::Authorizer;
pub use device::{Device, DeviceRegistry, Param, ParamDescriptor, Slot, Value};
pub use path::Path;
pub use status::{CatenaError, CatenaResult, StatusCode};
