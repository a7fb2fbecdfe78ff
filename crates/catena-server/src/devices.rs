// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the in-memory, test-oriented device set this server exposes.
//! `catena-server` plays the role the spec reserves for a concrete device
//! vendor integration — it never appears in `catena-core`'s required deps.

use catena_core::device::{ParamKind, Value};
use catena_core::testing::{DeviceBuilder, MockRegistry};

/// Builds the demo slot map: one audio-mixer-shaped device in slot 0, one
/// bare command-only device in slot 1.
pub fn demo_registry() -> MockRegistry {
    let mixer = DeviceBuilder::default()
        .default_scope("st2138:mon")
        .param("/gain", ParamKind::Scalar, Value::Float32(0.0), None)
        .describe("/gain", vec!["/g".into()], [("en".into(), "Gain".into())].into())
        .param("/mute", ParamKind::Scalar, Value::Bool(false), None)
        .param("/channels", ParamKind::Array, Value::Empty, Some(2))
        .param("/channels/0", ParamKind::Scalar, Value::Float32(0.0), None)
        .param("/channels/1", ParamKind::Scalar, Value::Float32(0.0), None)
        .command("/reset")
        .build();

    let relay = DeviceBuilder::default().default_scope("st2138:mon").command("/trigger").build();

    MockRegistry::from_devices(vec![(0, mixer), (1, relay)])
}

#[cfg(test)]
#[path = "devices_tests.rs"]
mod tests;
