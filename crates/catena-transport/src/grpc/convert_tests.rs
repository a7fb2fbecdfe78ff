// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn value_round_trips_every_variant() {
    let values = vec![
        Value::Empty,
        Value::Int32(-7),
        Value::Float32(1.5),
        Value::String("hi".into()),
        Value::Bool(true),
        Value::Int32Array(vec![1, 2, 3]),
        Value::Float32Array(vec![1.0, 2.0]),
        Value::StringArray(vec!["a".into(), "b".into()]),
    ];
    for value in values {
        let proto = value_to_proto(value.clone());
        assert_eq!(value_from_proto(proto), value);
    }
}

#[test]
fn detail_level_unspecified_maps_to_unset() {
    assert_eq!(detail_level_from_proto(99), DetailLevel::Unset);
    assert_eq!(detail_level_from_proto(proto::DetailLevel::Full as i32), DetailLevel::Full);
}

#[test]
fn command_response_no_response_maps_to_empty_kind() {
    let proto = command_response_to_proto(CommandResponse::NoResponse);
    assert!(matches!(proto.kind, Some(proto::command_response::Kind::NoResponse(_))));
}

#[test]
fn push_update_slots_added_carries_slot_list() {
    let proto = push_update_to_proto(PushUpdate::SlotsAdded(vec![0, 1]));
    match proto.kind {
        Some(proto::push_updates::Kind::SlotsAdded(list)) => assert_eq!(list.slots, vec![0, 1]),
        other => panic!("expected SlotsAdded, got {other:?}"),
    }
}
