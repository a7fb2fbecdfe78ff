// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conversions between `catena_core`'s transport-agnostic plain types and
//! the generated `catena.v1` protobuf messages.

use catena_core::connect::PushUpdate;
use catena_core::device::{DetailLevel, LanguagePack, ParamKind, Value};
use catena_core::rpc::handlers::{CommandResponse, ParamDetail, ParamEntry, ParamInfoEntry};

use super::proto;

pub fn value_to_proto(value: Value) -> proto::Value {
    use proto::value::Kind;
    let kind = match value {
        Value::Empty => None,
        Value::Int32(v) => Some(Kind::Int32Value(v)),
        Value::Float32(v) => Some(Kind::Float32Value(v)),
        Value::String(v) => Some(Kind::StringValue(v)),
        Value::Bool(v) => Some(Kind::BoolValue(v)),
        Value::Int32Array(values) => Some(Kind::Int32ArrayValue(proto::Int32Array { values })),
        Value::Float32Array(values) => Some(Kind::Float32ArrayValue(proto::Float32Array { values })),
        Value::StringArray(values) => Some(Kind::StringArrayValue(proto::StringArray { values })),
    };
    proto::Value { kind }
}

pub fn value_from_proto(value: proto::Value) -> Value {
    use proto::value::Kind;
    match value.kind {
        None => Value::Empty,
        Some(Kind::Int32Value(v)) => Value::Int32(v),
        Some(Kind::Float32Value(v)) => Value::Float32(v),
        Some(Kind::StringValue(v)) => Value::String(v),
        Some(Kind::BoolValue(v)) => Value::Bool(v),
        Some(Kind::Int32ArrayValue(a)) => Value::Int32Array(a.values),
        Some(Kind::Float32ArrayValue(a)) => Value::Float32Array(a.values),
        Some(Kind::StringArrayValue(a)) => Value::StringArray(a.values),
    }
}

pub fn param_kind_to_proto(kind: ParamKind) -> i32 {
    match kind {
        ParamKind::Scalar => proto::ParamKind::Scalar as i32,
        ParamKind::Array => proto::ParamKind::Array as i32,
        ParamKind::Command => proto::ParamKind::Command as i32,
    }
}

pub fn detail_level_from_proto(level: i32) -> DetailLevel {
    match proto::DetailLevel::try_from(level).unwrap_or(proto::DetailLevel::Unspecified) {
        proto::DetailLevel::Full => DetailLevel::Full,
        proto::DetailLevel::Minimal => DetailLevel::Minimal,
        proto::DetailLevel::Subscriptions => DetailLevel::Subscriptions,
        proto::DetailLevel::Commands => DetailLevel::Commands,
        proto::DetailLevel::None => DetailLevel::None,
        proto::DetailLevel::Unspecified => DetailLevel::Unset,
    }
}

pub fn language_pack_from_proto(pack: proto::LanguagePack) -> LanguagePack {
    LanguagePack { language_id: pack.language_id, words: pack.words }
}

pub fn language_pack_to_proto(pack: LanguagePack) -> proto::LanguagePack {
    proto::LanguagePack { language_id: pack.language_id, words: pack.words }
}

pub fn param_entry_to_proto(entry: ParamEntry) -> proto::Param {
    proto::Param {
        oid: entry.oid,
        value: Some(value_to_proto(entry.value)),
        kind: proto::ParamKind::Unspecified as i32,
        oid_aliases: Vec::new(),
        name: None,
    }
}

pub fn param_entry_to_device_component(entry: ParamEntry) -> proto::DeviceComponent {
    proto::DeviceComponent { component: Some(proto::device_component::Component::Param(param_entry_to_proto(entry))) }
}

/// The full GetParam response — unlike [`param_entry_to_proto`], also
/// carries the descriptor metadata (§4.8) GetValue's callers never see.
pub fn param_detail_to_proto(detail: ParamDetail) -> proto::Param {
    proto::Param {
        oid: detail.oid,
        value: Some(value_to_proto(detail.value)),
        kind: param_kind_to_proto(detail.kind),
        oid_aliases: detail.oid_aliases,
        name: Some(proto::ParamName { display_strings: detail.display_strings }),
    }
}

pub fn param_info_entry_to_proto(entry: ParamInfoEntry) -> proto::ParamInfoResponse {
    proto::ParamInfoResponse {
        info: Some(proto::ParamInfo {
            oid: entry.oid,
            kind: param_kind_to_proto(entry.kind),
            array_length: entry.array_length.map(|n| n as u32),
        }),
    }
}

pub fn command_response_to_proto(response: CommandResponse) -> proto::CommandResponse {
    use proto::command_response::Kind;
    let kind = match response {
        CommandResponse::Response(value) => Kind::Response(value_to_proto(value)),
        CommandResponse::NoResponse => Kind::NoResponse(proto::Empty {}),
    };
    proto::CommandResponse { kind: Some(kind) }
}

pub fn push_update_to_proto(update: PushUpdate) -> proto::PushUpdates {
    use proto::push_updates::Kind;
    let kind = match update {
        PushUpdate::SlotsAdded(slots) => Kind::SlotsAdded(proto::SlotList { slots }),
        PushUpdate::ValueChanged { slot, oid, value } => {
            Kind::Value(proto::SlotValue { slot, oid, value: Some(value_to_proto(value)) })
        }
        PushUpdate::LanguagePackChanged { slot, pack } => {
            Kind::LanguagePack(proto::SlotLanguagePack { slot, language_pack: Some(language_pack_to_proto(pack.pack)) })
        }
    };
    proto::PushUpdates { kind: Some(kind) }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
