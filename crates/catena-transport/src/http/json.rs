// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON wire DTOs for the REST/SSE binding, generalizing the teacher's
//! `transport/http` handler payload structs. `catena_core`'s plain types
//! don't derive `Serialize`/`Deserialize` themselves (the core stays
//! wire-agnostic), so this module is the JSON half of what `grpc::convert`
//! is for protobuf.

use std::collections::HashMap;

use catena_core::connect::PushUpdate;
use catena_core::device::{DetailLevel, LanguagePack, ParamKind, Value};
use catena_core::rpc::handlers::{CommandResponse, ParamDetail, ParamEntry, ParamInfoEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonValue {
    Empty,
    Int32 { value: i32 },
    Float32 { value: f32 },
    String { value: String },
    Bool { value: bool },
    Int32Array { values: Vec<i32> },
    Float32Array { values: Vec<f32> },
    StringArray { values: Vec<String> },
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Empty => JsonValue::Empty,
            Value::Int32(v) => JsonValue::Int32 { value: v },
            Value::Float32(v) => JsonValue::Float32 { value: v },
            Value::String(v) => JsonValue::String { value: v },
            Value::Bool(v) => JsonValue::Bool { value: v },
            Value::Int32Array(values) => JsonValue::Int32Array { values },
            Value::Float32Array(values) => JsonValue::Float32Array { values },
            Value::StringArray(values) => JsonValue::StringArray { values },
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Empty => Value::Empty,
            JsonValue::Int32 { value } => Value::Int32(value),
            JsonValue::Float32 { value } => Value::Float32(value),
            JsonValue::String { value } => Value::String(value),
            JsonValue::Bool { value } => Value::Bool(value),
            JsonValue::Int32Array { values } => Value::Int32Array(values),
            JsonValue::Float32Array { values } => Value::Float32Array(values),
            JsonValue::StringArray { values } => Value::StringArray(values),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonParam {
    pub oid: String,
    pub value: JsonValue,
}

impl From<ParamEntry> for JsonParam {
    fn from(entry: ParamEntry) -> Self {
        Self { oid: entry.oid, value: entry.value.into() }
    }
}

/// GetParam's response body: `JsonParam` plus the descriptor metadata (§4.8)
/// GetValue's callers never see.
#[derive(Debug, Clone, Serialize)]
pub struct JsonParamDetail {
    pub oid: String,
    pub value: JsonValue,
    pub kind: JsonParamKind,
    pub oid_aliases: Vec<String>,
    pub display_strings: HashMap<String, String>,
}

impl From<ParamDetail> for JsonParamDetail {
    fn from(detail: ParamDetail) -> Self {
        Self {
            oid: detail.oid,
            value: detail.value.into(),
            kind: detail.kind.into(),
            oid_aliases: detail.oid_aliases,
            display_strings: detail.display_strings,
        }
    }
}

/// Input side of a `MultiSetValue` request body: same shape as
/// [`JsonParam`], but `Deserialize`-only since it never appears in a
/// response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonSetEntry {
    pub oid: String,
    pub value: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonParamKind {
    Scalar,
    Array,
    Command,
}

impl From<ParamKind> for JsonParamKind {
    fn from(kind: ParamKind) -> Self {
        match kind {
            ParamKind::Scalar => JsonParamKind::Scalar,
            ParamKind::Array => JsonParamKind::Array,
            ParamKind::Command => JsonParamKind::Command,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonParamInfo {
    pub oid: String,
    pub kind: JsonParamKind,
    pub array_length: Option<usize>,
}

impl From<ParamInfoEntry> for JsonParamInfo {
    fn from(entry: ParamInfoEntry) -> Self {
        Self { oid: entry.oid, kind: entry.kind.into(), array_length: entry.array_length }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonCommandResponse {
    Response { value: JsonValue },
    NoResponse,
}

impl From<CommandResponse> for JsonCommandResponse {
    fn from(response: CommandResponse) -> Self {
        match response {
            CommandResponse::Response(value) => JsonCommandResponse::Response { value: value.into() },
            CommandResponse::NoResponse => JsonCommandResponse::NoResponse,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonLanguagePack {
    pub language_id: String,
    pub words: HashMap<String, String>,
}

impl From<LanguagePack> for JsonLanguagePack {
    fn from(pack: LanguagePack) -> Self {
        Self { language_id: pack.language_id, words: pack.words }
    }
}

impl From<JsonLanguagePack> for LanguagePack {
    fn from(pack: JsonLanguagePack) -> Self {
        Self { language_id: pack.language_id, words: pack.words }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonDetailLevel {
    Full,
    Minimal,
    Subscriptions,
    Commands,
    None,
}

impl From<JsonDetailLevel> for DetailLevel {
    fn from(level: JsonDetailLevel) -> Self {
        match level {
            JsonDetailLevel::Full => DetailLevel::Full,
            JsonDetailLevel::Minimal => DetailLevel::Minimal,
            JsonDetailLevel::Subscriptions => DetailLevel::Subscriptions,
            JsonDetailLevel::Commands => DetailLevel::Commands,
            JsonDetailLevel::None => DetailLevel::None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonPushUpdate {
    SlotsAdded { slots: Vec<u32> },
    Value { slot: u32, oid: String, value: JsonValue },
    LanguagePack { slot: u32, language_pack: JsonLanguagePack },
}

impl From<PushUpdate> for JsonPushUpdate {
    fn from(update: PushUpdate) -> Self {
        match update {
            PushUpdate::SlotsAdded(slots) => JsonPushUpdate::SlotsAdded { slots },
            PushUpdate::ValueChanged { slot, oid, value } => {
                JsonPushUpdate::Value { slot, oid, value: value.into() }
            }
            PushUpdate::LanguagePackChanged { slot, pack } => {
                JsonPushUpdate::LanguagePack { slot, language_pack: pack.pack.into() }
            }
        }
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
