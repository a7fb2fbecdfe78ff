// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Narrow trait interfaces onto the external device/parameter data model.
//!
//! The concrete `Device`/`Param` implementation, the JSON/protobuf wire
//! codec, and the cryptographic JWS verification are all out of scope for
//! this crate — these traits are the seam. See `catena_core::testing` for
//! an in-memory implementation used by the test suite.

use async_trait::async_trait;
use std::sync::Arc;

use crate::authz::{Authorizable, Authorizer};
use crate::status::CatenaResult;

/// A small non-negative integer naming one device inside a process.
pub type Slot = u32;

/// Client-selected filter on what device components a Connect stream emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    Full,
    Minimal,
    Subscriptions,
    Commands,
    None,
    Unset,
}

/// Scalar/array/command classification of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Scalar,
    Array,
    Command,
}

/// A wire-adjacent value. The transport crate maps this to/from the
/// protobuf `Value` oneof; the core never depends on the wire codec.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Int32(i32),
    Float32(f32),
    String(String),
    Bool(bool),
    Int32Array(Vec<i32>),
    Float32Array(Vec<f32>),
    StringArray(Vec<String>),
}

/// A language pack: a language id plus word/phrase translations.
#[derive(Debug, Clone)]
pub struct LanguagePack {
    pub language_id: String,
    pub words: std::collections::HashMap<String, String>,
}

/// Emitted by a device when a value changes, either client- or
/// server-initiated; the Connect dispatcher (`connect`) fans these out.
#[derive(Debug, Clone)]
pub struct ValueChangeEvent {
    pub oid: String,
    pub value: Value,
}

/// Emitted by a device when a language pack is added.
#[derive(Debug, Clone)]
pub struct LanguagePackEvent {
    pub pack: LanguagePack,
}

/// A parameter descriptor: the static, shared-between-instances shape of a
/// parameter (its sub-parameter names, command/minimal-set flags).
pub trait ParamDescriptor: Send + Sync + std::fmt::Debug {
    fn minimal_set(&self) -> bool;
    fn is_command(&self) -> bool;
    /// Names of this descriptor's sub-parameters, in declaration order.
    fn sub_param_names(&self) -> Vec<String>;
    fn scope(&self) -> Option<&str>;
    fn read_only(&self) -> bool;
    /// Alternate OIDs this parameter is also addressable by. Empty for most
    /// parameters; GetParam reports these alongside the canonical OID.
    fn oid_aliases(&self) -> Vec<String>;
    /// Per-language display name, keyed by language id (e.g. `"en"`).
    fn display_strings(&self) -> std::collections::HashMap<String, String>;
}

impl Authorizable for dyn ParamDescriptor {
    fn scope(&self) -> Option<&str> {
        ParamDescriptor::scope(self)
    }

    fn read_only(&self) -> bool {
        ParamDescriptor::read_only(self)
    }
}

/// A single parameter instance inside a device's tree.
pub trait Param: Send + Sync + std::fmt::Debug {
    fn oid(&self) -> &str;
    fn kind(&self) -> ParamKind;
    fn scope(&self) -> Option<&str>;
    fn read_only(&self) -> bool;
    fn descriptor(&self) -> Arc<dyn ParamDescriptor>;
    /// `Some(len)` for array parameters, `None` otherwise.
    fn array_len(&self) -> Option<usize>;

    /// Converts this parameter's current value to the wire-adjacent form,
    /// gated by `authz`. `PERMISSION_DENIED` if `authz` fails `readAuthz`.
    fn to_value(&self, authz: &Authorizer) -> CatenaResult<Value>;
}

impl Authorizable for dyn Param {
    fn scope(&self) -> Option<&str> {
        Param::scope(self)
    }

    fn read_only(&self) -> bool {
        Param::read_only(self)
    }
}

/// The external device collaborator: parameter lookup, value get/set,
/// language packs, and the three signal sources the Connect dispatcher
/// (`connect`) subscribes to.
#[async_trait]
pub trait Device: Send + Sync {
    fn detail_level(&self) -> DetailLevel;
    fn default_scope(&self) -> &str;
    fn max_subscriptions(&self) -> usize;
    fn subscriptions_supported(&self) -> bool;

    /// Looks up a parameter by its fully-qualified OID.
    /// `NOT_FOUND` ("Oid does not exist") if absent.
    fn get_param(&self, oid: &str) -> CatenaResult<Arc<dyn Param>>;

    /// Top-level (root) parameters, in declaration order.
    fn top_level_params(&self) -> Vec<Arc<dyn Param>>;

    /// Looks up a command parameter by OID. `NOT_FOUND` if absent or not a command.
    fn get_command(&self, oid: &str) -> CatenaResult<Arc<dyn Param>>;

    /// Invokes a command parameter, returning the single result value a
    /// non-streaming command body produces.
    async fn execute_command(&self, oid: &str, value: Value, authz: &Authorizer) -> CatenaResult<Value>;

    async fn get_value(&self, oid: &str, authz: &Authorizer) -> CatenaResult<Value>;

    /// Phase one of a multi-set: validates every `(oid, value)` under
    /// `authz` (authorization, range, constraints) without committing.
    async fn try_multi_set_value(
        &self,
        values: &[(String, Value)],
        authz: &Authorizer,
    ) -> CatenaResult<()>;

    /// Phase two: applies a previously-validated multi-set atomically and
    /// emits `valueSetByClient` for each changed OID on success.
    async fn commit_multi_set_value(&self, values: &[(String, Value)]) -> CatenaResult<()>;

    fn languages(&self) -> Vec<String>;

    /// Adds a language pack, emitting `languageAddedPushUpdate` on success.
    async fn add_language(
        &self,
        language_id: &str,
        pack: LanguagePack,
        authz: &Authorizer,
    ) -> CatenaResult<()>;

    fn subscribe_value_set_by_client(&self) -> tokio::sync::broadcast::Receiver<ValueChangeEvent>;
    fn subscribe_value_set_by_server(&self) -> tokio::sync::broadcast::Receiver<ValueChangeEvent>;
    fn subscribe_language_added(&self) -> tokio::sync::broadcast::Receiver<LanguagePackEvent>;
}

/// Maps slots to device handles. Owned by the transport/server layer;
/// handlers reach it only through this narrow interface.
pub trait DeviceRegistry: Send + Sync {
    fn get(&self, slot: Slot) -> Option<Arc<dyn Device>>;
    /// Populated slots, ascending.
    fn populated_slots(&self) -> Vec<Slot>;
}
