// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Device`/`Param` used by this crate's own test suite.
//!
//! Mirrors the shape of the original SDK's `MockDevice`/`MockParam`/
//! `MockParamDescriptor` test doubles: a plain data structure, no mocking
//! framework, built up through a small builder.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::authz::Authorizer;
use crate::device::{
    DetailLevel, Device, DeviceRegistry, LanguagePack, LanguagePackEvent, Param, ParamDescriptor,
    ParamKind, Slot, Value, ValueChangeEvent,
};
use crate::status::{CatenaError, CatenaResult, StatusCode};

#[derive(Debug)]
pub struct MockDescriptor {
    pub minimal_set: bool,
    pub is_command: bool,
    pub sub_params: Vec<String>,
    pub scope: Option<String>,
    pub read_only: bool,
    pub oid_aliases: Vec<String>,
    pub display_strings: HashMap<String, String>,
}

impl Default for MockDescriptor {
    fn default() -> Self {
        Self {
            minimal_set: false,
            is_command: false,
            sub_params: Vec::new(),
            scope: None,
            read_only: false,
            oid_aliases: Vec::new(),
            display_strings: HashMap::new(),
        }
    }
}

impl ParamDescriptor for MockDescriptor {
    fn minimal_set(&self) -> bool {
        self.minimal_set
    }

    fn is_command(&self) -> bool {
        self.is_command
    }

    fn sub_param_names(&self) -> Vec<String> {
        self.sub_params.clone()
    }

    fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn oid_aliases(&self) -> Vec<String> {
        self.oid_aliases.clone()
    }

    fn display_strings(&self) -> HashMap<String, String> {
        self.display_strings.clone()
    }
}

#[derive(Debug)]
pub struct MockParam {
    pub oid: String,
    pub kind: ParamKind,
    pub scope: Option<String>,
    pub read_only: bool,
    pub descriptor: Arc<MockDescriptor>,
    pub array_len: Option<usize>,
    pub value: RwLock<Value>,
}

impl Param for MockParam {
    fn oid(&self) -> &str {
        &self.oid
    }

    fn kind(&self) -> ParamKind {
        self.kind
    }

    fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    fn read_only(&self) -> bool {
        self.read_only
    }

    fn descriptor(&self) -> Arc<dyn ParamDescriptor> {
        self.descriptor.clone()
    }

    fn array_len(&self) -> Option<usize> {
        self.array_len
    }

    fn to_value(&self, authz: &Authorizer) -> CatenaResult<Value> {
        if !authz.read_authz(self, "st2138:mon") {
            return Err(CatenaError::new(StatusCode::PermissionDenied, "not authorized to read"));
        }
        Ok(self.value.read().clone())
    }
}

/// A single in-memory device, addressable by OID, with the three broadcast
/// channels handlers and the Connect dispatcher subscribe to.
pub struct MockDevice {
    params: HashMap<String, Arc<MockParam>>,
    top_level: Vec<String>,
    commands: HashMap<String, Arc<MockParam>>,
    pub detail_level: DetailLevel,
    pub default_scope: String,
    pub max_subscriptions: usize,
    pub subscriptions_supported: bool,
    languages: RwLock<Vec<String>>,
    value_set_by_client: broadcast::Sender<ValueChangeEvent>,
    value_set_by_server: broadcast::Sender<ValueChangeEvent>,
    language_added: broadcast::Sender<LanguagePackEvent>,
}

impl std::fmt::Debug for MockDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDevice").field("top_level", &self.top_level).finish()
    }
}

/// Builds a [`MockDevice`] by adding params one at a time, OID-first so
/// parent descriptors can name children before they exist.
pub struct DeviceBuilder {
    params: HashMap<String, Arc<MockParam>>,
    top_level: Vec<String>,
    commands: HashMap<String, Arc<MockParam>>,
    detail_level: DetailLevel,
    default_scope: String,
    max_subscriptions: usize,
    subscriptions_supported: bool,
}

impl Default for DeviceBuilder {
    fn default() -> Self {
        Self {
            params: HashMap::new(),
            top_level: Vec::new(),
            commands: HashMap::new(),
            detail_level: DetailLevel::Full,
            default_scope: "st2138:mon".to_owned(),
            max_subscriptions: 64,
            subscriptions_supported: true,
        }
    }
}

impl DeviceBuilder {
    pub fn detail_level(mut self, dl: DetailLevel) -> Self {
        self.detail_level = dl;
        self
    }

    pub fn default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = scope.into();
        self
    }

    pub fn max_subscriptions(mut self, n: usize) -> Self {
        self.max_subscriptions = n;
        self
    }

    pub fn subscriptions_supported(mut self, v: bool) -> Self {
        self.subscriptions_supported = v;
        self
    }

    /// Adds a scalar or array parameter at `oid`, wiring it into its
    /// parent's `sub_params` list if the parent already exists.
    pub fn param(
        mut self,
        oid: &str,
        kind: ParamKind,
        value: Value,
        array_len: Option<usize>,
    ) -> Self {
        let descriptor = Arc::new(MockDescriptor {
            is_command: kind == ParamKind::Command,
            scope: Some(self.default_scope.clone()),
            ..Default::default()
        });
        let param = Arc::new(MockParam {
            oid: oid.to_owned(),
            kind,
            scope: Some(self.default_scope.clone()),
            read_only: false,
            descriptor,
            array_len,
            value: RwLock::new(value),
        });
        self.link_child(oid);
        self.params.insert(oid.to_owned(), param);
        self
    }

    /// Adds a command parameter at `oid`. `execute_command` on the built
    /// device echoes back whatever value it's invoked with.
    pub fn command(mut self, oid: &str) -> Self {
        let descriptor = Arc::new(MockDescriptor {
            is_command: true,
            scope: Some(self.default_scope.clone()),
            ..Default::default()
        });
        let param = Arc::new(MockParam {
            oid: oid.to_owned(),
            kind: ParamKind::Command,
            scope: Some(self.default_scope.clone()),
            read_only: false,
            descriptor,
            array_len: None,
            value: RwLock::new(Value::Empty),
        });
        self.link_child(oid);
        self.commands.insert(oid.to_owned(), param.clone());
        self.params.insert(oid.to_owned(), param);
        self
    }

    /// Sets `oid_aliases`/`display_strings` on an already-added param's
    /// descriptor, relinking it the same way `link_child` relinks a parent
    /// whose `sub_params` grows — descriptors are rebuilt, not mutated in
    /// place, so every existing `Arc<MockParam>` clone keeps seeing the
    /// state as of when it was cloned.
    pub fn describe(
        mut self,
        oid: &str,
        oid_aliases: Vec<String>,
        display_strings: HashMap<String, String>,
    ) -> Self {
        if let Some(p) = self.params.get(oid) {
            let mut descriptor = (*p.descriptor).clone_shallow();
            descriptor.oid_aliases = oid_aliases;
            descriptor.display_strings = display_strings;
            let relinked = Arc::new(MockParam {
                oid: p.oid.clone(),
                kind: p.kind,
                scope: p.scope.clone(),
                read_only: p.read_only,
                descriptor: Arc::new(descriptor),
                array_len: p.array_len,
                value: RwLock::new(p.value.read().clone()),
            });
            if self.commands.contains_key(oid) {
                self.commands.insert(oid.to_owned(), relinked.clone());
            }
            self.params.insert(oid.to_owned(), relinked);
        }
        self
    }

    fn link_child(&mut self, oid: &str) {
        match oid.rfind('/') {
            Some(0) => self.top_level.push(oid.trim_start_matches('/').to_owned()),
            Some(idx) => {
                let parent = &oid[..idx];
                let name = &oid[idx + 1..];
                // Array elements are reached through `array_len`, not
                // `sub_param_names` — don't double-link them.
                if name.chars().all(|c| c.is_ascii_digit()) {
                    return;
                }
                if let Some(p) = self.params.get(parent) {
                    let mut descriptor = (*p.descriptor).clone_shallow();
                    descriptor.sub_params.push(name.to_owned());
                    let relinked = Arc::new(MockParam {
                        oid: p.oid.clone(),
                        kind: p.kind,
                        scope: p.scope.clone(),
                        read_only: p.read_only,
                        descriptor: Arc::new(descriptor),
                        array_len: p.array_len,
                        value: RwLock::new(p.value.read().clone()),
                    });
                    self.params.insert(parent.to_owned(), relinked);
                } else {
                    self.top_level.push(oid.trim_start_matches('/').to_owned());
                }
            }
            None => self.top_level.push(oid.to_owned()),
        }
    }

    pub fn build(self) -> MockDevice {
        let (value_set_by_client, _) = broadcast::channel(64);
        let (value_set_by_server, _) = broadcast::channel(64);
        let (language_added, _) = broadcast::channel(16);
        MockDevice {
            params: self.params,
            top_level: self.top_level,
            commands: self.commands,
            detail_level: self.detail_level,
            default_scope: self.default_scope,
            max_subscriptions: self.max_subscriptions,
            subscriptions_supported: self.subscriptions_supported,
            languages: RwLock::new(Vec::new()),
            value_set_by_client,
            value_set_by_server,
            language_added,
        }
    }
}

impl MockDescriptor {
    fn clone_shallow(&self) -> Self {
        Self {
            minimal_set: self.minimal_set,
            is_command: self.is_command,
            sub_params: self.sub_params.clone(),
            scope: self.scope.clone(),
            read_only: self.read_only,
            oid_aliases: self.oid_aliases.clone(),
            display_strings: self.display_strings.clone(),
        }
    }
}

#[async_trait]
impl Device for MockDevice {
    fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    fn default_scope(&self) -> &str {
        &self.default_scope
    }

    fn max_subscriptions(&self) -> usize {
        self.max_subscriptions
    }

    fn subscriptions_supported(&self) -> bool {
        self.subscriptions_supported
    }

    fn get_param(&self, oid: &str) -> CatenaResult<Arc<dyn Param>> {
        self.params
            .get(oid)
            .map(|p| p.clone() as Arc<dyn Param>)
            .ok_or_else(|| CatenaError::new(StatusCode::NotFound, "Oid does not exist"))
    }

    fn top_level_params(&self) -> Vec<Arc<dyn Param>> {
        self.top_level
            .iter()
            .filter_map(|name| self.params.get(&format!("/{name}")))
            .map(|p| p.clone() as Arc<dyn Param>)
            .collect()
    }

    fn get_command(&self, oid: &str) -> CatenaResult<Arc<dyn Param>> {
        self.commands
            .get(oid)
            .map(|p| p.clone() as Arc<dyn Param>)
            .ok_or_else(|| CatenaError::new(StatusCode::NotFound, "Oid does not exist"))
    }

    async fn get_value(&self, oid: &str, authz: &Authorizer) -> CatenaResult<Value> {
        let param = self.get_param(oid)?;
        param.to_value(authz)
    }

    async fn execute_command(&self, oid: &str, value: Value, authz: &Authorizer) -> CatenaResult<Value> {
        let command = self.get_command(oid)?;
        if !authz.read_authz(command.as_ref(), &self.default_scope) {
            return Err(CatenaError::new(StatusCode::PermissionDenied, "not authorized to execute command"));
        }
        Ok(value)
    }

    async fn try_multi_set_value(
        &self,
        values: &[(String, Value)],
        authz: &Authorizer,
    ) -> CatenaResult<()> {
        for (oid, _) in values {
            let param = self.get_param(oid)?;
            if !authz.write_authz(&*param, &self.default_scope) {
                return Err(CatenaError::new(
                    StatusCode::PermissionDenied,
                    format!("not authorized to write {oid}"),
                ));
            }
        }
        Ok(())
    }

    async fn commit_multi_set_value(&self, values: &[(String, Value)]) -> CatenaResult<()> {
        for (oid, value) in values {
            let mock = self
                .params
                .get(oid)
                .ok_or_else(|| CatenaError::new(StatusCode::NotFound, "Oid does not exist"))?;
            *mock.value.write() = value.clone();
            let _ = self
                .value_set_by_client
                .send(ValueChangeEvent { oid: oid.clone(), value: value.clone() });
        }
        Ok(())
    }

    fn languages(&self) -> Vec<String> {
        self.languages.read().clone()
    }

    async fn add_language(
        &self,
        language_id: &str,
        pack: LanguagePack,
        authz: &Authorizer,
    ) -> CatenaResult<()> {
        if !authz.write_authz_scope("st2138:adm") {
            return Err(CatenaError::new(StatusCode::PermissionDenied, "admin scope required"));
        }
        self.languages.write().push(language_id.to_owned());
        let _ = self.language_added.send(LanguagePackEvent { pack });
        Ok(())
    }

    fn subscribe_value_set_by_client(&self) -> broadcast::Receiver<ValueChangeEvent> {
        self.value_set_by_client.subscribe()
    }

    fn subscribe_value_set_by_server(&self) -> broadcast::Receiver<ValueChangeEvent> {
        self.value_set_by_server.subscribe()
    }

    fn subscribe_language_added(&self) -> broadcast::Receiver<LanguagePackEvent> {
        self.language_added.subscribe()
    }
}

/// A fixed slot map wrapping a single [`MockDevice`], for handler tests that
/// need a `dyn DeviceRegistry`.
pub struct MockRegistry {
    devices: HashMap<Slot, Arc<dyn Device>>,
}

impl MockRegistry {
    pub fn single(slot: Slot, device: MockDevice) -> Self {
        Self::from_devices(vec![(slot, device)])
    }

    /// Builds a registry over several devices at once, for servers wiring up
    /// more than one slot (a single `MockDevice` can't be shared across
    /// slots, so each slot gets its own).
    pub fn from_devices(devices: Vec<(Slot, MockDevice)>) -> Self {
        let devices = devices.into_iter().map(|(slot, dev)| (slot, Arc::new(dev) as Arc<dyn Device>)).collect();
        Self { devices }
    }
}

impl DeviceRegistry for MockRegistry {
    fn get(&self, slot: Slot) -> Option<Arc<dyn Device>> {
        self.devices.get(&slot).cloned()
    }

    fn populated_slots(&self) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self.devices.keys().copied().collect();
        slots.sort_unstable();
        slots
    }
}

/// Builds the tree used by the wildcard-subsumption scenario:
/// `/test/{param1, basic/{param2, deeper/{param3}}, array[0..1]/{subparam}}`.
pub fn wildcard_fixture_device() -> MockDevice {
    DeviceBuilder::default()
        .param("/test", ParamKind::Scalar, Value::Empty, None)
        .param("/test/param1", ParamKind::Scalar, Value::String("a".into()), None)
        .param("/test/basic", ParamKind::Scalar, Value::Empty, None)
        .param("/test/basic/param2", ParamKind::Scalar, Value::String("b".into()), None)
        .param("/test/basic/deeper", ParamKind::Scalar, Value::Empty, None)
        .param("/test/basic/deeper/param3", ParamKind::Scalar, Value::String("c".into()), None)
        .param("/test/array", ParamKind::Array, Value::Empty, Some(2))
        .param("/test/array/0", ParamKind::Scalar, Value::Empty, None)
        .param("/test/array/0/subparam", ParamKind::Scalar, Value::String("d".into()), None)
        .param("/test/array/1", ParamKind::Scalar, Value::Empty, None)
        .param("/test/array/1/subparam", ParamKind::Scalar, Value::String("e".into()), None)
        .build()
}

#[cfg(test)]
#[path = "testing_tests.rs"]
mod tests;
