// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C8: the concrete handlers from §4.8, each built on `template::dispatch_*`
//! and the device/subscription/visitor primitives.

use std::collections::HashMap;
use std::sync::Arc;

use crate::authz::Authorizer;
use crate::connect::should_emit_value;
use crate::device::{Device, DeviceRegistry, ParamKind, Slot, Value};
use crate::rpc::template::{dispatch_streaming, dispatch_unary};
use crate::status::{CatenaError, CatenaResult, StatusCode};
use crate::subscription::SubscriptionManager;
use crate::visitor::{traverse_params, ParamVisitor};

#[derive(Debug, Clone, PartialEq)]
pub struct ParamEntry {
    pub oid: String,
    pub value: Value,
}

/// GetParam's response: the same value `GetValue` returns, plus the
/// descriptor-level metadata (§4.8) that distinguishes the two RPCs — kind,
/// alternate OIDs, and per-language display name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDetail {
    pub oid: String,
    pub value: Value,
    pub kind: ParamKind,
    pub oid_aliases: Vec<String>,
    pub display_strings: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfoEntry {
    pub oid: String,
    pub kind: ParamKind,
    pub array_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    Response(Value),
    NoResponse,
}

/// **GetPopulatedSlots** — the populated slots, ascending.
pub fn get_populated_slots(registry: &dyn DeviceRegistry) -> Vec<Slot> {
    registry.populated_slots()
}

/// **GetValue**.
pub async fn get_value(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    oid: &str,
) -> CatenaResult<Value> {
    dispatch_unary(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        dev.get_value(oid, &authz).await
    })
    .await
}

/// **GetParam** — `GetValue` plus the descriptor metadata a client needs to
/// render or further address the parameter (kind, aliases, display name).
pub async fn get_param(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    oid: &str,
) -> CatenaResult<ParamDetail> {
    dispatch_unary(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        let param = dev.get_param(oid)?;
        let value = param.to_value(&authz)?;
        let descriptor = param.descriptor();
        Ok(ParamDetail {
            oid: oid.to_owned(),
            value,
            kind: param.kind(),
            oid_aliases: descriptor.oid_aliases(),
            display_strings: descriptor.display_strings(),
        })
    })
    .await
}

/// **SetValue** — wraps as a single-element multi-set and delegates.
pub async fn set_value(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    oid: &str,
    value: Value,
) -> CatenaResult<()> {
    multi_set_value(bearer_header, authz_enabled, registry, slot, vec![(oid.to_owned(), value)]).await
}

/// **MultiSetValue** — two-phase validate-then-commit.
pub async fn multi_set_value(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    values: Vec<(String, Value)>,
) -> CatenaResult<()> {
    dispatch_unary(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        dev.try_multi_set_value(&values, &authz).await?;
        dev.commit_multi_set_value(&values).await
    })
    .await
}

/// **DeviceRequest** — the full device-component stream, gated by detail
/// level exactly like Connect's push-update filter (§4.6.1 applies here
/// too, not just to change events).
pub async fn device_request(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    detail_level: crate::device::DetailLevel,
    subscribed_oids: Vec<String>,
    subs: Option<&SubscriptionManager>,
) -> CatenaResult<Vec<ParamEntry>> {
    dispatch_streaming(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        if detail_level == crate::device::DetailLevel::Subscriptions {
            if let Some(subs) = subs {
                for oid in &subscribed_oids {
                    subs.add_subscription(oid, dev.as_ref(), &authz)?;
                }
            }
        }

        let mut out = Vec::new();
        for top in dev.top_level_params() {
            collect_filtered(&top, top.oid(), dev.as_ref(), detail_level, subs, &authz, &mut out);
        }
        Ok(out)
    })
    .await
}

fn collect_filtered(
    param: &Arc<dyn crate::device::Param>,
    path: &str,
    dev: &dyn Device,
    detail_level: crate::device::DetailLevel,
    subs: Option<&SubscriptionManager>,
    authz: &Authorizer,
    out: &mut Vec<ParamEntry>,
) {
    if !authz.read_authz(param.as_ref(), dev.default_scope()) {
        return;
    }
    let descriptor = param.descriptor();
    if should_emit_value(detail_level, dev, path, descriptor.minimal_set(), descriptor.is_command(), subs, authz)
    {
        if let Ok(value) = param.to_value(authz) {
            out.push(ParamEntry { oid: path.to_owned(), value });
        }
    }

    if let Some(size) = param.array_len() {
        for i in 0..size {
            let child_path = format!("{path}/{i}");
            if let Ok(child) = dev.get_param(&child_path) {
                collect_filtered(&child, &child_path, dev, detail_level, subs, authz, out);
            }
        }
    }
    for name in descriptor.sub_param_names() {
        let child_path = format!("{path}/{name}");
        if let Ok(child) = dev.get_param(&child_path) {
            collect_filtered(&child, &child_path, dev, detail_level, subs, authz, out);
        }
    }
}

/// **ExecuteCommand**. Gated by `writeAuthz` on the command parameter:
/// invoking one is a side-effecting action, not a read.
pub async fn execute_command(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    oid: &str,
    value: Value,
    respond: bool,
) -> CatenaResult<Vec<CommandResponse>> {
    dispatch_streaming(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        let command = dev.get_command(oid)?;
        if !authz.write_authz(command.as_ref(), dev.default_scope()) {
            return Err(CatenaError::new(StatusCode::PermissionDenied, "not authorized to execute command"));
        }
        let result = dev.execute_command(oid, value, &authz).await?;
        Ok(if respond { vec![CommandResponse::Response(result)] } else { vec![CommandResponse::NoResponse] })
    })
    .await
}

/// **AddLanguage** — write restricted by scope (admin), enforced inside
/// `Device::add_language`.
pub async fn add_language(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    language_id: &str,
    pack: crate::device::LanguagePack,
) -> CatenaResult<()> {
    dispatch_unary(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        dev.add_language(language_id, pack, &authz).await
    })
    .await
}

/// **ListLanguages**.
pub async fn list_languages(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
) -> CatenaResult<Vec<String>> {
    dispatch_unary(bearer_header, authz_enabled, registry, slot, |dev, _authz| async move {
        Ok(dev.languages())
    })
    .await
}

fn param_info_entry(oid: &str, param: &Arc<dyn crate::device::Param>) -> ParamInfoEntry {
    ParamInfoEntry { oid: oid.to_owned(), kind: param.kind(), array_length: param.array_len() }
}

struct CollectParamInfo {
    out: Vec<ParamInfoEntry>,
}

impl ParamVisitor for CollectParamInfo {
    fn visit(&mut self, param: &Arc<dyn crate::device::Param>, path: &str) {
        self.out.push(param_info_entry(path, param));
    }
}

/// **ParamInfoRequest** — three modes per §4.8: top-level enumeration,
/// full-tree walk, or a single resolved parameter (optionally recursive).
pub async fn param_info_request(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    oid_prefix: Option<&str>,
    recursive: bool,
) -> CatenaResult<Vec<ParamInfoEntry>> {
    dispatch_streaming(bearer_header, authz_enabled, registry, slot, move |dev, _authz| async move {
        match oid_prefix {
            None => {
                let top = dev.top_level_params();
                if top.is_empty() {
                    return Err(CatenaError::new(
                        StatusCode::NotFound,
                        "No top-level parameters found",
                    ));
                }
                let mut out = Vec::new();
                for param in &top {
                    out.push(param_info_entry(param.oid(), param));
                    if recursive {
                        let mut visitor = CollectParamInfo { out: Vec::new() };
                        for name in param.descriptor().sub_param_names() {
                            let child_path = format!("{}/{name}", param.oid());
                            if let Ok(child) = dev.get_param(&child_path) {
                                traverse_params(&child, &child_path, dev.as_ref(), &mut visitor);
                            }
                        }
                        if let Some(size) = param.array_len() {
                            for i in 0..size {
                                let child_path = format!("{}/{i}", param.oid());
                                if let Ok(child) = dev.get_param(&child_path) {
                                    traverse_params(&child, &child_path, dev.as_ref(), &mut visitor);
                                }
                            }
                        }
                        out.extend(visitor.out);
                    }
                }
                Ok(out)
            }
            Some(prefix) => {
                let param = dev.get_param(prefix)?;
                let mut out = vec![param_info_entry(prefix, &param)];
                if recursive {
                    let mut visitor = CollectParamInfo { out: Vec::new() };
                    if let Some(size) = param.array_len() {
                        for i in 0..size {
                            let child_path = format!("{prefix}/{i}");
                            if let Ok(child) = dev.get_param(&child_path) {
                                traverse_params(&child, &child_path, dev.as_ref(), &mut visitor);
                            }
                        }
                    }
                    for name in param.descriptor().sub_param_names() {
                        let child_path = format!("{prefix}/{name}");
                        if let Ok(child) = dev.get_param(&child_path) {
                            traverse_params(&child, &child_path, dev.as_ref(), &mut visitor);
                        }
                    }
                    out.extend(visitor.out);
                }
                Ok(out)
            }
        }
    })
    .await
}

/// **UpdateSubscriptions** — removals before additions; emits one
/// `ParamEntry` per now-subscribed added OID, skipping lookup failures.
pub async fn update_subscriptions(
    bearer_header: Option<&str>,
    authz_enabled: bool,
    registry: &dyn DeviceRegistry,
    slot: Slot,
    added: Vec<String>,
    removed: Vec<String>,
    subs: &SubscriptionManager,
) -> CatenaResult<Vec<ParamEntry>> {
    dispatch_streaming(bearer_header, authz_enabled, registry, slot, |dev, authz| async move {
        if !dev.subscriptions_supported() {
            return Err(CatenaError::new(
                StatusCode::FailedPrecondition,
                "Subscriptions are not enabled for this device",
            ));
        }
        for oid in &removed {
            subs.remove_subscription(oid)?;
        }
        for oid in &added {
            subs.add_subscription(oid, dev.as_ref(), &authz)?;
        }
        let mut out = Vec::new();
        for oid in &added {
            let Ok(param) = dev.get_param(oid) else { continue };
            if !subs.is_subscribed(oid, dev.as_ref(), &authz) {
                continue;
            }
            if let Ok(value) = param.to_value(&authz) {
                out.push(ParamEntry { oid: oid.clone(), value });
            }
        }
        Ok(out)
    })
    .await
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
