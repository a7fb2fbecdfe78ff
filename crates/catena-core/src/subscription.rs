// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-device subscription sets: literal OIDs plus wildcard roots, expanded
//! against the descriptor tree and filtered by the current authorizer.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::authz::Authorizer;
use crate::device::{Device, Param, ParamKind};
use crate::status::{CatenaError, CatenaResult, StatusCode};
use crate::visitor::{traverse_params, ParamVisitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Literal,
    /// `<prefix>/*`, prefix non-empty.
    Subtree,
    /// Exactly `/*`.
    WholeTree,
}

fn classify(pattern: &str) -> PatternKind {
    if pattern == "/*" {
        PatternKind::WholeTree
    } else if pattern.ends_with("/*") {
        PatternKind::Subtree
    } else {
        PatternKind::Literal
    }
}

struct CollectIfReadable<'a> {
    dev: &'a dyn Device,
    authz: &'a Authorizer,
    out: &'a mut HashSet<String>,
}

impl ParamVisitor for CollectIfReadable<'_> {
    fn visit(&mut self, param: &Arc<dyn Param>, path: &str) {
        // `traverse_params` still descends into an array's elements; this
        // just skips emitting the array OID itself, since it names a
        // container, not a leaf a subscriber reads.
        if param.kind() == ParamKind::Array {
            return;
        }
        if self.authz.read_authz(param.as_ref(), self.dev.default_scope()) {
            self.out.insert(path.to_owned());
        }
    }
}

/// Depth-first descendants of `root` (a `<prefix>/*` or `/*` pattern),
/// excluding the prefix parameter itself — "beneath", not "at". Not locked:
/// callers hold (or don't hold) `state` as appropriate for their own call.
fn expand_root(root: &str, dev: &dyn Device, authz: &Authorizer) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut visitor = CollectIfReadable { dev, authz, out: &mut out };

    if root == "/*" {
        for top in dev.top_level_params() {
            let oid = top.oid().to_owned();
            traverse_params(&top, &oid, dev, &mut visitor);
        }
        return out;
    }

    let prefix = root.strip_suffix("/*").unwrap_or(root);
    let Ok(root_param) = dev.get_param(prefix) else {
        return out;
    };
    if let Some(size) = root_param.array_len() {
        for i in 0..size {
            let child_path = format!("{prefix}/{i}");
            if let Ok(child) = dev.get_param(&child_path) {
                traverse_params(&child, &child_path, dev, &mut visitor);
            }
        }
    }
    for name in root_param.descriptor().sub_param_names() {
        let child_path = format!("{prefix}/{name}");
        if let Ok(child) = dev.get_param(&child_path) {
            traverse_params(&child, &child_path, dev, &mut visitor);
        }
    }
    out
}

struct Subscriptions {
    literals: HashSet<String>,
    roots: HashSet<String>,
}

/// Owns one device's subscription state. One instance per (connection,
/// device) pair in the Connect dispatcher; construct with the device's
/// computed cap.
pub struct SubscriptionManager {
    max_subscriptions: usize,
    state: Mutex<Subscriptions>,
}

impl SubscriptionManager {
    pub fn new(max_subscriptions: usize) -> Self {
        Self {
            max_subscriptions,
            state: Mutex::new(Subscriptions { literals: HashSet::new(), roots: HashSet::new() }),
        }
    }

    pub fn max_subscriptions(&self) -> usize {
        self.max_subscriptions
    }

    /// `literals ∪ expand(roots)`, a point-in-time snapshot.
    pub fn get_all_subscribed_oids(&self, dev: &dyn Device, authz: &Authorizer) -> HashSet<String> {
        let (literals, roots) = {
            let state = self.state.lock();
            (state.literals.clone(), state.roots.clone())
        };
        let mut out = literals;
        for root in &roots {
            out.extend(expand_root(root, dev, authz));
        }
        out
    }

    pub fn is_subscribed(&self, oid: &str, dev: &dyn Device, authz: &Authorizer) -> bool {
        let (is_literal, roots) = {
            let state = self.state.lock();
            (state.literals.contains(oid), state.roots.clone())
        };
        is_literal || roots.iter().any(|root| expand_root(root, dev, authz).contains(oid))
    }

    pub fn add_subscription(
        &self,
        oid: &str,
        dev: &dyn Device,
        authz: &Authorizer,
    ) -> CatenaResult<()> {
        match classify(oid) {
            PatternKind::WholeTree | PatternKind::Subtree => {
                let (already_present, literal_count) = {
                    let state = self.state.lock();
                    (state.roots.contains(oid), state.literals.len())
                };
                if already_present {
                    return Err(CatenaError::new(
                        StatusCode::AlreadyExists,
                        format!("{oid} is already subscribed"),
                    ));
                }
                let new_expansion = expand_root(oid, dev, authz);
                if literal_count + new_expansion.len() > self.max_subscriptions {
                    return Err(CatenaError::new(
                        StatusCode::ResourceExhausted,
                        "subscription cap exceeded",
                    ));
                }
                self.state.lock().roots.insert(oid.to_owned());
                Ok(())
            }
            PatternKind::Literal => {
                let roots = self.state.lock().roots.clone();
                let already_covered = self.state.lock().literals.contains(oid)
                    || roots.iter().any(|root| expand_root(root, dev, authz).contains(oid));
                if already_covered {
                    return Err(CatenaError::new(
                        StatusCode::AlreadyExists,
                        format!("{oid} is already subscribed"),
                    ));
                }
                let materialised_len = self.get_all_subscribed_oids(dev, authz).len();
                if materialised_len + 1 > self.max_subscriptions {
                    return Err(CatenaError::new(
                        StatusCode::ResourceExhausted,
                        "subscription cap exceeded",
                    ));
                }
                self.state.lock().literals.insert(oid.to_owned());
                Ok(())
            }
        }
    }

    pub fn remove_subscription(&self, oid: &str) -> CatenaResult<()> {
        let mut state = self.state.lock();
        if state.literals.remove(oid) || state.roots.remove(oid) {
            return Ok(());
        }
        Err(CatenaError::new(StatusCode::NotFound, format!("{oid} is not subscribed")))
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
