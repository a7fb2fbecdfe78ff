// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JWS-claims-derived authorization (scope extraction, read/write checks).

use std::collections::HashSet;

use serde::Deserialize;

use crate::scopes::parse_scope;
use crate::status::{CatenaError, StatusCode};

/// Anything with an optional scope and a read-only flag — satisfied by both
/// `dyn Param` and `dyn ParamDescriptor`, so `readAuthz`/`writeAuthz` can be
/// checked against either without duplicating the scope-comparison logic.
pub trait Authorizable {
    fn scope(&self) -> Option<&str>;
    fn read_only(&self) -> bool;
}

#[derive(Debug, Deserialize, Default)]
struct Claims {
    #[serde(default)]
    scope: String,
    #[serde(default)]
    exp: u64,
}

/// Extracts and holds the `scope` and `exp` claims from a JWS token body.
///
/// Signature verification is assumed to have happened upstream; this type
/// only parses the already-authenticated payload. One instance per
/// in-flight RPC, shared (cloned) across that RPC's fan-out tasks where
/// needed — e.g. one per Connect signal listener.
///
/// The process-wide [`Authorizer::disabled`] sentinel is an explicit flag
/// rather than an identity comparison: the original SDK compares by pointer
/// and stashes a meaningless `{""}` grant set in the disabled instance; a
/// fresh implementation should not rely on that grant being meaningful (see
/// DESIGN.md), so `disabled` is tracked directly and survives cloning.
#[derive(Debug, Clone)]
pub struct Authorizer {
    scopes: HashSet<String>,
    exp: u64,
    disabled: bool,
}

impl Authorizer {
    /// Parses the `scope` (space-separated) and `exp` claims out of a JWS
    /// token's payload segment (`header.payload.signature`).
    ///
    /// Fails with `UNAUTHENTICATED` / `"Invalid JWS Token"` if the token
    /// cannot be split into three segments or the payload is not valid
    /// base64url JSON. A token with no `scope`/`exp` claims yields an empty
    /// scope set and `exp == 0`, not an error.
    pub fn new(jws_token: &str) -> Result<Self, CatenaError> {
        let invalid = || CatenaError::new(StatusCode::Unauthenticated, "Invalid JWS Token");

        let payload_segment = jws_token.split('.').nth(1).ok_or_else(invalid)?;
        let decoded = base64::Engine::decode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            payload_segment,
        )
        .map_err(|_| invalid())?;
        let claims: Claims = serde_json::from_slice(&decoded).map_err(|_| invalid())?;

        let scopes = claims.scope.split_whitespace().map(str::to_owned).collect();
        Ok(Self { scopes, exp: claims.exp, disabled: false })
    }

    /// The process-wide sentinel that approves every read and every
    /// non-read-only write. Handlers detect it via [`Authorizer::is_disabled`].
    pub fn disabled() -> Authorizer {
        Authorizer { scopes: HashSet::new(), exp: 0, disabled: true }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn has_read(&self, scope: &str) -> bool {
        if self.is_disabled() {
            return true;
        }
        let Some(target) = parse_scope(scope) else { return false };
        self.scopes.iter().any(|granted| {
            parse_scope(granted)
                .map(|g| g.read_prefix() == target.read_prefix())
                .unwrap_or(false)
        })
    }

    fn has_write(&self, scope: &str) -> bool {
        let Some(target) = parse_scope(scope) else { return false };
        self.scopes.iter().any(|granted| granted == &target.write_token())
    }

    /// `readAuthz(scope)` — true if any granted scope's read prefix matches
    /// `scope`'s read prefix (a write grant implies the matching read).
    pub fn read_authz_scope(&self, scope: &str) -> bool {
        self.has_read(scope)
    }

    /// `writeAuthz(scope)` — true iff granted exactly `scope:w`. The
    /// disabled sentinel still requires the target not be read-only
    /// (checked by the `Authorizable`-taking overloads); this overload
    /// alone has no read-only flag to consult.
    pub fn write_authz_scope(&self, scope: &str) -> bool {
        if self.is_disabled() {
            return true;
        }
        self.has_write(scope)
    }

    /// `readAuthz(param)` / `readAuthz(descriptor)` — applies
    /// `readAuthz(entity.scope())`, falling back to `device_default_scope`
    /// when the entity has none.
    pub fn read_authz(&self, entity: &dyn Authorizable, device_default_scope: &str) -> bool {
        if self.is_disabled() {
            return true;
        }
        let scope = entity.scope().unwrap_or(device_default_scope);
        self.has_read(scope)
    }

    /// `writeAuthz(param)` / `writeAuthz(descriptor)` — false if read-only;
    /// else `writeAuthz(entity.scope())`.
    pub fn write_authz(&self, entity: &dyn Authorizable, device_default_scope: &str) -> bool {
        if entity.read_only() {
            return false;
        }
        if self.is_disabled() {
            return true;
        }
        let scope = entity.scope().unwrap_or(device_default_scope);
        self.has_write(scope)
    }

    /// `exp != 0 && exp <= now`.
    pub fn is_expired(&self) -> bool {
        if self.exp == 0 {
            return false;
        }
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self.exp <= now
    }
}

#[cfg(test)]
#[path = "authz_tests.rs"]
mod tests;
