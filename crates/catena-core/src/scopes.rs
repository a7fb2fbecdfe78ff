// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scope tags and the `ns:role[:w]` string grammar.

/// The four capability roles a scope can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Monitor,
    Operate,
    Config,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monitor => "mon",
            Self::Operate => "op",
            Self::Config => "cfg",
            Self::Admin => "adm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "mon" => Some(Self::Monitor),
            "op" => Some(Self::Operate),
            "cfg" => Some(Self::Config),
            "adm" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// A parsed `ns:role[:w]` scope string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub namespace: String,
    pub role: Role,
    pub write: bool,
}

impl Scope {
    /// The read-granting prefix, e.g. `"st2138:op"` for `"st2138:op:w"`.
    pub fn read_prefix(&self) -> String {
        format!("{}:{}", self.namespace, self.role.as_str())
    }

    /// The exact string a grant must equal to confer write.
    pub fn write_token(&self) -> String {
        format!("{}:{}:w", self.namespace, self.role.as_str())
    }
}

/// Parses a scope of the form `ns:role` or `ns:role:w`.
pub fn parse_scope(s: &str) -> Option<Scope> {
    let mut parts = s.splitn(3, ':');
    let namespace = parts.next()?.to_owned();
    let role = Role::from_str(parts.next()?)?;
    let write = match parts.next() {
        None => false,
        Some("w") => true,
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Scope { namespace, role, write })
}

#[cfg(test)]
#[path = "scopes_tests.rs"]
mod tests;
