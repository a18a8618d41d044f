// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional JSON profile holding connection settings and the robot list.
//!
//! ```json
//! {
//!   "endpoint": "https://api.fleet.example",
//!   "account_id": "CI0001",
//!   "user_name": "admin",
//!   "password": "...",
//!   "proxy_url": "http://localhost:3128",
//!   "robot_ids": ["aee4a0c4-...", "0c809444-..."]
//! }
//! ```
//!
//! Every key is optional. A present key must hold exactly the expected kind;
//! the whole profile is rejected with a [`TypeMismatch`] otherwise.

use std::fmt;
use std::path::Path;

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::warn;

use crate::validate::{require_type, TypeMismatch, ValueKind};

const OP: &str = "load_profile";

const KNOWN_KEYS: &[&str] =
    &["endpoint", "account_id", "user_name", "password", "proxy_url", "robot_ids"];

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub endpoint: Option<String>,
    pub account_id: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub proxy_url: Option<String>,
    pub robot_ids: Option<Vec<String>>,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("endpoint", &self.endpoint)
            .field("account_id", &self.account_id)
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("proxy_url", &self.proxy_url)
            .field("robot_ids", &self.robot_ids)
            .finish()
    }
}

impl Profile {
    /// Read and validate a profile file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("parsing profile {}", path.display()))?;
        Ok(Self::from_value(&value)?)
    }

    /// Validate an already-parsed profile document.
    pub fn from_value(value: &Value) -> Result<Self, TypeMismatch> {
        require_type(value, &[ValueKind::Object], OP, "<root>")?;
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);

        for key in obj.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!(key = %key, "ignoring unknown profile key");
            }
        }

        Ok(Self {
            endpoint: string_key(obj, "endpoint")?,
            account_id: string_key(obj, "account_id")?,
            user_name: string_key(obj, "user_name")?,
            password: string_key(obj, "password")?,
            proxy_url: string_key(obj, "proxy_url")?,
            robot_ids: string_list_key(obj, "robot_ids")?,
        })
    }
}

fn string_key(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, TypeMismatch> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    require_type(value, &[ValueKind::String], OP, key)?;
    Ok(value.as_str().map(str::to_owned))
}

fn string_list_key(
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, TypeMismatch> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    require_type(value, &[ValueKind::Array], OP, key)?;
    let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        require_type(item, &[ValueKind::String], OP, &format!("{key}[{i}]"))?;
        if let Some(s) = item.as_str() {
            out.push(s.to_owned());
        }
    }
    Ok(Some(out))
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
