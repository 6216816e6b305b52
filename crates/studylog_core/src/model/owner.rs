//! Owner record and user-name rules.
//!
//! # Invariants
//! - `user_name` is unique across every owner, active or disabled.
//! - Owners are never deleted; `disabled` is the only lifecycle switch.

use crate::error::{StoreError, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static USER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]{0,31}$").expect("valid user name regex"));

/// Opaque, stable identity handed over by the authentication layer.
pub type OwnerId = String;

/// A tenant owning a partition of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub owner_id: OwnerId,
    /// Public display handle, unique across all owners.
    pub user_name: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Equals `created_at` until the first login.
    pub last_login_at: i64,
    pub disabled: bool,
}

impl Owner {
    /// Creates an enabled owner registered at `now_ms`.
    pub fn new(owner_id: impl Into<String>, user_name: impl Into<String>, now_ms: i64) -> Self {
        Self {
            owner_id: owner_id.into(),
            user_name: user_name.into(),
            created_at: now_ms,
            last_login_at: now_ms,
            disabled: false,
        }
    }
}

/// Profile view combining the stored user name with the display name
/// reported by the identity provider for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_name: String,
    pub screen_name: String,
}

/// Rejects empty owner identities.
pub fn validate_owner_id(owner_id: &str) -> StoreResult<()> {
    if owner_id.trim().is_empty() {
        return Err(StoreError::InvalidInput(
            "owner_id must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks the public handle format: 1-32 chars of `[A-Za-z0-9_.-]`,
/// starting with an ASCII letter or digit.
pub fn validate_user_name(user_name: &str) -> StoreResult<()> {
    if USER_NAME_RE.is_match(user_name) {
        return Ok(());
    }
    Err(StoreError::InvalidInput(format!(
        "invalid user name `{user_name}`; expected 1-32 chars of [A-Za-z0-9_.-]"
    )))
}
