// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity issued by the identity provider.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A signed-in user as reported by the identity provider.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Identity {
    /// Opaque provider user id
    pub uid: String,
    pub email: Option<String>,
    /// Display name set on the provider account, if any
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Email trimmed and lower-cased, or `None` if missing or blank.
    pub fn normalized_email(&self) -> Option<String> {
        normalize_email(self.email.as_deref())
    }
}

/// Trim and lower-case an email for use as a lookup key.
pub fn normalize_email(email: Option<&str>) -> Option<String> {
    let email = email?.trim();
    if email.is_empty() {
        None
    } else {
        Some(email.to_lowercase())
    }
}
