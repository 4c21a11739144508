// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session view exposed to the rest of the application.

use crate::models::{Identity, Role};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Snapshot of the current session.
///
/// `loading` is true only while the initial identity resolution is in
/// flight. Derived state, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionView {
    pub user: Option<Identity>,
    pub role: Option<Role>,
    pub profile_name: Option<String>,
    pub loading: bool,
    pub demo_mode: bool,
}

impl SessionView {
    /// Before the first identity notification has been handled.
    pub fn uninitialized(demo_mode: bool) -> Self {
        Self {
            user: None,
            role: None,
            profile_name: None,
            loading: true,
            demo_mode,
        }
    }

    pub fn anonymous(demo_mode: bool) -> Self {
        Self {
            loading: false,
            ..Self::uninitialized(demo_mode)
        }
    }

    /// A user is known but their profile is still being resolved.
    pub fn resolving(user: Identity) -> Self {
        Self {
            user: Some(user),
            role: None,
            profile_name: None,
            loading: true,
            demo_mode: false,
        }
    }

    pub fn authenticated(
        user: Identity,
        role: Role,
        profile_name: Option<String>,
        demo_mode: bool,
    ) -> Self {
        Self {
            user: Some(user),
            role: Some(role),
            profile_name,
            loading: false,
            demo_mode,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }

    pub fn uid(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }
}
