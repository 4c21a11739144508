// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Staff roles.
//!
//! Role values arrive as free text from profile documents. They are
//! normalized into [`Role`] as soon as they are read; anything that does not
//! match a known spelling is treated as "no role".

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Role governing route and feature access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Role {
    Admin,
    Barbero,
}

impl Role {
    /// Normalize a free-text role value.
    ///
    /// Case-insensitive. `admin`, `administrador` and `administrator` map to
    /// [`Role::Admin`]; `barbero`, `barberos` and anything containing
    /// `barber` anywhere map to [`Role::Barbero`]. Everything else is `None`.
    pub fn normalize(value: &str) -> Option<Role> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        match normalized.as_str() {
            "admin" | "administrador" | "administrator" => Some(Role::Admin),
            "barbero" | "barberos" => Some(Role::Barbero),
            other if other.contains("barber") => Some(Role::Barbero),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Barbero => "barbero",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
