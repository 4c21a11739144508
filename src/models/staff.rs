// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Staff (barber and admin) directory rows.

use crate::models::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A row of the staff directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// Provider uid once the row is linked to an account
    pub uid: Option<String>,
}

impl StaffMember {
    /// Case-insensitive substring match on name or email.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let name = self.display_name.as_deref().unwrap_or("").to_lowercase();
        let email = self.email.as_deref().unwrap_or("").to_lowercase();
        name.contains(&term) || email.contains(&term)
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

fn default_role() -> Role {
    Role::Barbero
}

/// Input for creating or editing a staff row.
///
/// With a `password`, creation also registers a provider account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaffInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub display_name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

impl StaffInput {
    pub fn normalized(mut self) -> Self {
        self.display_name = self.display_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }

    pub fn email_lower(&self) -> String {
        self.email.to_lowercase()
    }
}

/// A staff row that has not been linked to a provider account yet and
/// carries first-login secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAccount {
    pub staff_id: String,
    pub email: String,
    pub display_name: Option<String>,
    /// Seed password and/or national id accepted as first password
    pub secrets: Vec<String>,
}

impl PendingAccount {
    pub fn accepts(&self, password: &str) -> bool {
        let password = password.trim();
        !password.is_empty() && self.secrets.iter().any(|s| s.trim() == password)
    }
}
