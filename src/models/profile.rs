// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile documents and their canonical form.
//!
//! Profile documents have accumulated several spellings for the same
//! concept over time (`displayName` / `nombre` / `Nombre`, `lastName` /
//! `apellido` / ...). [`ProfileDocument`] accepts every known alias and
//! [`ProfileDocument::to_record`] collapses them into a [`ProfileRecord`]
//! at the store boundary, so nothing past the store ever sees an alias.

use crate::db::collections;
use crate::models::Role;
use serde::{Deserialize, Serialize};

/// The two collections that may hold a profile for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileCollection {
    /// Staff/barber profiles (`barberos`)
    Staff,
    /// Generic user profiles (`users`)
    Users,
}

impl ProfileCollection {
    pub const ALL: [ProfileCollection; 2] = [ProfileCollection::Staff, ProfileCollection::Users];

    pub fn name(&self) -> &'static str {
        match self {
            ProfileCollection::Staff => collections::STAFF,
            ProfileCollection::Users => collections::USERS,
        }
    }
}

/// Indexed fields a profile can be discovered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Uid,
    Email,
    EmailLower,
}

impl ProfileField {
    pub fn name(&self) -> &'static str {
        match self {
            ProfileField::Uid => "uid",
            ProfileField::Email => "email",
            ProfileField::EmailLower => "emailLower",
        }
    }
}

/// Raw profile document as stored, with every accepted field alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDocument {
    #[serde(default, alias = "_firestore_id", skip_serializing)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "emailLower",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_lower: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    // Primary name spellings, in order of preference
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "displayName",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "Nombre",
        skip_serializing_if = "Option::is_none"
    )]
    pub nombre_upper: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "firstName",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "first_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name_snake: Option<String>,

    // Last name spellings, in order of preference
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "lastName",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub apellido: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "Apellido",
        skip_serializing_if = "Option::is_none"
    )]
    pub apellido_upper: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub apellidos: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "last_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_name_snake: Option<String>,

    // First-login provisioning secrets
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        rename = "seedPassword",
        skip_serializing_if = "Option::is_none"
    )]
    pub seed_password: Option<String>,
}

/// Stored value of a field that should hold text.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseText {
    Text(String),
    Integer(i64),
    Float(f64),
    Other(serde::de::IgnoredAny),
}

/// Text field that some documents store as a number (`dni` usually is).
/// Values of any other type read as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<LooseText>::deserialize(deserializer)? {
        Some(LooseText::Text(text)) => Some(text),
        Some(LooseText::Integer(n)) => Some(n.to_string()),
        Some(LooseText::Float(n)) => Some(n.to_string()),
        Some(LooseText::Other(_)) | None => None,
    })
}

impl ProfileDocument {
    /// Value of an indexed field, as stored.
    pub fn field(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Uid => self.uid.as_deref(),
            ProfileField::Email => self.email.as_deref(),
            ProfileField::EmailLower => self.email_lower.as_deref(),
        }
    }

    /// Normalized role, if the stored value is a recognised spelling.
    pub fn normalized_role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::normalize)
    }

    /// Derive the display name from the name fields.
    ///
    /// The primary name is joined with the last name unless the primary
    /// already ends with it (case-insensitive).
    pub fn derived_name(&self) -> Option<String> {
        let primary = first_non_blank([
            &self.display_name,
            &self.nombre,
            &self.nombre_upper,
            &self.name,
            &self.first_name,
            &self.first_name_snake,
        ]);
        let last = first_non_blank([
            &self.last_name,
            &self.apellido,
            &self.apellido_upper,
            &self.apellidos,
            &self.last_name_snake,
        ]);
        join_names(primary, last)
    }

    /// Collapse into the canonical form used by everything past the store.
    pub fn to_record(&self, id: impl Into<String>, collection: ProfileCollection) -> ProfileRecord {
        ProfileRecord {
            id: id.into(),
            collection,
            role: self.normalized_role(),
            display_name: self.derived_name(),
        }
    }
}

fn first_non_blank<'a, const N: usize>(fields: [&'a Option<String>; N]) -> Option<&'a str> {
    fields
        .into_iter()
        .filter_map(|f| f.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn join_names(primary: Option<&str>, last: Option<&str>) -> Option<String> {
    match (primary, last) {
        (Some(primary), Some(last)) => {
            if primary.to_lowercase().ends_with(&last.to_lowercase()) {
                Some(primary.to_string())
            } else {
                Some(format!("{} {}", primary, last))
            }
        }
        (Some(primary), None) => Some(primary.to_string()),
        (None, Some(last)) => Some(last.to_string()),
        (None, None) => None,
    }
}

/// Canonical profile as returned by a [`crate::db::ProfileStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Document id
    pub id: String,
    pub collection: ProfileCollection,
    pub role: Option<Role>,
    pub display_name: Option<String>,
}

impl ProfileRecord {
    pub fn is_admin(&self) -> bool {
        self.role.is_some_and(|r| r.is_admin())
    }

    /// True when the record carries neither a role nor a name.
    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.display_name.is_none()
    }
}

/// Outcome of profile resolution. Both fields absent means "unresolved".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub role: Option<Role>,
    pub display_name: Option<String>,
}

impl ResolvedProfile {
    pub fn is_unresolved(&self) -> bool {
        self.role.is_none() && self.display_name.is_none()
    }
}
