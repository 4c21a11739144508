// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile lookup: find the role and display name for a signed-in user.
//!
//! Lookups run in a fixed order and stop as soon as an admin profile is
//! found:
//!
//! 1. direct document lookups keyed by uid (staff, then users)
//! 2. indexed queries on `uid` (staff, then users)
//! 3. indexed queries on `email` and `emailLower`, when an email is known
//! 4. direct lookups in any collection step 1 skipped, if nothing matched
//!
//! Otherwise the first role and the first name seen win. A lookup that
//! fails with a permission error counts as "no result"; any other error
//! aborts resolution.

use crate::db::ProfileStore;
use crate::error::AppError;
use crate::models::identity::normalize_email;
use crate::models::{ProfileCollection, ProfileField, ProfileRecord, ResolvedProfile, Role};
use std::sync::Arc;

/// Maximum documents fetched per indexed query.
pub const QUERY_LIMIT: u32 = 5;

/// Resolves `(uid, email)` to a [`ResolvedProfile`].
#[derive(Clone)]
pub struct ProfileResolver {
    store: Option<Arc<dyn ProfileStore>>,
    direct_lookups: Vec<ProfileCollection>,
}

/// One indexed query in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedQuery {
    pub collection: ProfileCollection,
    pub field: ProfileField,
    pub value: String,
}

/// Outcome of feeding a record to the accumulator.
enum Absorbed {
    Continue,
    Admin(ResolvedProfile),
}

#[derive(Default)]
struct Accumulator {
    role: Option<Role>,
    name: Option<String>,
}

impl Accumulator {
    fn absorb(&mut self, record: &ProfileRecord) -> Absorbed {
        if record.is_admin() {
            return Absorbed::Admin(ResolvedProfile {
                role: Some(Role::Admin),
                display_name: record.display_name.clone().or_else(|| self.name.clone()),
            });
        }
        if self.role.is_none() {
            self.role = record.role;
        }
        if self.name.is_none() {
            self.name = record.display_name.clone();
        }
        Absorbed::Continue
    }

    fn is_empty(&self) -> bool {
        self.role.is_none() && self.name.is_none()
    }

    fn finish(self) -> ResolvedProfile {
        ResolvedProfile {
            role: self.role,
            display_name: self.name,
        }
    }
}

impl ProfileResolver {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self {
            store: Some(store),
            direct_lookups: ProfileCollection::ALL.to_vec(),
        }
    }

    /// A resolver with no backing store. Every resolution is unresolved.
    pub fn unconfigured() -> Self {
        Self {
            store: None,
            direct_lookups: ProfileCollection::ALL.to_vec(),
        }
    }

    /// Restrict step 1 to the given collections (in order).
    pub fn with_direct_lookups(mut self, collections: &[ProfileCollection]) -> Self {
        self.direct_lookups = collections.to_vec();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// Indexed queries for a uid and optional (already normalized) email.
    pub fn query_plan(uid: &str, email: Option<&str>) -> Vec<IndexedQuery> {
        let mut plan = vec![
            IndexedQuery {
                collection: ProfileCollection::Staff,
                field: ProfileField::Uid,
                value: uid.to_string(),
            },
            IndexedQuery {
                collection: ProfileCollection::Users,
                field: ProfileField::Uid,
                value: uid.to_string(),
            },
        ];

        if let Some(email) = email {
            for collection in ProfileCollection::ALL {
                for field in [ProfileField::Email, ProfileField::EmailLower] {
                    plan.push(IndexedQuery {
                        collection,
                        field,
                        value: email.to_string(),
                    });
                }
            }
        }
        plan
    }

    /// Resolve the role and display name for a user.
    pub async fn resolve(
        &self,
        uid: &str,
        email: Option<&str>,
    ) -> Result<ResolvedProfile, AppError> {
        let Some(store) = self.store.as_deref() else {
            tracing::debug!(uid, "No profile store configured");
            return Ok(ResolvedProfile::default());
        };
        if uid.trim().is_empty() {
            return Err(AppError::BadRequest("uid must not be empty".to_string()));
        }
        let email = normalize_email(email);

        let mut acc = Accumulator::default();
        let mut attempted = Vec::with_capacity(ProfileCollection::ALL.len());

        // Steps 1 and 2: direct lookups
        for &collection in &self.direct_lookups {
            attempted.push(collection);
            let found = skip_denied(
                store.get_profile(collection, uid).await,
                collection,
                "id",
                uid,
            )?;
            if let Some(record) = found.flatten() {
                if let Absorbed::Admin(resolved) = acc.absorb(&record) {
                    tracing::debug!(uid, collection = collection.name(), "Admin profile found");
                    return Ok(resolved);
                }
            }
        }

        // Step 3: indexed queries
        for query in Self::query_plan(uid, email.as_deref()) {
            let found = skip_denied(
                store
                    .find_profiles(query.collection, query.field, &query.value, QUERY_LIMIT)
                    .await,
                query.collection,
                query.field.name(),
                uid,
            )?
            .unwrap_or_default();

            let mut candidates = found.iter().filter(|r| !r.is_empty());
            let pick = candidates
                .clone()
                .find(|r| r.is_admin())
                .or_else(|| candidates.next());
            if let Some(record) = pick {
                if let Absorbed::Admin(resolved) = acc.absorb(record) {
                    tracing::debug!(
                        uid,
                        collection = query.collection.name(),
                        field = query.field.name(),
                        "Admin profile found"
                    );
                    return Ok(resolved);
                }
            }
        }

        // Step 4: direct lookups that step 1 did not cover
        if acc.is_empty() {
            for collection in ProfileCollection::ALL {
                if attempted.contains(&collection) {
                    continue;
                }
                let found = skip_denied(
                    store.get_profile(collection, uid).await,
                    collection,
                    "id",
                    uid,
                )?;
                if let Some(record) = found.flatten() {
                    if let Absorbed::Admin(resolved) = acc.absorb(&record) {
                        return Ok(resolved);
                    }
                }
            }
        }

        let resolved = acc.finish();
        tracing::debug!(
            uid,
            role = ?resolved.role,
            has_name = resolved.display_name.is_some(),
            "Profile resolved"
        );
        Ok(resolved)
    }
}

/// Treat a permission failure as "no result" and propagate anything else.
fn skip_denied<T>(
    result: Result<T, AppError>,
    collection: ProfileCollection,
    lookup: &str,
    uid: &str,
) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_permission_denied() => {
            tracing::warn!(
                uid,
                collection = collection.name(),
                lookup,
                error = %e,
                "Profile lookup denied, skipping"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
