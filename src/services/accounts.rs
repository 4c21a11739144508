// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account lifecycle: sign-in with first-login provisioning, and barber
//! registration by an admin.
//!
//! Staff rows can be seeded before the person has an account, carrying a
//! `seedPassword` and/or `dni`. The first sign-in with one of those creates
//! the provider account and links it to the row.

use crate::db::DirectoryStore;
use crate::error::{AppError, AuthError};
use crate::models::{Identity, Role, StaffInput, StaffMember};
use crate::services::session::SessionMachine;
use std::sync::Arc;
use validator::Validate;

pub struct AccountService {
    session: SessionMachine,
    directory: Arc<dyn DirectoryStore>,
}

impl AccountService {
    pub fn new(session: SessionMachine, directory: Arc<dyn DirectoryStore>) -> Self {
        Self { session, directory }
    }

    /// Sign in, provisioning the account on first login if possible.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let first = match self.session.sign_in(email, password).await {
            Ok(identity) => return Ok(identity),
            Err(e) => e,
        };
        if !first.may_need_provisioning() {
            return Err(first.into());
        }

        if !self.provision(email, password).await? {
            return Err(first.into());
        }
        Ok(self.session.sign_in(email, password).await?)
    }

    /// Create and link the account for a seeded staff row.
    ///
    /// Returns false when there is nothing to provision for these
    /// credentials.
    async fn provision(&self, email: &str, password: &str) -> Result<bool, AppError> {
        let Some(pending) = self.directory.find_pending_account(email).await? else {
            return Ok(false);
        };
        if !pending.accepts(password) {
            tracing::debug!(staff_id = %pending.staff_id, "Seed credentials do not match");
            return Ok(false);
        }

        let provider = self.session.provider()?;
        let identity = match provider
            .create_account(email, password, pending.display_name.as_deref())
            .await
        {
            Ok(identity) => identity,
            // Account exists already; the caller's original error stands.
            Err(AuthError::EmailAlreadyInUse) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        self.directory
            .link_account(&pending.staff_id, &identity.uid, email)
            .await?;
        tracing::info!(
            staff_id = %pending.staff_id,
            uid = %identity.uid,
            "Provisioned account on first login"
        );
        Ok(true)
    }

    /// Register a staff member.
    ///
    /// With a password a provider account is created and the staff row is
    /// keyed by its uid, always as a barber. Without one, only the row is
    /// added.
    pub async fn register_staff(&self, input: StaffInput) -> Result<StaffMember, AppError> {
        let mut input = input.normalized();
        input.validate()?;

        let Some(password) = input.password.take() else {
            return self.directory.create_staff(&input, None).await;
        };

        input.role = Role::Barbero;
        input.email = input.email_lower();
        let identity = self
            .session
            .provider()?
            .create_account(&input.email, &password, Some(&input.display_name))
            .await?;

        let member = self
            .directory
            .create_staff(&input, Some(&identity.uid))
            .await?;
        tracing::info!(uid = %identity.uid, "Barber registered");
        Ok(member)
    }
}
