// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Barber-Directory: client and photo directory for a barbershop
//!
//! This crate provides the session and directory API behind the shop's
//! web front end: identity and role resolution over Firebase Auth and
//! Firestore, with an in-memory demo mode when no backend is configured.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{DemoStore, DirectoryStore, ProfileStore};
use services::{AccountService, IdentityProvider, ImageHost, ProfileResolver, SessionMachine};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub session: SessionMachine,
    pub directory: Arc<dyn DirectoryStore>,
    pub images: ImageHost,
    pub accounts: AccountService,
}

impl AppState {
    /// Wire up the services.
    ///
    /// `demo` supplies the accounts offered for demo login and is only
    /// consulted when `provider` is `None`.
    pub fn new(
        config: Config,
        provider: Option<Arc<dyn IdentityProvider>>,
        profiles: Arc<dyn ProfileStore>,
        directory: Arc<dyn DirectoryStore>,
        demo: Arc<DemoStore>,
    ) -> Self {
        let resolver = ProfileResolver::new(profiles);
        let session = SessionMachine::new(provider, resolver, demo, &config.fallback_admin_email);
        let accounts = AccountService::new(session.clone(), directory.clone());
        let images = ImageHost::new(config.cloudinary.clone());

        Self {
            config,
            session,
            directory,
            images,
            accounts,
        }
    }

    /// Everything backed by a fresh in-memory demo store.
    pub fn demo(config: Config) -> Self {
        let store = Arc::new(DemoStore::new());
        Self::new(config, None, store.clone(), store.clone(), store)
    }
}
