// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use barber_directory::config::Config;
use barber_directory::db::{DemoStore, FirestoreDb, ProfileStore};
use barber_directory::error::{AppError, AuthError};
use barber_directory::models::{
    Identity, ProfileCollection, ProfileDocument, ProfileField, ProfileRecord,
};
use barber_directory::routes::create_router;
use barber_directory::services::{IdentityProvider, Subscription};
use barber_directory::AppState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Semaphore};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Recording profile store ─────────────────────────────────────

/// In-memory [`ProfileStore`] that records every lookup.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingStore {
    docs: Mutex<Vec<(ProfileCollection, ProfileDocument)>>,
    denied: Mutex<Vec<ProfileCollection>>,
    broken: Mutex<Vec<ProfileCollection>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

#[allow(dead_code)]
impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add a document to `collection` under `id`.
    pub fn insert(&self, collection: ProfileCollection, id: &str, doc: serde_json::Value) {
        let mut doc: ProfileDocument =
            serde_json::from_value(doc).expect("valid profile document");
        doc.id = Some(id.to_string());
        self.docs.lock().unwrap().push((collection, doc));
    }

    /// Every lookup in `collection` fails with a permission error.
    pub fn deny(&self, collection: ProfileCollection) {
        self.denied.lock().unwrap().push(collection);
    }

    /// Every lookup in `collection` fails with a non-permission error.
    pub fn break_collection(&self, collection: ProfileCollection) {
        self.broken.lock().unwrap().push(collection);
    }

    /// Hold every lookup until the returned semaphore gets permits.
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, call: String, collection: ProfileCollection) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }
        if self.denied.lock().unwrap().contains(&collection) {
            return Err(AppError::from_store_message(
                "permission-denied: Missing or insufficient permissions.",
            ));
        }
        if self.broken.lock().unwrap().contains(&collection) {
            return Err(AppError::from_store_message("unavailable: connection reset"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for RecordingStore {
    async fn get_profile(
        &self,
        collection: ProfileCollection,
        id: &str,
    ) -> Result<Option<ProfileRecord>, AppError> {
        self.enter(format!("get {} {}", collection.name(), id), collection)
            .await?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .find(|(c, d)| *c == collection && d.id.as_deref() == Some(id))
            .map(|(_, d)| d.to_record(id, collection)))
    }

    async fn find_profiles(
        &self,
        collection: ProfileCollection,
        field: ProfileField,
        value: &str,
        limit: u32,
    ) -> Result<Vec<ProfileRecord>, AppError> {
        self.enter(
            format!("find {} {} {}", collection.name(), field.name(), value),
            collection,
        )
        .await?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, d)| *c == collection && d.field(field) == Some(value))
            .take(limit as usize)
            .map(|(_, d)| d.to_record(d.id.clone().unwrap_or_default(), collection))
            .collect())
    }
}

// ─── Scripted identity provider ──────────────────────────────────

/// Identity provider backed by a table of accounts.
#[allow(dead_code)]
pub struct ScriptedProvider {
    current: watch::Sender<Option<Identity>>,
    accounts: Mutex<HashMap<String, (String, Identity)>>,
    pub resets: Mutex<Vec<String>>,
    pub sign_outs: Mutex<u32>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        let (current, _) = watch::channel(None);
        Arc::new(Self {
            current,
            accounts: Mutex::new(HashMap::new()),
            resets: Mutex::new(Vec::new()),
            sign_outs: Mutex::new(0),
        })
    }

    pub fn add_account(&self, uid: &str, email: &str, password: &str) {
        self.accounts.lock().unwrap().insert(
            email.to_lowercase(),
            (password.to_string(), Identity::new(uid).with_email(email)),
        );
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.accounts
            .lock()
            .unwrap()
            .contains_key(&email.to_lowercase())
    }

    /// Simulate a provider session change.
    pub fn push(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let accounts = self.accounts.lock().unwrap();
            let (expected, identity) = accounts
                .get(&email.trim().to_lowercase())
                .ok_or(AuthError::UserNotFound)?;
            if expected != password {
                return Err(AuthError::WrongPassword);
            }
            identity.clone()
        };
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.sign_outs.lock().unwrap() += 1;
        self.current.send_replace(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.resets.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        let key = email.trim().to_lowercase();
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailAlreadyInUse);
        }
        let mut identity = Identity::new(format!("uid-{}", accounts.len() + 1)).with_email(&key);
        identity.display_name = display_name.map(str::to_string);
        accounts.insert(key, (password.to_string(), identity.clone()));
        Ok(identity)
    }

    async fn update_display_name(&self, _display_name: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

// ─── Test apps ───────────────────────────────────────────────────

/// Create a demo-mode test app (no backend, in-memory store).
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::demo(Config::test_default()));
    state.session.start().unsubscribe();
    (create_router(state.clone()), state)
}

/// Create a test app signed in through `provider`, with `store` as the
/// profile and directory store.
#[allow(dead_code)]
pub fn create_backend_app(
    provider: Arc<ScriptedProvider>,
    store: Arc<DemoStore>,
) -> (axum::Router, Arc<AppState>, Subscription) {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Some(provider as Arc<dyn IdentityProvider>),
        store.clone(),
        store,
        Arc::new(DemoStore::new()),
    ));
    let subscription = state.session.start();
    (create_router(state.clone()), state, subscription)
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
