// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory demo store.
//!
//! Stands in for Firestore when no backend is configured. Seeded with a few
//! example clients, photos and staff accounts; nothing survives a restart.
//! All operations are synchronous; the async trait impls just wrap them.

use crate::db::{DirectoryStore, ProfileStore};
use crate::error::AppError;
use crate::models::client::non_blank;
use crate::models::{
    Client, ClientUpdate, Identity, NewClient, NewPhoto, NoteOption, PendingAccount, Photo,
    ProfileCollection, ProfileField, ProfileRecord, Role, StaffInput, StaffMember,
};
use crate::models::photo::PHOTO_PAGE_SIZE;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A static account that can be signed into in demo mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DemoAccount {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

impl DemoAccount {
    pub fn identity(&self) -> Identity {
        Identity::new(&self.id)
            .with_email(&self.email)
            .with_display_name(&self.display_name)
    }

    fn to_staff(&self) -> StaffMember {
        StaffMember {
            id: self.id.clone(),
            display_name: Some(self.display_name.clone()),
            email: Some(self.email.clone()),
            role: Some(self.role),
            uid: Some(self.id.clone()),
        }
    }

    fn field(&self, field: ProfileField) -> String {
        match field {
            ProfileField::Uid => self.id.clone(),
            ProfileField::Email => self.email.clone(),
            ProfileField::EmailLower => self.email.to_lowercase(),
        }
    }

    fn to_record(&self) -> ProfileRecord {
        ProfileRecord {
            id: self.id.clone(),
            collection: ProfileCollection::Staff,
            role: Some(self.role),
            display_name: Some(self.display_name.clone()),
        }
    }
}

/// Value plus insertion sequence, so listings can be newest first.
#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    value: T,
}

/// In-memory substitute for the document store.
pub struct DemoStore {
    clients: DashMap<String, Entry<Client>>,
    /// Client id to photos, newest first
    photos: DashMap<String, Vec<Photo>>,
    accounts: DashMap<String, Entry<DemoAccount>>,
    /// Account id to first-login secrets, until the account is linked
    first_login: DashMap<String, Vec<String>>,
    seq: AtomicU64,
    default_owner: String,
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::new()
    }
}

const SEED_ACCOUNTS: [(&str, &str, &str, Role); 3] = [
    ("demo-barber", "Alex Demo", "demo@barberia.dev", Role::Admin),
    ("marcela", "Marcela", "marcela@barberia.dev", Role::Barbero),
    ("diego", "Diego", "diego@barberia.dev", Role::Barbero),
];

const SEED_CLIENTS: [(&str, &str, &str, &[NoteOption]); 3] = [
    ("carlos-ruiz", "Carlos Ruiz", "555 0101", &[NoteOption::Corte]),
    (
        "maria-garcia",
        "Maria Garcia",
        "555 0123",
        &[NoteOption::Corte, NoteOption::Lavado],
    ),
    ("leo-suarez", "Leo Suarez", "555 0145", &[]),
];

const SEED_PHOTOS: [(&str, &str); 3] = [
    (
        "carlos-ruiz",
        "https://images.unsplash.com/photo-1524504388940-b1c1722653e1?auto=format&fit=crop&w=600&q=80",
    ),
    (
        "carlos-ruiz",
        "https://images.unsplash.com/photo-1521572267360-ee0c2909d518?auto=format&fit=crop&w=400&q=80",
    ),
    (
        "maria-garcia",
        "https://images.unsplash.com/photo-1492725764893-90b379c2b6e7?auto=format&fit=crop&w=500&q=80",
    ),
];

impl DemoStore {
    /// A store seeded with the example records.
    pub fn new() -> Self {
        let store = Self::empty(SEED_ACCOUNTS[0].0);

        // Seeds are inserted in reverse so the first one lists first.
        for (id, name, email, role) in SEED_ACCOUNTS.iter().rev() {
            store.insert_account(DemoAccount {
                id: id.to_string(),
                display_name: name.to_string(),
                email: email.to_string(),
                role: *role,
            });
        }

        let now = Utc::now();
        for (id, name, phone, notes) in SEED_CLIENTS.iter().rev() {
            let seq = store.next_seq();
            store.clients.insert(
                id.to_string(),
                Entry {
                    seq,
                    value: Client {
                        id: id.to_string(),
                        full_name: name.to_string(),
                        phone: Some(phone.to_string()),
                        main_barber_id: store.default_owner.clone(),
                        notes: notes.to_vec(),
                        created_at: Some(now),
                    },
                },
            );
            store.photos.insert(id.to_string(), Vec::new());
        }

        for (client_id, url) in SEED_PHOTOS.iter().rev() {
            store.push_photo(
                client_id,
                NewPhoto {
                    url: url.to_string(),
                    delete_token: None,
                    barber_id: Some(store.default_owner.clone()),
                },
            );
        }

        store
    }

    /// A store with no records. `default_owner` is used as the main barber
    /// of clients created without one.
    pub fn empty(default_owner: &str) -> Self {
        Self {
            clients: DashMap::new(),
            photos: DashMap::new(),
            accounts: DashMap::new(),
            first_login: DashMap::new(),
            seq: AtomicU64::new(0),
            default_owner: default_owner.to_string(),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn newest_first<T: Clone>(map: &DashMap<String, Entry<T>>) -> Vec<T> {
        let mut entries: Vec<Entry<T>> = map.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| b.seq.cmp(&a.seq));
        entries.into_iter().map(|e| e.value).collect()
    }

    // ─── Clients ──────────────────────────────────────────────────

    pub fn list_clients(&self) -> Vec<Client> {
        Self::newest_first(&self.clients)
    }

    pub fn get_client(&self, id: &str) -> Option<Client> {
        self.clients.get(id).map(|e| e.value.clone())
    }

    pub fn create_client(&self, input: NewClient) -> Client {
        let input = input.normalized();
        let seq = self.next_seq();
        let client = Client {
            id: format!("demo-client-{}", seq),
            full_name: input.full_name,
            phone: input.phone,
            main_barber_id: input
                .main_barber_id
                .unwrap_or_else(|| self.default_owner.clone()),
            notes: input.notes,
            created_at: Some(Utc::now()),
        };
        self.clients.insert(
            client.id.clone(),
            Entry {
                seq,
                value: client.clone(),
            },
        );
        client
    }

    pub fn update_client(&self, id: &str, update: ClientUpdate) -> Option<Client> {
        let update = update.normalized();
        let mut entry = self.clients.get_mut(id)?;
        entry.value.full_name = update.full_name;
        entry.value.phone = update.phone;
        entry.value.notes = update.notes;
        Some(entry.value.clone())
    }

    /// Remove a client together with its photos.
    pub fn delete_client(&self, id: &str) {
        self.clients.remove(id);
        self.photos.remove(id);
    }

    // ─── Photos ───────────────────────────────────────────────────

    pub fn list_photos(&self, client_id: &str) -> Vec<Photo> {
        self.photos
            .get(client_id)
            .map(|p| p.iter().take(PHOTO_PAGE_SIZE).cloned().collect())
            .unwrap_or_default()
    }

    pub fn push_photo(&self, client_id: &str, photo: NewPhoto) -> Photo {
        let photo = Photo {
            id: format!("demo-photo-{}", self.next_seq()),
            client_id: client_id.to_string(),
            url: photo.url,
            delete_token: photo.delete_token,
            barber_id: photo.barber_id,
            created_at: Some(Utc::now()),
        };
        self.photos
            .entry(client_id.to_string())
            .or_default()
            .insert(0, photo.clone());
        photo
    }

    /// Remove a photo. Returns false if it was not there.
    pub fn remove_photo(&self, client_id: &str, photo_id: &str) -> bool {
        let Some(mut photos) = self.photos.get_mut(client_id) else {
            return false;
        };
        let before = photos.len();
        photos.retain(|p| p.id != photo_id);
        photos.len() != before
    }

    // ─── Accounts ─────────────────────────────────────────────────

    pub fn list_accounts(&self) -> Vec<DemoAccount> {
        Self::newest_first(&self.accounts)
    }

    pub fn get_account(&self, id: &str) -> Option<DemoAccount> {
        self.accounts.get(id).map(|e| e.value.clone())
    }

    fn insert_account(&self, account: DemoAccount) {
        let seq = self.next_seq();
        self.accounts.insert(
            account.id.clone(),
            Entry {
                seq,
                value: account,
            },
        );
    }

    pub fn create_account(&self, display_name: &str, email: &str, role: Role) -> DemoAccount {
        let seq = self.next_seq();
        let account = DemoAccount {
            id: format!("demo-user-{}", seq),
            display_name: display_name.to_string(),
            email: email.to_string(),
            role,
        };
        self.accounts.insert(
            account.id.clone(),
            Entry {
                seq,
                value: account.clone(),
            },
        );
        account
    }

    pub fn update_account(
        &self,
        id: &str,
        display_name: &str,
        email: &str,
        role: Role,
    ) -> Option<DemoAccount> {
        let mut entry = self.accounts.get_mut(id)?;
        entry.value.display_name = display_name.to_string();
        entry.value.email = email.to_string();
        entry.value.role = role;
        Some(entry.value.clone())
    }

    pub fn delete_account(&self, id: &str) {
        self.accounts.remove(id);
        self.first_login.remove(id);
    }

    /// Mark an account as not yet linked, accepting `secret` on first login.
    pub fn add_first_login_secret(&self, id: &str, secret: &str) {
        self.first_login
            .entry(id.to_string())
            .or_default()
            .push(secret.to_string());
    }
}

#[async_trait]
impl ProfileStore for DemoStore {
    async fn get_profile(
        &self,
        collection: ProfileCollection,
        id: &str,
    ) -> Result<Option<ProfileRecord>, AppError> {
        if collection != ProfileCollection::Staff {
            return Ok(None);
        }
        Ok(self.get_account(id).map(|a| a.to_record()))
    }

    async fn find_profiles(
        &self,
        collection: ProfileCollection,
        field: ProfileField,
        value: &str,
        limit: u32,
    ) -> Result<Vec<ProfileRecord>, AppError> {
        if collection != ProfileCollection::Staff {
            return Ok(Vec::new());
        }
        Ok(self
            .list_accounts()
            .iter()
            .filter(|a| a.field(field) == value)
            .take(limit as usize)
            .map(DemoAccount::to_record)
            .collect())
    }
}

#[async_trait]
impl DirectoryStore for DemoStore {
    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        Ok(DemoStore::list_clients(self))
    }

    async fn get_client(&self, id: &str) -> Result<Option<Client>, AppError> {
        Ok(DemoStore::get_client(self, id))
    }

    async fn create_client(&self, client: NewClient) -> Result<Client, AppError> {
        Ok(DemoStore::create_client(self, client))
    }

    async fn update_client(
        &self,
        id: &str,
        update: ClientUpdate,
    ) -> Result<Option<Client>, AppError> {
        Ok(DemoStore::update_client(self, id, update))
    }

    async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        DemoStore::delete_client(self, id);
        Ok(())
    }

    async fn list_photos(&self, client_id: &str) -> Result<Vec<Photo>, AppError> {
        Ok(DemoStore::list_photos(self, client_id))
    }

    async fn get_photo(
        &self,
        client_id: &str,
        photo_id: &str,
    ) -> Result<Option<Photo>, AppError> {
        Ok(self
            .photos
            .get(client_id)
            .and_then(|p| p.iter().find(|p| p.id == photo_id).cloned()))
    }

    async fn add_photo(&self, client_id: &str, photo: NewPhoto) -> Result<Photo, AppError> {
        Ok(self.push_photo(client_id, photo))
    }

    async fn remove_photo(&self, client_id: &str, photo_id: &str) -> Result<(), AppError> {
        if DemoStore::remove_photo(self, client_id, photo_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Photo {} not found", photo_id)))
        }
    }

    async fn list_staff(&self) -> Result<Vec<StaffMember>, AppError> {
        Ok(self.list_accounts().iter().map(DemoAccount::to_staff).collect())
    }

    async fn get_staff(&self, id: &str) -> Result<Option<StaffMember>, AppError> {
        Ok(self.get_account(id).map(|a| a.to_staff()))
    }

    async fn create_staff(
        &self,
        input: &StaffInput,
        uid: Option<&str>,
    ) -> Result<StaffMember, AppError> {
        let account = match non_blank(uid.map(str::to_string)) {
            Some(uid) => {
                let account = DemoAccount {
                    id: uid,
                    display_name: input.display_name.clone(),
                    email: input.email.clone(),
                    role: input.role,
                };
                self.insert_account(account.clone());
                account
            }
            None => self.create_account(&input.display_name, &input.email, input.role),
        };
        Ok(account.to_staff())
    }

    async fn update_staff(
        &self,
        id: &str,
        input: &StaffInput,
    ) -> Result<Option<StaffMember>, AppError> {
        Ok(self
            .update_account(id, &input.display_name, &input.email, input.role)
            .map(|a| a.to_staff()))
    }

    async fn delete_staff(&self, id: &str) -> Result<(), AppError> {
        self.delete_account(id);
        Ok(())
    }

    async fn find_pending_account(
        &self,
        email: &str,
    ) -> Result<Option<PendingAccount>, AppError> {
        let email = email.trim().to_lowercase();
        Ok(self.list_accounts().into_iter().find_map(|account| {
            if account.email.to_lowercase() != email {
                return None;
            }
            let secrets = self.first_login.get(&account.id)?.clone();
            Some(PendingAccount {
                staff_id: account.id,
                email: account.email,
                display_name: Some(account.display_name),
                secrets,
            })
        }))
    }

    async fn link_account(&self, staff_id: &str, _uid: &str, _email: &str) -> Result<(), AppError> {
        if self.get_account(staff_id).is_none() {
            return Err(AppError::NotFound(format!("Staff {} not found", staff_id)));
        }
        self.first_login.remove(staff_id);
        Ok(())
    }
}
