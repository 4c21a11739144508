// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Two seams: [`ProfileStore`] is everything profile resolution reads, and
//! [`DirectoryStore`] is the CRUD surface for clients, photos and staff.
//! Both are implemented by Firestore ([`FirestoreDb`]) and by the in-memory
//! demo store ([`DemoStore`]).

pub mod demo;
pub mod firestore;

pub use demo::DemoStore;
pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{
    Client, ClientUpdate, NewClient, NewPhoto, PendingAccount, Photo, ProfileCollection,
    ProfileField, ProfileRecord, StaffInput, StaffMember,
};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Staff/barber profiles
    pub const STAFF: &str = "barberos";
    /// Generic user profiles
    pub const USERS: &str = "users";
    pub const CLIENTS: &str = "clientes";
    /// Photo records ("cuts") linking hosted images to a client
    pub const CUTS: &str = "cuts";
}

/// Read-only profile lookups used by the profile resolver.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile document by id.
    async fn get_profile(
        &self,
        collection: ProfileCollection,
        id: &str,
    ) -> Result<Option<ProfileRecord>, AppError>;

    /// Profiles whose `field` equals `value`, at most `limit` of them.
    async fn find_profiles(
        &self,
        collection: ProfileCollection,
        field: ProfileField,
        value: &str,
        limit: u32,
    ) -> Result<Vec<ProfileRecord>, AppError>;
}

/// Directory CRUD for clients, their photos and staff.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // ─── Clients ──────────────────────────────────────────────────

    /// All clients, newest first.
    async fn list_clients(&self) -> Result<Vec<Client>, AppError>;

    async fn get_client(&self, id: &str) -> Result<Option<Client>, AppError>;

    /// Create a client. `main_barber_id` must already be filled in.
    async fn create_client(&self, client: NewClient) -> Result<Client, AppError>;

    /// Replace the editable fields. Returns `None` if the client is gone.
    async fn update_client(
        &self,
        id: &str,
        update: ClientUpdate,
    ) -> Result<Option<Client>, AppError>;

    async fn delete_client(&self, id: &str) -> Result<(), AppError>;

    // ─── Photos ───────────────────────────────────────────────────

    /// Photos of a client, newest first, one page.
    async fn list_photos(&self, client_id: &str) -> Result<Vec<Photo>, AppError>;

    async fn get_photo(&self, client_id: &str, photo_id: &str)
        -> Result<Option<Photo>, AppError>;

    async fn add_photo(&self, client_id: &str, photo: NewPhoto) -> Result<Photo, AppError>;

    async fn remove_photo(&self, client_id: &str, photo_id: &str) -> Result<(), AppError>;

    // ─── Staff ────────────────────────────────────────────────────

    async fn list_staff(&self) -> Result<Vec<StaffMember>, AppError>;

    async fn get_staff(&self, id: &str) -> Result<Option<StaffMember>, AppError>;

    /// Create a staff row. With `uid`, the row is keyed by (and linked to)
    /// that provider account; otherwise an id is generated.
    async fn create_staff(
        &self,
        input: &StaffInput,
        uid: Option<&str>,
    ) -> Result<StaffMember, AppError>;

    async fn update_staff(
        &self,
        id: &str,
        input: &StaffInput,
    ) -> Result<Option<StaffMember>, AppError>;

    async fn delete_staff(&self, id: &str) -> Result<(), AppError>;

    /// An unlinked staff row for `email` carrying first-login secrets.
    async fn find_pending_account(&self, email: &str)
        -> Result<Option<PendingAccount>, AppError>;

    /// Link a staff row to a provider account and drop its secrets.
    async fn link_account(&self, staff_id: &str, uid: &str, email: &str)
        -> Result<(), AppError>;
}
