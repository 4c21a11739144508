// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides:
//! - Profile lookups (by id and by indexed field) for role resolution
//! - Clients (directory entries)
//! - Cuts (photo records linking hosted images to a client)
//! - Staff rows, including first-login account linking
//!
//! Stored documents are decoded tolerantly here and converted to the
//! canonical models before leaving this module.

use crate::db::{collections, DirectoryStore, ProfileStore};
use crate::error::AppError;
use crate::models::photo::newest_page;
use crate::models::{
    Client, ClientUpdate, NewClient, NewPhoto, NoteOption, PendingAccount, Photo,
    ProfileCollection, ProfileDocument, ProfileField, ProfileRecord, StaffInput, StaffMember,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Profile queries never need more than a handful of matches.
const PENDING_ACCOUNT_QUERY_LIMIT: u32 = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJvd25lciJ9."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn connection(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn get_cut(&self, cut_id: &str) -> Result<Option<CutDocument>, AppError> {
        self.connection()?
            .fluent()
            .select()
            .by_id_in(collections::CUTS)
            .obj()
            .one(cut_id)
            .await
            .map_err(store_error)
    }

    async fn query_staff(
        &self,
        field: ProfileField,
        value: &str,
    ) -> Result<Vec<ProfileDocument>, AppError> {
        let value = value.to_string();
        self.connection()?
            .fluent()
            .select()
            .from(collections::STAFF)
            .filter(move |q| q.for_all([q.field(field.name()).eq(value.clone())]))
            .limit(PENDING_ACCOUNT_QUERY_LIMIT)
            .obj()
            .query()
            .await
            .map_err(store_error)
    }
}

/// Map a Firestore error, keeping permission failures distinguishable.
fn store_error(e: FirestoreError) -> AppError {
    let message = match &e {
        FirestoreError::DatabaseError(db) => format!("{}: {}", db.public.code, e),
        _ => e.to_string(),
    };
    AppError::from_store_message(message)
}

// ─── Stored document shapes ──────────────────────────────────────

/// Scalar that older documents stored as a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredText {
    Text(String),
    Integer(i64),
}

impl StoredText {
    fn into_string(self) -> String {
        match self {
            StoredText::Text(s) => s,
            StoredText::Integer(n) => n.to_string(),
        }
    }
}

/// Notes are a list of options, or free text in older documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredNotes {
    List(Vec<String>),
    Text(String),
}

impl StoredNotes {
    fn parse(&self) -> Vec<NoteOption> {
        match self {
            StoredNotes::List(items) => NoteOption::from_values(items.iter().map(String::as_str)),
            StoredNotes::Text(text) => NoteOption::from_text(text),
        }
    }

    fn from_options(notes: &[NoteOption]) -> Self {
        StoredNotes::List(notes.iter().map(|n| n.as_str().to_string()).collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ClientDocument {
    #[serde(default, alias = "_firestore_id", skip_serializing)]
    id: Option<String>,
    #[serde(rename = "fullName", default)]
    full_name: String,
    #[serde(rename = "fullName_lower", default)]
    full_name_lower: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<StoredText>,
    #[serde(rename = "mainBarberId", default)]
    main_barber_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<StoredNotes>,
    #[serde(
        rename = "createdAt",
        default,
        with = "firestore::serialize_as_optional_timestamp"
    )]
    created_at: Option<DateTime<Utc>>,
}

impl ClientDocument {
    fn into_client(self, fallback_id: &str) -> Client {
        Client {
            id: self.id.unwrap_or_else(|| fallback_id.to_string()),
            full_name: self.full_name,
            phone: self.phone.map(StoredText::into_string),
            main_barber_id: self.main_barber_id,
            notes: self.notes.as_ref().map(StoredNotes::parse).unwrap_or_default(),
            created_at: self.created_at,
        }
    }
}

/// One entry of a cut's `photos` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredPhoto {
    Url(String),
    Record(StoredPhotoRecord),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredPhotoRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secure_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(rename = "deleteToken", default)]
    delete_token: Option<String>,
    #[serde(rename = "delete_token", default, skip_serializing_if = "Option::is_none")]
    delete_token_legacy: Option<String>,
    #[serde(rename = "barberId", default, skip_serializing_if = "Option::is_none")]
    barber_id: Option<String>,
}

/// Canonical view of a stored photo entry.
struct PhotoEntry {
    url: String,
    delete_token: Option<String>,
    barber_id: Option<String>,
}

impl StoredPhoto {
    fn normalize(&self, cut_barber_id: Option<&str>) -> Option<PhotoEntry> {
        let fallback_barber = cut_barber_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match self {
            StoredPhoto::Url(url) if !url.trim().is_empty() => Some(PhotoEntry {
                url: url.clone(),
                delete_token: None,
                barber_id: fallback_barber,
            }),
            StoredPhoto::Url(_) => None,
            StoredPhoto::Record(record) => {
                let url = record
                    .url
                    .clone()
                    .or_else(|| record.secure_url.clone())
                    .or_else(|| record.path.clone())
                    .filter(|u| !u.is_empty())?;
                let barber_id = record
                    .barber_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .or(fallback_barber);
                Some(PhotoEntry {
                    url,
                    delete_token: record
                        .delete_token
                        .clone()
                        .or_else(|| record.delete_token_legacy.clone()),
                    barber_id,
                })
            }
        }
    }
}

impl PhotoEntry {
    fn into_stored(self) -> StoredPhoto {
        StoredPhoto::Record(StoredPhotoRecord {
            url: Some(self.url),
            delete_token: self.delete_token,
            barber_id: self.barber_id,
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CutDocument {
    #[serde(default, alias = "_firestore_id", skip_serializing)]
    id: Option<String>,
    #[serde(rename = "clientId", default)]
    client_id: String,
    #[serde(rename = "barberId", default)]
    barber_id: Option<String>,
    #[serde(default)]
    photos: Vec<StoredPhoto>,
    #[serde(
        rename = "createdAt",
        default,
        with = "firestore::serialize_as_optional_timestamp"
    )]
    created_at: Option<DateTime<Utc>>,
}

impl CutDocument {
    /// Decodable entries with their position in the stored `photos` array.
    fn entries(&self) -> impl Iterator<Item = (usize, PhotoEntry)> + '_ {
        self.photos
            .iter()
            .enumerate()
            .filter_map(|(index, p)| Some((index, p.normalize(self.barber_id.as_deref())?)))
    }

    fn photos(&self) -> Vec<Photo> {
        let cut_id = self.id.as_deref().unwrap_or_default();
        self.entries()
            .map(|(_, entry)| Photo {
                id: photo_key(cut_id, &entry.url),
                client_id: self.client_id.clone(),
                url: entry.url,
                delete_token: entry.delete_token,
                barber_id: entry.barber_id,
                created_at: self.created_at,
            })
            .collect()
    }

    /// Stored entries left once the photo with `key` is removed, or `None`
    /// if no entry has that key. Every other entry is kept exactly as
    /// stored, including ones that do not decode.
    fn without_photo(&self, key: &str) -> Option<Vec<StoredPhoto>> {
        let cut_id = self.id.as_deref().unwrap_or_default();
        let (index, _) = self
            .entries()
            .find(|(_, entry)| photo_key(cut_id, &entry.url) == key)?;
        let mut remaining = self.photos.clone();
        remaining.remove(index);
        Some(remaining)
    }
}

/// Hex digits of the URL digest carried in a photo key.
const PHOTO_DIGEST_LEN: usize = 12;

/// `<cut id>-<url digest>`. Derived from the URL rather than the array
/// position so a key keeps naming the same photo after others are removed.
fn photo_key(cut_id: &str, url: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    format!("{}-{}", cut_id, &digest[..PHOTO_DIGEST_LEN])
}

/// Cut id of a well-formed photo key.
fn parse_photo_key(key: &str) -> Option<&str> {
    let (cut_id, digest) = key.rsplit_once('-')?;
    if cut_id.is_empty()
        || digest.len() != PHOTO_DIGEST_LEN
        || !digest.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    Some(cut_id)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StaffWrite {
    #[serde(rename = "displayName")]
    display_name: String,
    email: String,
    #[serde(rename = "emailLower")]
    email_lower: String,
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uid: Option<String>,
    #[serde(
        rename = "createdAt",
        default,
        with = "firestore::serialize_as_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    created_at: Option<DateTime<Utc>>,
}

impl StaffWrite {
    fn from_input(input: &StaffInput, uid: Option<&str>) -> Self {
        Self {
            display_name: input.display_name.clone(),
            email: input.email.clone(),
            email_lower: input.email_lower(),
            role: input.role.as_str().to_string(),
            uid: uid.map(str::to_string),
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountLink {
    uid: String,
    #[serde(rename = "emailLower")]
    email_lower: String,
}

fn staff_from_document(doc: &ProfileDocument, fallback_id: &str) -> StaffMember {
    StaffMember {
        id: doc.id.clone().unwrap_or_else(|| fallback_id.to_string()),
        display_name: doc.derived_name(),
        email: doc.email.clone(),
        role: doc.normalized_role(),
        uid: doc.uid.clone(),
    }
}

fn pending_from_document(doc: &ProfileDocument, email: &str) -> Option<PendingAccount> {
    if doc.uid.as_deref().is_some_and(|u| !u.trim().is_empty()) {
        return None;
    }
    let secrets: Vec<String> = [&doc.seed_password, &doc.dni]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .collect();
    if secrets.is_empty() {
        return None;
    }
    Some(PendingAccount {
        staff_id: doc.id.clone()?,
        email: doc.email.clone().unwrap_or_else(|| email.to_string()),
        display_name: doc.derived_name(),
        secrets,
    })
}

// ─── Profile lookups ─────────────────────────────────────────────

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_profile(
        &self,
        collection: ProfileCollection,
        id: &str,
    ) -> Result<Option<ProfileRecord>, AppError> {
        let doc: Option<ProfileDocument> = self
            .connection()?
            .fluent()
            .select()
            .by_id_in(collection.name())
            .obj()
            .one(id)
            .await
            .map_err(store_error)?;

        Ok(doc.map(|d| d.to_record(id, collection)))
    }

    async fn find_profiles(
        &self,
        collection: ProfileCollection,
        field: ProfileField,
        value: &str,
        limit: u32,
    ) -> Result<Vec<ProfileRecord>, AppError> {
        let value = value.to_string();
        let docs: Vec<ProfileDocument> = self
            .connection()?
            .fluent()
            .select()
            .from(collection.name())
            .filter(move |q| q.for_all([q.field(field.name()).eq(value.clone())]))
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(store_error)?;

        Ok(docs
            .iter()
            .map(|d| d.to_record(d.id.clone().unwrap_or_default(), collection))
            .collect())
    }
}

// ─── Directory ───────────────────────────────────────────────────

#[async_trait]
impl DirectoryStore for FirestoreDb {
    async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        let docs: Vec<ClientDocument> = self
            .connection()?
            .fluent()
            .select()
            .from(collections::CLIENTS)
            .obj()
            .query()
            .await
            .map_err(store_error)?;

        let mut clients: Vec<Client> = docs.into_iter().map(|d| d.into_client("")).collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clients)
    }

    async fn get_client(&self, id: &str) -> Result<Option<Client>, AppError> {
        let doc: Option<ClientDocument> = self
            .connection()?
            .fluent()
            .select()
            .by_id_in(collections::CLIENTS)
            .obj()
            .one(id)
            .await
            .map_err(store_error)?;

        Ok(doc.map(|d| d.into_client(id)))
    }

    async fn create_client(&self, client: NewClient) -> Result<Client, AppError> {
        let client = client.normalized();
        let doc = ClientDocument {
            id: None,
            full_name_lower: client.full_name.to_lowercase(),
            full_name: client.full_name,
            phone: client.phone.map(StoredText::Text),
            main_barber_id: client.main_barber_id.unwrap_or_default(),
            notes: Some(StoredNotes::from_options(&client.notes)),
            created_at: Some(Utc::now()),
        };

        let created: ClientDocument = self
            .connection()?
            .fluent()
            .insert()
            .into(collections::CLIENTS)
            .generate_document_id()
            .object(&doc)
            .execute()
            .await
            .map_err(store_error)?;

        let client = created.into_client("");
        tracing::info!(client_id = %client.id, "Client created");
        Ok(client)
    }

    async fn update_client(
        &self,
        id: &str,
        update: ClientUpdate,
    ) -> Result<Option<Client>, AppError> {
        let Some(existing) = DirectoryStore::get_client(self, id).await? else {
            return Ok(None);
        };

        let update = update.normalized();
        let doc = ClientDocument {
            id: None,
            full_name_lower: update.full_name.to_lowercase(),
            full_name: update.full_name,
            // Absent from the object but present in the mask: deleted
            phone: update.phone.map(StoredText::Text),
            main_barber_id: existing.main_barber_id,
            notes: Some(StoredNotes::from_options(&update.notes)),
            created_at: existing.created_at,
        };

        let updated: ClientDocument = self
            .connection()?
            .fluent()
            .update()
            .fields(["fullName", "fullName_lower", "phone", "notes"])
            .in_col(collections::CLIENTS)
            .document_id(id)
            .object(&doc)
            .execute()
            .await
            .map_err(store_error)?;

        Ok(Some(updated.into_client(id)))
    }

    async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        self.connection()?
            .fluent()
            .delete()
            .from(collections::CLIENTS)
            .document_id(id)
            .execute()
            .await
            .map_err(store_error)?;
        tracing::info!(client_id = id, "Client deleted");
        Ok(())
    }

    async fn list_photos(&self, client_id: &str) -> Result<Vec<Photo>, AppError> {
        let client_id_owned = client_id.to_string();
        let cuts: Vec<CutDocument> = self
            .connection()?
            .fluent()
            .select()
            .from(collections::CUTS)
            .filter(move |q| q.for_all([q.field("clientId").eq(client_id_owned.clone())]))
            .obj()
            .query()
            .await
            .map_err(store_error)?;

        let legacy = cuts
            .iter()
            .flat_map(|c| c.photos.iter())
            .filter(|p| match p {
                StoredPhoto::Url(_) => true,
                StoredPhoto::Record(r) => r.barber_id.is_none() || r.delete_token_legacy.is_some(),
            })
            .count();
        if legacy > 0 {
            tracing::warn!(
                client_id,
                legacy,
                "Client has photos stored in a legacy shape"
            );
        }

        Ok(newest_page(cuts.iter().flat_map(CutDocument::photos).collect()))
    }

    async fn get_photo(
        &self,
        client_id: &str,
        photo_id: &str,
    ) -> Result<Option<Photo>, AppError> {
        let Some(cut_id) = parse_photo_key(photo_id) else {
            return Ok(None);
        };
        let Some(mut cut) = self.get_cut(cut_id).await? else {
            return Ok(None);
        };
        if cut.client_id != client_id {
            return Ok(None);
        }
        cut.id = Some(cut_id.to_string());
        Ok(cut.photos().into_iter().find(|p| p.id == photo_id))
    }

    async fn add_photo(&self, client_id: &str, photo: NewPhoto) -> Result<Photo, AppError> {
        let entry = PhotoEntry {
            url: photo.url,
            delete_token: photo.delete_token,
            barber_id: photo.barber_id.clone(),
        };
        let doc = CutDocument {
            id: None,
            client_id: client_id.to_string(),
            barber_id: photo.barber_id,
            photos: vec![entry.into_stored()],
            created_at: Some(Utc::now()),
        };

        let created: CutDocument = self
            .connection()?
            .fluent()
            .insert()
            .into(collections::CUTS)
            .generate_document_id()
            .object(&doc)
            .execute()
            .await
            .map_err(store_error)?;

        created
            .photos()
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("Stored cut has no photo".to_string()))
    }

    async fn remove_photo(&self, client_id: &str, photo_id: &str) -> Result<(), AppError> {
        let not_found = || AppError::NotFound(format!("Photo {} not found", photo_id));
        let cut_id = parse_photo_key(photo_id).ok_or_else(not_found)?;
        let mut cut = self
            .get_cut(cut_id)
            .await?
            .filter(|c| c.client_id == client_id)
            .ok_or_else(not_found)?;
        cut.id = Some(cut_id.to_string());
        let photos = cut.without_photo(photo_id).ok_or_else(not_found)?;

        if photos.is_empty() {
            self.connection()?
                .fluent()
                .delete()
                .from(collections::CUTS)
                .document_id(cut_id)
                .execute()
                .await
                .map_err(store_error)?;
            return Ok(());
        }

        let remaining = CutDocument { photos, ..cut };
        let _: CutDocument = self
            .connection()?
            .fluent()
            .update()
            .fields(["photos"])
            .in_col(collections::CUTS)
            .document_id(cut_id)
            .object(&remaining)
            .execute()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn list_staff(&self) -> Result<Vec<StaffMember>, AppError> {
        let docs: Vec<ProfileDocument> = self
            .connection()?
            .fluent()
            .select()
            .from(collections::STAFF)
            .order_by([(
                "displayName",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(store_error)?;

        Ok(docs.iter().map(|d| staff_from_document(d, "")).collect())
    }

    async fn get_staff(&self, id: &str) -> Result<Option<StaffMember>, AppError> {
        let doc: Option<ProfileDocument> = self
            .connection()?
            .fluent()
            .select()
            .by_id_in(collections::STAFF)
            .obj()
            .one(id)
            .await
            .map_err(store_error)?;

        Ok(doc.map(|d| staff_from_document(&d, id)))
    }

    async fn create_staff(
        &self,
        input: &StaffInput,
        uid: Option<&str>,
    ) -> Result<StaffMember, AppError> {
        let mut doc = StaffWrite::from_input(input, uid);
        doc.created_at = Some(Utc::now());

        let created: ProfileDocument = match uid {
            Some(uid) => self
                .connection()?
                .fluent()
                .update()
                .in_col(collections::STAFF)
                .document_id(uid)
                .object(&doc)
                .execute()
                .await
                .map_err(store_error)?,
            None => self
                .connection()?
                .fluent()
                .insert()
                .into(collections::STAFF)
                .generate_document_id()
                .object(&doc)
                .execute()
                .await
                .map_err(store_error)?,
        };

        Ok(staff_from_document(&created, uid.unwrap_or_default()))
    }

    async fn update_staff(
        &self,
        id: &str,
        input: &StaffInput,
    ) -> Result<Option<StaffMember>, AppError> {
        if DirectoryStore::get_staff(self, id).await?.is_none() {
            return Ok(None);
        }

        let doc = StaffWrite::from_input(input, None);
        let updated: ProfileDocument = self
            .connection()?
            .fluent()
            .update()
            .fields(["displayName", "email", "emailLower", "role"])
            .in_col(collections::STAFF)
            .document_id(id)
            .object(&doc)
            .execute()
            .await
            .map_err(store_error)?;

        Ok(Some(staff_from_document(&updated, id)))
    }

    async fn delete_staff(&self, id: &str) -> Result<(), AppError> {
        self.connection()?
            .fluent()
            .delete()
            .from(collections::STAFF)
            .document_id(id)
            .execute()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn find_pending_account(
        &self,
        email: &str,
    ) -> Result<Option<PendingAccount>, AppError> {
        let email = email.trim();
        let lower = email.to_lowercase();

        let mut candidates = self.query_staff(ProfileField::EmailLower, &lower).await?;
        candidates.extend(self.query_staff(ProfileField::Email, &lower).await?);
        if email != lower {
            candidates.extend(self.query_staff(ProfileField::Email, email).await?);
        }

        Ok(candidates
            .iter()
            .find_map(|d| pending_from_document(d, &lower)))
    }

    async fn link_account(&self, staff_id: &str, uid: &str, email: &str) -> Result<(), AppError> {
        let link = AccountLink {
            uid: uid.to_string(),
            email_lower: email.trim().to_lowercase(),
        };

        // Secrets are in the mask but not the object, so they are removed.
        let _: ProfileDocument = self
            .connection()?
            .fluent()
            .update()
            .fields(["uid", "emailLower", "seedPassword", "dni"])
            .in_col(collections::STAFF)
            .document_id(staff_id)
            .object(&link)
            .execute()
            .await
            .map_err(store_error)?;

        tracing::info!(staff_id, uid, "Staff row linked to account");
        Ok(())
    }
}
