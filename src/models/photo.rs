// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cut photos attached to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of photos returned for a client.
pub const PHOTO_PAGE_SIZE: usize = 12;

/// A hosted photo linked to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Stable key within the client (`<cut id>-<url digest>` for stored cuts)
    pub id: String,
    pub client_id: String,
    pub url: String,
    /// Token allowing the hosted image to be deleted without credentials
    pub delete_token: Option<String>,
    /// Staff member who uploaded the photo
    pub barber_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A freshly uploaded photo to record against a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub url: String,
    pub delete_token: Option<String>,
    pub barber_id: Option<String>,
}

/// Result of uploading an image to the image host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedAsset {
    pub url: String,
    pub delete_token: Option<String>,
}

/// Sort newest first and keep one page.
pub fn newest_page(mut photos: Vec<Photo>) -> Vec<Photo> {
    photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    photos.truncate(PHOTO_PAGE_SIZE);
    photos
}
