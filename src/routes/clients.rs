// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client directory and photo routes (any signed-in staff member).

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::client::notes_search_text;
use crate::models::{Client, ClientUpdate, NewClient, NewPhoto, Photo, SessionView};
use crate::services::{ImageUpload, UploadProgress};
use crate::AppState;

/// Largest accepted photo upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clientes", get(list_clients).post(create_client))
        .route(
            "/clientes/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
        .route(
            "/clientes/{id}/fotos",
            get(list_photos)
                .post(upload_photo)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/clientes/{id}/fotos/{photo_id}", delete(delete_photo))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

/// A client with their most recent photos.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientDetail {
    #[serde(flatten)]
    client: Client,
    photos: Vec<Photo>,
}

fn matches_search(client: &Client, term: &str) -> bool {
    let haystack = format!(
        "{} {} {}",
        client.full_name,
        client.phone.as_deref().unwrap_or(""),
        notes_search_text(&client.notes)
    )
    .to_lowercase();
    haystack.contains(term)
}

async fn list_clients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<Client>>> {
    let clients = state.directory.list_clients().await?;
    let term = params
        .q
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    Ok(Json(match term {
        Some(term) => clients
            .into_iter()
            .filter(|c| matches_search(c, &term))
            .collect(),
        None => clients,
    }))
}

async fn create_client(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionView>,
    Json(body): Json<NewClient>,
) -> Result<(StatusCode, Json<Client>)> {
    let mut input = body.normalized();
    input.validate()?;

    if input.main_barber_id.is_none() {
        input.main_barber_id = session
            .uid()
            .map(str::to_string)
            .or_else(|| state.session.demo_accounts().first().map(|a| a.id.clone()));
    }

    let client = state.directory.create_client(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClientDetail>> {
    let client = state
        .directory
        .get_client(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client {}", id)))?;
    let photos = state.directory.list_photos(&id).await?;

    Ok(Json(ClientDetail { client, photos }))
}

async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<ClientUpdate>,
) -> Result<Json<Client>> {
    let update = body.normalized();
    update.validate()?;

    state
        .directory
        .update_client(&id, update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Client {}", id)))
}

async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.directory.delete_client(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_photos(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Photo>>> {
    Ok(Json(state.directory.list_photos(&id).await?))
}

/// Upload the multipart `file` field and record it against the client.
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionView>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Photo>)> {
    if state.directory.get_client(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Client {}", id)));
    }

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("foto.jpg").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read upload: {}", e)))?;
        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let folder = if state.session.demo_mode() {
        "demo".to_string()
    } else {
        format!("clientes/{}", id)
    };
    let client_id = id.clone();
    let progress: UploadProgress = Arc::new(move |sent, total| {
        tracing::trace!(client_id = %client_id, sent, total, "Upload progress");
    });

    let asset = state.images.upload(upload, &folder, Some(progress)).await?;
    let photo = state
        .directory
        .add_photo(
            &id,
            NewPhoto {
                url: asset.url,
                delete_token: asset.delete_token,
                barber_id: session.uid().map(str::to_string),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(photo)))
}

/// Delete the hosted image, then its record.
async fn delete_photo(
    State(state): State<Arc<AppState>>,
    Path((id, photo_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let photo = state
        .directory
        .get_photo(&id, &photo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Photo {}", photo_id)))?;

    if state.images.is_configured() {
        let token = photo.delete_token.as_deref().ok_or_else(|| {
            AppError::BadRequest("This photo has no delete token and cannot be removed".to_string())
        })?;
        state.images.delete(token).await?;
    }

    state.directory.remove_photo(&id, &photo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
