// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Staff administration routes (admins only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{Role, StaffInput, StaffMember};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/usuarios", get(list_staff).post(create_staff))
        .route(
            "/admin/usuarios/{id}",
            get(get_staff).put(update_staff).delete(delete_staff),
        )
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Staff ordered by name, optionally filtered by name/email substring.
async fn list_staff(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<StaffMember>>> {
    let mut staff = state.directory.list_staff().await?;
    if let Some(term) = params.q.as_deref() {
        staff.retain(|m| m.matches(term));
    }
    staff.sort_by_key(|m| m.label().to_lowercase());
    Ok(Json(staff))
}

async fn create_staff(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StaffInput>,
) -> Result<(StatusCode, Json<StaffMember>)> {
    let member = state.accounts.register_staff(body).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn get_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StaffMember>> {
    state
        .directory
        .get_staff(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Staff {}", id)))
}

async fn update_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StaffInput>,
) -> Result<Json<StaffMember>> {
    let input = body.normalized();
    input.validate()?;

    state
        .directory
        .update_staff(&id, &input)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Staff {}", id)))
}

/// Only barber rows can be deleted.
async fn delete_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let member = state
        .directory
        .get_staff(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Staff {}", id)))?;

    if member.role != Some(Role::Barbero) {
        return Err(AppError::BadRequest(
            "Only barber accounts can be deleted".to_string(),
        ));
    }

    state.directory.delete_staff(&id).await?;
    tracing::info!(staff_id = %id, "Staff member deleted");
    Ok(StatusCode::NO_CONTENT)
}
