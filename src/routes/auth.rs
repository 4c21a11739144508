// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: login (password or demo account), logout, password
//! reset and the current session view.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::demo::DemoAccount;
use crate::error::{AppError, AuthError, Result};
use crate::models::SessionView;
use crate::AppState;

/// How long a login waits for the session to pick up the new user.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session))
        .route("/login", get(login_info).post(login))
        .route("/login/demo/{id}", post(login_demo))
        .route("/logout", post(logout))
        .route("/password-reset", post(password_reset))
}

/// What the login view needs to render.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginInfo {
    pub demo_mode: bool,
    pub demo_accounts: Vec<DemoAccount>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    email: String,
}

#[derive(Serialize)]
pub struct PasswordResetResponse {
    sent: bool,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(state.session.current())
}

async fn login_info(State(state): State<Arc<AppState>>) -> Json<LoginInfo> {
    Json(LoginInfo {
        demo_mode: state.session.demo_mode(),
        demo_accounts: state.session.demo_accounts(),
    })
}

/// Sign in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionView>> {
    let email = body.email.trim();
    if email.is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let since = state.session.epoch();
    let identity = state.accounts.sign_in(email, &body.password).await?;
    let view = state
        .session
        .wait_for_user(&identity.uid, since, SETTLE_TIMEOUT)
        .await;
    Ok(Json(view))
}

/// Sign in as a demo account (demo mode only).
async fn login_demo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    if !state.session.demo_mode() {
        return Err(AppError::BadRequest(
            "Demo login is only available in demo mode".to_string(),
        ));
    }
    state
        .session
        .login_demo(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Demo account {}", id)))
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<SessionView>> {
    state.session.logout().await?;
    Ok(Json(state.session.current()))
}

async fn password_reset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<Json<PasswordResetResponse>> {
    let email = body.email.trim();
    if email.is_empty() {
        return Err(AuthError::InvalidEmail.into());
    }
    state.session.send_password_reset(email).await?;
    Ok(Json(PasswordResetResponse { sent: true }))
}
