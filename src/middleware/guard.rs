// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard: admit or redirect requests based on the session.

use crate::models::{Role, SessionView};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated requests without the required role are sent.
pub const LANDING_PATH: &str = "/clientes";

/// Seconds a client should wait while the session is still loading.
const RETRY_AFTER_SECS: &str = "1";

/// Outcome of the guard for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity not known yet; no decision
    Pending,
    RedirectToLogin,
    RedirectToLanding,
    Admit,
}

/// Decide what to do with a request. An empty `allowed_roles` admits any
/// authenticated user.
pub fn decide(view: &SessionView, allowed_roles: &[Role]) -> GuardDecision {
    if view.loading {
        return GuardDecision::Pending;
    }
    if view.user.is_none() {
        return GuardDecision::RedirectToLogin;
    }
    if allowed_roles.is_empty() {
        return GuardDecision::Admit;
    }
    match view.role {
        Some(role) if allowed_roles.contains(&role) => GuardDecision::Admit,
        _ => GuardDecision::RedirectToLanding,
    }
}

async fn guard(state: &AppState, allowed_roles: &[Role], mut request: Request, next: Next) -> Response {
    let view = state.session.current();
    match decide(&view, allowed_roles) {
        GuardDecision::Pending => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
        )
            .into_response(),
        GuardDecision::RedirectToLogin => Redirect::temporary(LOGIN_PATH).into_response(),
        GuardDecision::RedirectToLanding => Redirect::temporary(LANDING_PATH).into_response(),
        GuardDecision::Admit => {
            request.extensions_mut().insert(view);
            next.run(request).await
        }
    }
}

/// Middleware admitting any authenticated session.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    guard(&state, &[], request, next).await
}

/// Middleware admitting admins only.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    guard(&state, &[Role::Admin], request, next).await
}
