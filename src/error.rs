// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Identity provider errors.
///
/// User-input problems (bad email, wrong password, ...) are recoverable by
/// retrying; [`AuthError::user_message`] gives the inline message to show.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid-email")]
    InvalidEmail,

    #[error("user-not-found")]
    UserNotFound,

    #[error("wrong-password")]
    WrongPassword,

    #[error("invalid-credential")]
    InvalidCredential,

    #[error("user-disabled")]
    UserDisabled,

    #[error("too-many-requests")]
    TooManyRequests,

    #[error("email-already-in-use")]
    EmailAlreadyInUse,

    #[error("weak-password")]
    WeakPassword,

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("identity provider is not configured")]
    NotConfigured,

    #[error("provider error: {0}")]
    Provider(String),

    #[error("network error: {0}")]
    Network(String),
}

impl AuthError {
    /// Map a provider error code to an [`AuthError`].
    ///
    /// Accepts both the REST API codes (`EMAIL_NOT_FOUND`, `INVALID_PASSWORD`,
    /// ...) and the SDK style codes (`auth/user-not-found`). REST codes may
    /// carry a trailing explanation (`WEAK_PASSWORD : Password should be ...`).
    pub fn from_code(code: &str) -> Self {
        let head = code.split(':').next().unwrap_or("").trim();
        let normalized = head
            .trim_start_matches("auth/")
            .to_lowercase()
            .replace('_', "-");

        match normalized.as_str() {
            "invalid-email" => AuthError::InvalidEmail,
            "user-not-found" | "email-not-found" => AuthError::UserNotFound,
            "wrong-password" | "invalid-password" => AuthError::WrongPassword,
            "invalid-credential" | "invalid-login-credentials" => AuthError::InvalidCredential,
            "user-disabled" => AuthError::UserDisabled,
            "too-many-requests" | "too-many-attempts-try-later" => AuthError::TooManyRequests,
            "email-already-in-use" | "email-exists" => AuthError::EmailAlreadyInUse,
            "weak-password" => AuthError::WeakPassword,
            _ => AuthError::Provider(head.to_string()),
        }
    }

    /// Message suitable for showing next to the login form.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidEmail => "The email address is not valid.",
            AuthError::UserNotFound => "No account exists for that email.",
            AuthError::WrongPassword => "Wrong password. Try again.",
            AuthError::InvalidCredential => "Invalid credentials. Check your details.",
            AuthError::UserDisabled => "This account is disabled. Contact the administrator.",
            AuthError::TooManyRequests => {
                "Too many failed attempts. Wait a few minutes and try again."
            }
            AuthError::EmailAlreadyInUse => "That email is already registered.",
            AuthError::WeakPassword => "The password is too weak.",
            AuthError::NotSignedIn => "You are not signed in.",
            AuthError::NotConfigured => "Sign-in is unavailable in demo mode.",
            AuthError::Provider(_) | AuthError::Network(_) => {
                "Could not sign in. Check your email and password."
            }
        }
    }

    /// Failures that may mean the account has not been created yet.
    pub fn may_need_provisioning(&self) -> bool {
        matches!(self, AuthError::UserNotFound | AuthError::InvalidCredential)
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Image host error: {0}")]
    ImageHost(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Document store codes that mean "not allowed to read this".
    const PERMISSION_CODES: [&'static str; 3] =
        ["permission-denied", "missing-permission", "permissiondenied"];

    /// True for store errors caused by access rules rather than a fault.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AppError::PermissionDenied(_))
    }

    /// Classify a raw store error message.
    pub fn from_store_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if Self::is_permission_message(&message) {
            AppError::PermissionDenied(message)
        } else {
            AppError::Database(message)
        }
    }

    fn is_permission_message(message: &str) -> bool {
        let normalized = message.to_lowercase().replace('_', "-");
        Self::PERMISSION_CODES
            .iter()
            .any(|code| normalized.contains(code))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::PermissionDenied(msg) => {
                tracing::warn!(error = %msg, "Permission denied by document store");
                (StatusCode::FORBIDDEN, "permission_denied", None)
            }
            AppError::Auth(err) => {
                let status = match err {
                    AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
                    AuthError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
                    AuthError::Network(_) => StatusCode::BAD_GATEWAY,
                    AuthError::EmailAlreadyInUse => StatusCode::CONFLICT,
                    AuthError::InvalidEmail | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (
                    status,
                    "auth_error",
                    Some(err.user_message().to_string()),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::ImageHost(msg) => {
                tracing::warn!(error = %msg, "Image host error");
                (
                    StatusCode::BAD_GATEWAY,
                    "image_host_error",
                    Some("Could not process the image. Try again.".to_string()),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
