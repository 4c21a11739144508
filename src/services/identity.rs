// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider: sign-in, sign-out and account management.
//!
//! [`FirebaseAuth`] talks to the Identity Toolkit REST API (or the Auth
//! emulator). The signed-in user is published on a `watch` channel, which
//! is what the session machine subscribes to.

use crate::error::AuthError;
use crate::models::Identity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

/// External identity provider consumed by the session machine.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current user, updated on every sign-in and sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Create an account. Does not change the signed-in user.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError>;

    /// Set the display name of the signed-in user.
    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError>;
}

/// Signed-in user plus the token needed for account updates.
struct SignedIn {
    identity: Identity,
    id_token: String,
}

/// Firebase Auth over the Identity Toolkit REST API.
pub struct FirebaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    current: watch::Sender<Option<Identity>>,
    signed_in: Mutex<Option<SignedIn>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

/// Response of `signInWithPassword` and `signUp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl AccountResponse {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.local_id.clone(),
            email: self.email.clone().filter(|e| !e.is_empty()),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    /// Create a client for the given web API key.
    ///
    /// With `emulator_host` (`host:port`) requests go to the Auth emulator.
    pub fn new(api_key: impl Into<String>, emulator_host: Option<&str>) -> Self {
        let base_url = match emulator_host {
            Some(host) => {
                tracing::info!(host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com", host)
            }
            None => "https://identitytoolkit.googleapis.com".to_string(),
        };
        let (current, _) = watch::channel(None);

        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
            current,
            signed_in: Mutex::new(None),
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1/accounts:{}?key={}", self.base_url, method, self.api_key)
    }

    async fn post<B: Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self
            .http
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AuthError::Provider(format!("Unexpected response: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => {
                tracing::debug!(method, code = %envelope.error.message, "Auth request rejected");
                Err(AuthError::from_code(&envelope.error.message))
            }
            Err(_) => Err(AuthError::Provider(format!("HTTP {}", status))),
        }
    }

    async fn set_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .post(
                "update",
                &UpdateRequest {
                    id_token,
                    display_name,
                    return_secure_token: false,
                },
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account: AccountResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email: email.trim(),
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let identity = account.identity();
        *self.signed_in.lock().await = Some(SignedIn {
            identity: identity.clone(),
            id_token: account.id_token.unwrap_or_default(),
        });
        self.current.send_replace(Some(identity.clone()));

        tracing::info!(uid = %identity.uid, "Signed in");
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = self.signed_in.lock().await.take();
        self.current.send_replace(None);
        if let Some(previous) = previous {
            tracing::info!(uid = %previous.identity.uid, "Signed out");
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .post(
                "sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email: email.trim(),
                },
            )
            .await?;
        Ok(())
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let account: AccountResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email: email.trim(),
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        let mut identity = account.identity();
        if let (Some(name), Some(token)) = (display_name, account.id_token.as_deref()) {
            self.set_display_name(token, name).await?;
            identity.display_name = Some(name.to_string());
        }

        tracing::info!(uid = %identity.uid, "Account created");
        Ok(identity)
    }

    async fn update_display_name(&self, display_name: &str) -> Result<(), AuthError> {
        let mut guard = self.signed_in.lock().await;
        let signed_in = guard.as_mut().ok_or(AuthError::NotSignedIn)?;
        self.set_display_name(&signed_in.id_token, display_name)
            .await?;

        signed_in.identity.display_name = Some(display_name.to_string());
        self.current
            .send_replace(Some(signed_in.identity.clone()));
        Ok(())
    }
}
