// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Auth REST client against a mock Identity Toolkit server.

use barber_directory::error::AuthError;
use barber_directory::services::{FirebaseAuth, IdentityProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn auth_for(server: &MockServer) -> FirebaseAuth {
    FirebaseAuth::new("test-key", None).with_base_url(server.uri())
}

#[tokio::test]
async fn test_sign_in_publishes_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "email": "ana@barberia.dev",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "u1",
            "email": "ana@barberia.dev",
            "displayName": "",
            "idToken": "token-1",
            "registered": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth_for(&server).await;
    let rx = auth.subscribe();
    assert!(rx.borrow().is_none());

    let identity = auth.sign_in(" ana@barberia.dev ", "secret1").await.unwrap();
    assert_eq!(identity.uid, "u1");
    assert_eq!(identity.display_name, None);
    assert_eq!(rx.borrow().as_ref().map(|i| i.uid.clone()), Some("u1".to_string()));

    auth.sign_out().await.unwrap();
    assert!(rx.borrow().is_none());
}

#[tokio::test]
async fn test_error_codes_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .mount(&server)
        .await;

    let auth = auth_for(&server).await;
    let err = auth.sign_in("ana@barberia.dev", "x").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
    assert!(auth.subscribe().borrow().is_none());
}

#[tokio::test]
async fn test_unparsable_error_is_generic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let auth = auth_for(&server).await;
    let err = auth.send_password_reset("ana@barberia.dev").await.unwrap_err();
    assert!(matches!(err, AuthError::Provider(_)));
    assert_eq!(
        err.user_message(),
        "Could not sign in. Check your email and password."
    );
}

#[tokio::test]
async fn test_create_account_sets_display_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "new-uid",
            "email": "nico@barberia.dev",
            "idToken": "token-new"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .and(body_partial_json(json!({
            "idToken": "token-new",
            "displayName": "Nico"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "localId": "new-uid" })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth_for(&server).await;
    let identity = auth
        .create_account("nico@barberia.dev", "secret1", Some("Nico"))
        .await
        .unwrap();

    assert_eq!(identity.uid, "new-uid");
    assert_eq!(identity.display_name.as_deref(), Some("Nico"));
    // Creating an account does not sign anyone in
    assert!(auth.subscribe().borrow().is_none());
}

#[tokio::test]
async fn test_email_exists_on_sign_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "EMAIL_EXISTS" }
        })))
        .mount(&server)
        .await;

    let auth = auth_for(&server).await;
    let err = auth
        .create_account("nico@barberia.dev", "secret1", None)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::EmailAlreadyInUse);
}

#[tokio::test]
async fn test_password_reset_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:sendOobCode"))
        .and(body_partial_json(json!({
            "requestType": "PASSWORD_RESET",
            "email": "ana@barberia.dev"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "ana@barberia.dev" })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = auth_for(&server).await;
    auth.send_password_reset("ana@barberia.dev").await.unwrap();
}

#[tokio::test]
async fn test_update_display_name_requires_sign_in() {
    let server = MockServer::start().await;
    let auth = auth_for(&server).await;
    let err = auth.update_display_name("Ana").await.unwrap_err();
    assert_eq!(err, AuthError::NotSignedIn);
}
