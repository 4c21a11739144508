// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use barber_directory::error::{AppError, AuthError};

#[test]
fn test_permission_messages_are_classified() {
    for message in [
        "permission-denied: Missing or insufficient permissions.",
        "Database general error occurred: PermissionDenied",
        "MISSING_PERMISSION",
        "status: PERMISSION_DENIED",
    ] {
        let err = AppError::from_store_message(message);
        assert!(err.is_permission_denied(), "{message}");
    }
}

#[test]
fn test_other_store_messages_are_database_errors() {
    let err = AppError::from_store_message("deadline exceeded");
    assert!(!err.is_permission_denied());
    assert!(matches!(err, AppError::Database(_)));

    assert!(!AppError::NotFound("x".to_string()).is_permission_denied());
}

#[test]
fn test_auth_codes_rest_and_sdk_styles() {
    assert_eq!(AuthError::from_code("EMAIL_NOT_FOUND"), AuthError::UserNotFound);
    assert_eq!(AuthError::from_code("auth/user-not-found"), AuthError::UserNotFound);
    assert_eq!(AuthError::from_code("INVALID_PASSWORD"), AuthError::WrongPassword);
    assert_eq!(
        AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
        AuthError::InvalidCredential
    );
    assert_eq!(AuthError::from_code("auth/user-disabled"), AuthError::UserDisabled);
    assert_eq!(
        AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
        AuthError::TooManyRequests
    );
    assert_eq!(
        AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
        AuthError::WeakPassword
    );
    assert_eq!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailAlreadyInUse);
}

#[test]
fn test_unknown_code_gets_generic_message() {
    let err = AuthError::from_code("auth/quota-exceeded");
    assert_eq!(err, AuthError::Provider("auth/quota-exceeded".to_string()));
    assert_eq!(
        err.user_message(),
        "Could not sign in. Check your email and password."
    );
}

#[test]
fn test_provisioning_candidates() {
    assert!(AuthError::UserNotFound.may_need_provisioning());
    assert!(AuthError::InvalidCredential.may_need_provisioning());
    assert!(!AuthError::WrongPassword.may_need_provisioning());
}
