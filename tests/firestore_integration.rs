// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at it.
//!
//! Every test uses unique ids so runs against a shared emulator don't
//! interfere with each other.

use barber_directory::db::{DirectoryStore, ProfileStore};
use barber_directory::models::{
    ClientUpdate, NewClient, NewPhoto, NoteOption, ProfileCollection, ProfileField, Role,
    StaffInput,
};

mod common;
use common::test_db;

fn unique_suffix() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

fn new_client(name: &str) -> NewClient {
    NewClient {
        full_name: name.to_string(),
        phone: Some("600 123 123".to_string()),
        main_barber_id: Some("barber-1".to_string()),
        notes: vec![NoteOption::Corte],
    }
}

fn staff_input(name: &str, email: &str) -> StaffInput {
    StaffInput {
        display_name: name.to_string(),
        email: email.to_string(),
        role: Role::Barbero,
        password: None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CLIENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_client_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let name = format!("Cliente {}", unique_suffix());

    let created = db.create_client(new_client(&name)).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.full_name, name);
    assert!(created.created_at.is_some());

    let fetched = DirectoryStore::get_client(&db, &created.id)
        .await
        .unwrap()
        .expect("client exists");
    assert_eq!(fetched.phone.as_deref(), Some("600 123 123"));
    assert_eq!(fetched.main_barber_id, "barber-1");
    assert_eq!(fetched.notes, vec![NoteOption::Corte]);

    // A missing phone removes the stored one
    let updated = db
        .update_client(
            &created.id,
            ClientUpdate {
                full_name: format!("{} editado", name),
                phone: None,
                notes: vec![NoteOption::Lavado, NoteOption::Lavado],
            },
        )
        .await
        .unwrap()
        .expect("client still exists");
    assert!(updated.phone.is_none());
    assert_eq!(updated.notes, vec![NoteOption::Lavado]);
    assert_eq!(updated.main_barber_id, "barber-1");

    let listed = db.list_clients().await.unwrap();
    assert!(listed.iter().any(|c| c.id == created.id));

    db.delete_client(&created.id).await.unwrap();
    assert!(DirectoryStore::get_client(&db, &created.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_update_missing_client_is_none() {
    require_emulator!();

    let db = test_db().await;
    let result = db
        .update_client(
            &format!("missing-{}", unique_suffix()),
            ClientUpdate {
                full_name: "Nadie".to_string(),
                phone: None,
                notes: vec![],
            },
        )
        .await
        .unwrap();
    assert!(result.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// PHOTO TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_photo_add_list_remove() {
    require_emulator!();

    let db = test_db().await;
    let client_id = format!("client-{}", unique_suffix());

    let first = db
        .add_photo(
            &client_id,
            NewPhoto {
                url: "https://img.example/first.jpg".to_string(),
                delete_token: Some("tok-1".to_string()),
                barber_id: Some("barber-1".to_string()),
            },
        )
        .await
        .unwrap();
    let second = db
        .add_photo(
            &client_id,
            NewPhoto {
                url: "https://img.example/second.jpg".to_string(),
                delete_token: None,
                barber_id: Some("barber-2".to_string()),
            },
        )
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.client_id, client_id);

    let photos = db.list_photos(&client_id).await.unwrap();
    assert_eq!(photos.len(), 2);

    let fetched = db
        .get_photo(&client_id, &first.id)
        .await
        .unwrap()
        .expect("photo exists");
    assert_eq!(fetched.delete_token.as_deref(), Some("tok-1"));
    assert_eq!(fetched.barber_id.as_deref(), Some("barber-1"));

    // Photos of one client are invisible through another
    assert!(db.get_photo("someone-else", &first.id).await.unwrap().is_none());

    db.remove_photo(&client_id, &first.id).await.unwrap();
    let photos = db.list_photos(&client_id).await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].url, "https://img.example/second.jpg");

    let err = db.remove_photo(&client_id, &first.id).await.unwrap_err();
    assert!(matches!(
        err,
        barber_directory::error::AppError::NotFound(_)
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// STAFF AND PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_staff_row_is_resolvable_profile() {
    require_emulator!();

    let db = test_db().await;
    let uid = format!("uid-{}", unique_suffix());
    let email = format!("{}@Barberia.dev", uid);

    let created = db
        .create_staff(&staff_input("Ana Diaz", &email), Some(&uid))
        .await
        .unwrap();
    assert_eq!(created.id, uid);
    assert_eq!(created.role, Some(Role::Barbero));

    let by_id = db
        .get_profile(ProfileCollection::Staff, &uid)
        .await
        .unwrap()
        .expect("profile exists");
    assert_eq!(by_id.role, Some(Role::Barbero));
    assert_eq!(by_id.display_name.as_deref(), Some("Ana Diaz"));

    let by_email = db
        .find_profiles(
            ProfileCollection::Staff,
            ProfileField::EmailLower,
            &email.to_lowercase(),
            5,
        )
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].id, uid);

    let by_uid = db
        .find_profiles(ProfileCollection::Staff, ProfileField::Uid, &uid, 5)
        .await
        .unwrap();
    assert_eq!(by_uid.len(), 1);

    // Linked rows carry no first-login secrets
    assert!(db.find_pending_account(&email).await.unwrap().is_none());

    db.delete_staff(&uid).await.unwrap();
    assert!(db
        .get_profile(ProfileCollection::Staff, &uid)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_staff_update_and_link() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let email = format!("nico-{}@barberia.dev", suffix);

    let created = db
        .create_staff(&staff_input("Nico", &email), None)
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert!(created.uid.is_none());

    let mut edit = staff_input("Nicolas", &email);
    edit.role = Role::Admin;
    let updated = db
        .update_staff(&created.id, &edit)
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(updated.display_name.as_deref(), Some("Nicolas"));
    assert_eq!(updated.role, Some(Role::Admin));

    let uid = format!("linked-{}", suffix);
    db.link_account(&created.id, &uid, &email).await.unwrap();
    let linked = db
        .get_staff(&created.id)
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(linked.uid.as_deref(), Some(uid.as_str()));

    let missing = db
        .update_staff(&format!("missing-{}", suffix), &edit)
        .await
        .unwrap();
    assert!(missing.is_none());

    db.delete_staff(&created.id).await.unwrap();
}

#[tokio::test]
async fn test_unknown_profile_is_none() {
    require_emulator!();

    let db = test_db().await;
    let id = format!("ghost-{}", unique_suffix());
    assert!(db
        .get_profile(ProfileCollection::Users, &id)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .find_profiles(ProfileCollection::Users, ProfileField::Uid, &id, 5)
        .await
        .unwrap()
        .is_empty());
}
