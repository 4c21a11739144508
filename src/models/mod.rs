// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod client;
pub mod identity;
pub mod photo;
pub mod profile;
pub mod role;
pub mod session;
pub mod staff;

pub use client::{Client, ClientUpdate, NewClient, NoteOption};
pub use identity::Identity;
pub use photo::{NewPhoto, Photo, UploadedAsset};
pub use profile::{
    ProfileCollection, ProfileDocument, ProfileField, ProfileRecord, ResolvedProfile,
};
pub use role::Role;
pub use session::SessionView;
pub use staff::{PendingAccount, StaffInput, StaffMember};
