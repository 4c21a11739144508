// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod identity;
pub mod images;
pub mod resolver;
pub mod session;

pub use accounts::AccountService;
pub use identity::{FirebaseAuth, IdentityProvider};
pub use images::{ImageHost, ImageUpload, UploadProgress};
pub use resolver::ProfileResolver;
pub use session::{SessionMachine, Subscription};
