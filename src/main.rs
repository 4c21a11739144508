// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Barber-Directory API Server
//!
//! Hosts the shop's session and client directory for the web front end.
//! Runs against Firebase Auth and Firestore when configured, otherwise in
//! demo mode with an in-memory store.

use barber_directory::{
    config::Config,
    db::{DemoStore, FirestoreDb},
    services::{FirebaseAuth, IdentityProvider},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        demo_mode = config.demo_mode(),
        images = config.cloudinary.is_some(),
        "Starting Barber-Directory API"
    );

    let demo = Arc::new(DemoStore::new());
    let state = match config.firebase.clone() {
        Some(firebase) => {
            let db = Arc::new(FirestoreDb::new(&firebase.project_id).await?);
            let provider: Arc<dyn IdentityProvider> = Arc::new(FirebaseAuth::new(
                firebase.api_key,
                firebase.auth_emulator_host.as_deref(),
            ));
            AppState::new(config.clone(), Some(provider), db.clone(), db, demo)
        }
        None => AppState::new(config.clone(), None, demo.clone(), demo.clone(), demo),
    };
    let state = Arc::new(state);

    // Follow the identity provider for the lifetime of the server
    let _subscription = state.session.start();

    // Build router
    let app = barber_directory::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("barber_directory=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
