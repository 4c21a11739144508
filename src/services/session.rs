// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session state machine.
//!
//! Follows the identity provider's current-user channel, resolves each
//! signed-in user's profile and publishes a [`SessionView`] on a `watch`
//! channel.
//!
//! Every state change bumps an epoch counter. A profile resolution records
//! the epoch it started in and is only applied if no newer change (another
//! user, a sign-out, a demo login, an unsubscribe) happened meanwhile, so a
//! slow lookup can never overwrite a newer session.

use crate::db::demo::DemoAccount;
use crate::db::DemoStore;
use crate::error::AuthError;
use crate::models::{Identity, ResolvedProfile, Role, SessionView};
use crate::services::identity::IdentityProvider;
use crate::services::resolver::ProfileResolver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Inner {
    provider: Option<Arc<dyn IdentityProvider>>,
    resolver: ProfileResolver,
    demo: Arc<DemoStore>,
    fallback_admin_email: String,
    state: watch::Sender<SessionView>,
    epoch: AtomicU64,
}

/// Drives the session from identity notifications.
#[derive(Clone)]
pub struct SessionMachine {
    inner: Arc<Inner>,
}

/// Handle for an active identity subscription.
///
/// Dropping it (or calling [`Subscription::unsubscribe`]) stops listening
/// and discards any profile resolution still in flight.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
    inner: Arc<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.inner.invalidate();
    }
}

impl SessionMachine {
    /// Create a session machine. Without a provider it runs in demo mode.
    pub fn new(
        provider: Option<Arc<dyn IdentityProvider>>,
        resolver: ProfileResolver,
        demo: Arc<DemoStore>,
        fallback_admin_email: &str,
    ) -> Self {
        let demo_mode = provider.is_none();
        let (state, _) = watch::channel(SessionView::uninitialized(demo_mode));

        Self {
            inner: Arc::new(Inner {
                provider,
                resolver,
                demo,
                fallback_admin_email: fallback_admin_email.trim().to_lowercase(),
                state,
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Start following the identity provider.
    ///
    /// In demo mode the session settles immediately as anonymous.
    pub fn start(&self) -> Subscription {
        let Some(provider) = self.inner.provider.clone() else {
            self.inner.publish(SessionView::anonymous(true));
            tracing::info!("No identity provider configured, running in demo mode");
            return Subscription {
                task: None,
                inner: self.inner.clone(),
            };
        };

        let inner = self.inner.clone();
        let mut identities = provider.subscribe();
        let task = tokio::spawn(async move {
            loop {
                let current = identities.borrow_and_update().clone();
                inner.clone().handle_identity(current);
                if identities.changed().await.is_err() {
                    tracing::debug!("Identity provider channel closed");
                    break;
                }
            }
        });

        Subscription {
            task: Some(task),
            inner: self.inner.clone(),
        }
    }

    pub fn current(&self) -> SessionView {
        self.inner.state.borrow().clone()
    }

    /// Current epoch. Pass it to [`SessionMachine::wait_for_user`] to wait
    /// only for changes that happen after this point.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.inner.state.subscribe()
    }

    pub fn demo_mode(&self) -> bool {
        self.inner.provider.is_none()
    }

    /// Accounts offered for demo login. Empty outside demo mode.
    pub fn demo_accounts(&self) -> Vec<DemoAccount> {
        if self.demo_mode() {
            self.inner.demo.list_accounts()
        } else {
            Vec::new()
        }
    }

    pub fn provider(&self) -> Result<&Arc<dyn IdentityProvider>, AuthError> {
        self.inner.provider.as_ref().ok_or(AuthError::NotConfigured)
    }

    /// Switch to a demo account, bypassing the resolver.
    ///
    /// Returns `None`, leaving the session untouched, outside demo mode or
    /// for an unknown account.
    pub fn login_demo(&self, id: &str) -> Option<SessionView> {
        if !self.demo_mode() {
            return None;
        }
        let account = self.inner.demo.get_account(id)?;

        let view = SessionView::authenticated(
            account.identity(),
            account.role,
            Some(account.display_name.clone()),
            true,
        );
        self.inner.publish(view.clone());
        tracing::info!(account = id, role = %account.role, "Demo login");
        Some(view)
    }

    /// Sign out and reset to anonymous.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.inner.publish(SessionView::anonymous(self.demo_mode()));

        if let Some(provider) = &self.inner.provider {
            provider.sign_out().await?;
        }
        tracing::info!("Logged out");
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.provider()?.sign_in(email, password).await
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.provider()?.send_password_reset(email).await
    }

    /// Wait until the session has settled for `uid` in an epoch later than
    /// `since`, at most `timeout`.
    ///
    /// Taking `since` before signing in keeps a view settled earlier for
    /// the same uid from being mistaken for the new one.
    ///
    /// Returns whatever the session looks like at that point.
    pub async fn wait_for_user(&self, uid: &str, since: u64, timeout: Duration) -> SessionView {
        let mut rx = self.watch();
        let inner = &self.inner;
        let settled = tokio::time::timeout(
            timeout,
            rx.wait_for(|view| {
                inner.epoch.load(Ordering::SeqCst) > since
                    && !view.loading
                    && view.uid() == Some(uid)
            }),
        )
        .await;

        match settled {
            Ok(Ok(view)) => view.clone(),
            _ => {
                tracing::warn!(uid, "Session did not settle in time");
                self.current()
            }
        }
    }
}

impl Inner {
    /// Start a new epoch and replace the view.
    ///
    /// The bump happens under the channel's write lock, so a reader never
    /// sees the new epoch next to the old view.
    fn publish(&self, view: SessionView) -> u64 {
        let mut epoch = 0;
        self.state.send_modify(|current| {
            epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            *current = view;
        });
        epoch
    }

    /// Start a new epoch without touching the view, discarding any
    /// resolution in flight.
    fn invalidate(&self) {
        self.state.send_if_modified(|_| {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            false
        });
    }

    /// Apply `view` only if nothing happened since `epoch`.
    fn apply(&self, epoch: u64, view: SessionView) -> bool {
        self.state.send_if_modified(|current| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *current = view;
            true
        })
    }

    fn handle_identity(self: Arc<Self>, identity: Option<Identity>) {
        let Some(user) = identity else {
            self.publish(SessionView::anonymous(false));
            tracing::debug!("No current user");
            return;
        };

        tracing::debug!(uid = %user.uid, "Resolving profile");
        let epoch = self.publish(SessionView::resolving(user.clone()));

        tokio::spawn(async move {
            let email = user.normalized_email();
            let resolved = match self.resolver.resolve(&user.uid, email.as_deref()).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::error!(uid = %user.uid, error = %e, "Profile resolution failed");
                    ResolvedProfile::default()
                }
            };

            let view = self.settle(user, resolved);
            let uid = view.uid().unwrap_or_default().to_string();
            let role = view.role;
            if self.apply(epoch, view) {
                tracing::info!(uid = %uid, role = ?role, "Session authenticated");
            } else {
                tracing::debug!(uid = %uid, "Discarding stale profile resolution");
            }
        });
    }

    fn fallback_role(&self, user: &Identity) -> Role {
        match user.normalized_email() {
            Some(email) if email == self.fallback_admin_email => Role::Admin,
            _ => Role::Barbero,
        }
    }

    fn settle(&self, user: Identity, resolved: ResolvedProfile) -> SessionView {
        let role = resolved.role.unwrap_or_else(|| self.fallback_role(&user));
        let name = resolved
            .display_name
            .or_else(|| user.display_name.clone())
            .or_else(|| user.email.clone());
        SessionView::authenticated(user, role, name, false)
    }
}
