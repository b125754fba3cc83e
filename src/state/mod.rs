//! Shared application state.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    auth::TokenConfig, config::AppConfig, dao::mongodb::MongoManager, error::ServiceError,
};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: configuration, token verification, and the
/// storage handle. The server starts in degraded mode until a storage
/// backend is installed by the supervisor.
pub struct AppState {
    config: AppConfig,
    tokens: TokenConfig,
    admin_token: Option<String>,
    mongo: RwLock<Option<MongoManager>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be
    /// cloned cheaply.
    pub fn new(
        config: AppConfig,
        tokens: TokenConfig,
        admin_token: Option<String>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            tokens,
            admin_token,
            mongo: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Bearer-token verification configuration.
    pub fn tokens(&self) -> &TokenConfig {
        &self.tokens
    }

    /// Shared admin token, when admin endpoints are enabled.
    pub fn admin_token(&self) -> Option<&str> {
        self.admin_token.as_deref()
    }

    /// Obtain a handle to the current storage backend, if one is installed.
    pub async fn mongo(&self) -> Option<MongoManager> {
        let guard = self.mongo.read().await;
        guard.clone()
    }

    /// Obtain the storage backend or fail with the degraded-mode error.
    pub async fn require_mongo(&self) -> Result<MongoManager, ServiceError> {
        self.mongo().await.ok_or(ServiceError::Degraded)
    }

    /// Install a connected storage backend and leave degraded mode.
    pub async fn install_mongo(&self, manager: MongoManager) {
        {
            let mut guard = self.mongo.write().await;
            *guard = Some(manager);
        }
        self.update_degraded(false).await;
    }

    /// Drop the storage backend and enter degraded mode.
    pub async fn clear_mongo(&self) {
        {
            let mut guard = self.mongo.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.mongo.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        let _ = self.degraded.send(value);
    }
}
