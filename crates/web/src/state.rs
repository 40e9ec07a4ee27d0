//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tower_sessions::cookie::time::Duration;
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::WebConfig;
use crate::db::{
    FavoriteRepository, MemoryFavoriteRepository, MemoryUserRepository, PgFavoriteRepository,
    PgUserRepository, UserRepository,
};
use crate::services::account::AccountFlow;
use crate::services::auth::UserStore;
use crate::services::favorites::FavoritesRegistry;
use crate::services::session::SessionManager;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repositories, the session manager and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: Option<PgPool>,
    users: Arc<dyn UserRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    sessions: SessionManager,
}

impl AppState {
    /// Create state backed by `PostgreSQL`.
    ///
    /// Sessions are stored in `tower_sessions.session` through
    /// `tower-sessions-sqlx-store`.
    #[must_use]
    pub fn new(config: WebConfig, pool: PgPool) -> Self {
        let sessions = SessionManager::new(
            Arc::new(PostgresStore::new(pool.clone())),
            session_ttl(&config),
        );

        Self {
            inner: Arc::new(AppStateInner {
                users: Arc::new(PgUserRepository::new(pool.clone())),
                favorites: Arc::new(PgFavoriteRepository::new(pool.clone())),
                pool: Some(pool),
                sessions,
                config,
            }),
        }
    }

    /// Create state backed by process-local memory.
    ///
    /// Everything is lost on restart. Used by tests and local demos. Sessions
    /// are capped at `memory_session_capacity` and expire on their own.
    #[must_use]
    pub fn in_memory(config: WebConfig) -> Self {
        let sessions =
            SessionManager::in_memory(session_ttl(&config), config.memory_session_capacity);

        Self {
            inner: Arc::new(AppStateInner {
                users: Arc::new(MemoryUserRepository::new()),
                favorites: Arc::new(MemoryFavoriteRepository::new()),
                pool: None,
                sessions,
                config,
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// The database pool, when running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get a reference to the session manager.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    /// User store over the configured repository.
    #[must_use]
    pub fn user_store(&self) -> UserStore<'_> {
        UserStore::new(self.inner.users.as_ref())
    }

    /// Favorites registry over the configured repository.
    #[must_use]
    pub fn favorites_registry(&self) -> FavoritesRegistry<'_> {
        FavoritesRegistry::new(self.inner.favorites.as_ref())
    }

    /// Account flow controller.
    #[must_use]
    pub fn account_flow(&self) -> AccountFlow<'_> {
        AccountFlow::new(self.user_store(), &self.inner.sessions)
    }
}

fn session_ttl(config: &WebConfig) -> Duration {
    Duration::seconds(config.session_ttl_seconds)
}
