use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::auth::{SecretHasher, SessionResolver};
use crate::config::SecurityConfig;
use crate::db::{AccountStore, AppStore, CredentialStore, SessionStore, SqlitePool};
use crate::handlers::{accounts, apps, session, vault};

const BODY_LIMIT: usize = 64 * 1024;

/// Shared handler state; every field is a cheap clone over one pool.
#[derive(Clone)]
pub struct LockboxState {
    pub accounts: AccountStore,
    pub vault: CredentialStore,
    pub apps: AppStore,
    pub sessions: SessionStore,
    pub resolver: SessionResolver,
    pub session_ttl: chrono::Duration,
    pub insecure_cookie: bool,
}

impl LockboxState {
    pub fn new(pool: SqlitePool, hasher: SecretHasher, security: &SecurityConfig) -> Self {
        let sessions = SessionStore::new(pool.clone());
        Self {
            accounts: AccountStore::new(pool.clone(), hasher),
            vault: CredentialStore::new(pool.clone()),
            apps: AppStore::new(pool),
            resolver: SessionResolver::new(sessions.clone()),
            sessions,
            session_ttl: security.session_ttl(),
            insecure_cookie: security.insecure_cookie,
        }
    }
}

pub fn lockbox_router(state: LockboxState) -> Router {
    Router::new()
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
        .route("/auth/me", get(session::me))
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/accounts/{id}",
            put(accounts::update_account).delete(accounts::delete_account),
        )
        .route("/vault", get(vault::list_entries).post(vault::create_entry))
        .route(
            "/vault/{id}",
            get(vault::get_entry)
                .patch(vault::update_entry)
                .delete(vault::delete_entry),
        )
        .route("/apps", get(apps::list_apps).post(apps::create_app))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
