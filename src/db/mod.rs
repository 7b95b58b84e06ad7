//! Database module: schema, row models and the stores built on them.
//!
//! Layout:
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool setup, migration and timestamp encoding
//! - `models.rs`: raw row structs and their conversion into domain types
//! - `accounts.rs`, `vault.rs`, `apps.rs`, `sessions.rs`: one store per table

pub mod accounts;
pub(crate) mod models;
pub mod apps;
pub mod schema;
pub mod sessions;
pub mod sqlite;
pub mod vault;

pub use accounts::AccountStore;
pub use apps::AppStore;
pub use schema::SQLITE_INIT;
pub use sessions::{IssuedSession, SessionStore};
pub use sqlite::{SqlitePool, init_schema, open};
pub use vault::CredentialStore;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::hasher::cheap_hasher;

    pub(crate) struct Stores {
        pub accounts: AccountStore,
        pub vault: CredentialStore,
        pub apps: AppStore,
        pub sessions: SessionStore,
    }

    pub(crate) async fn memory_stores() -> Stores {
        let pool = open("sqlite::memory:").await.expect("open in-memory db");
        Stores {
            accounts: AccountStore::new(pool.clone(), cheap_hasher()),
            vault: CredentialStore::new(pool.clone()),
            apps: AppStore::new(pool.clone()),
            sessions: SessionStore::new(pool),
        }
    }
}
