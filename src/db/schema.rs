//! SQL DDL for the vault database.
//! SQLite-first design; every statement is idempotent so it runs on each start.

/// SQLite schema with:
/// - `accounts.login_id` UNIQUE (case-sensitive, BINARY collation)
/// - `vault_entries` UNIQUE(owner_id, label), cascading with the owner
/// - `app_categories` UNIQUE(owner_id, name), cascading with the owner
/// - `sessions` keyed by opaque token, cascading with the account
/// - timestamps as fixed-width RFC3339 UTC text, so text order is time order
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    login_id TEXT NOT NULL UNIQUE,
    secret_hash TEXT NOT NULL,
    display_name TEXT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin', 'super-admin')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_accounts_role ON accounts(role);

CREATE TABLE IF NOT EXISTS vault_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'password'
        CHECK (kind IN ('password', 'webhook', 'api_key', 'token', 'other')),
    username TEXT NULL,
    email TEXT NULL,
    secret TEXT NOT NULL,
    url TEXT NULL,
    notes TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (owner_id, label)
);

CREATE INDEX IF NOT EXISTS idx_vault_entries_owner_updated
    ON vault_entries(owner_id, updated_at);

CREATE TABLE IF NOT EXISTS app_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (owner_id, name)
);

CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    account_id INTEGER NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_account_id ON sessions(account_id);
"#;
