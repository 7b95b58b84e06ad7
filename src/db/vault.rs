use crate::db::models::DbVaultEntry;
use crate::db::sqlite::{SqlitePool, encode_ts, now};
use crate::error::LockboxError;
use crate::types::{AccountId, EntryId, NewVaultEntry, VaultEntry, VaultEntryPatch};
use tracing::{debug, info};

pub const RESOURCE: &str = "vault entry";

/// Per-owner table of stored secrets. Every operation is scoped by owner;
/// a row owned by someone else is reported exactly like a missing row.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: AccountId,
        new: NewVaultEntry,
    ) -> Result<VaultEntry, LockboxError> {
        let ts = encode_ts(now());
        let row: DbVaultEntry = sqlx::query_as(
            r#"INSERT INTO vault_entries
                (owner_id, label, kind, username, email, secret, url, notes, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id, owner_id, label, kind, username, email, secret, url, notes,
                         created_at, updated_at"#,
        )
        .bind(owner_id)
        .bind(new.label)
        .bind(new.kind.as_str())
        .bind(new.username)
        .bind(new.email)
        .bind(new.secret)
        .bind(new.url)
        .bind(new.notes)
        .bind(&ts)
        .bind(&ts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LockboxError::from_unique(e, "label"))?;

        let entry = VaultEntry::try_from(row)?;
        info!(entry_id = entry.id, owner_id, kind = %entry.kind, "vault entry created");
        Ok(entry)
    }

    /// Unscoped lookup, for callers that run the ownership check themselves.
    pub async fn find(&self, id: EntryId) -> Result<Option<VaultEntry>, LockboxError> {
        let row: Option<DbVaultEntry> = sqlx::query_as(
            r#"SELECT id, owner_id, label, kind, username, email, secret, url, notes,
                      created_at, updated_at
               FROM vault_entries WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(VaultEntry::try_from).transpose()?)
    }

    pub async fn get(&self, id: EntryId, owner_id: AccountId) -> Result<VaultEntry, LockboxError> {
        let row: Option<DbVaultEntry> = sqlx::query_as(
            r#"SELECT id, owner_id, label, kind, username, email, secret, url, notes,
                      created_at, updated_at
               FROM vault_entries WHERE id = ? AND owner_id = ?"#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(VaultEntry::try_from(
            row.ok_or(LockboxError::not_found(RESOURCE))?,
        )?)
    }

    /// The owner's entries, most recently updated first, optionally narrowed
    /// to those whose label or username contains `search` (case-insensitive).
    pub async fn list(
        &self,
        owner_id: AccountId,
        search: Option<&str>,
    ) -> Result<Vec<VaultEntry>, LockboxError> {
        let rows: Vec<DbVaultEntry> = sqlx::query_as(
            r#"SELECT id, owner_id, label, kind, username, email, secret, url, notes,
                      created_at, updated_at
               FROM vault_entries WHERE owner_id = ?
               ORDER BY updated_at DESC, id DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let entries = rows
            .into_iter()
            .map(VaultEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|entry| match needle.as_deref() {
                Some(needle) => matches_search(entry, needle),
                None => true,
            })
            .collect::<Vec<_>>();
        debug!(owner_id, count = entries.len(), "listed vault entries");
        Ok(entries)
    }

    /// Apply only the supplied fields and refresh `updated_at`. A label
    /// collision with another of the owner's entries is a `Conflict`.
    pub async fn update(
        &self,
        id: EntryId,
        owner_id: AccountId,
        patch: VaultEntryPatch,
    ) -> Result<VaultEntry, LockboxError> {
        let (set_username, username) = split_nullable(patch.username);
        let (set_email, email) = split_nullable(patch.email);
        let (set_url, url) = split_nullable(patch.url);
        let (set_notes, notes) = split_nullable(patch.notes);

        let row: Option<DbVaultEntry> = sqlx::query_as(
            r#"UPDATE vault_entries SET
                label = COALESCE(?, label),
                kind = COALESCE(?, kind),
                username = CASE WHEN ? THEN ? ELSE username END,
                email = CASE WHEN ? THEN ? ELSE email END,
                secret = COALESCE(?, secret),
                url = CASE WHEN ? THEN ? ELSE url END,
                notes = CASE WHEN ? THEN ? ELSE notes END,
                updated_at = ?
              WHERE id = ? AND owner_id = ?
              RETURNING id, owner_id, label, kind, username, email, secret, url, notes,
                        created_at, updated_at"#,
        )
        .bind(patch.label)
        .bind(patch.kind.map(|k| k.as_str()))
        .bind(set_username)
        .bind(username)
        .bind(set_email)
        .bind(email)
        .bind(patch.secret)
        .bind(set_url)
        .bind(url)
        .bind(set_notes)
        .bind(notes)
        .bind(encode_ts(now()))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LockboxError::from_unique(e, "label"))?;

        let entry = VaultEntry::try_from(row.ok_or(LockboxError::not_found(RESOURCE))?)?;
        info!(entry_id = entry.id, owner_id, "vault entry updated");
        Ok(entry)
    }

    pub async fn delete(&self, id: EntryId, owner_id: AccountId) -> Result<(), LockboxError> {
        let res = sqlx::query("DELETE FROM vault_entries WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(LockboxError::not_found(RESOURCE));
        }
        info!(entry_id = id, owner_id, "vault entry deleted");
        Ok(())
    }
}

fn matches_search(entry: &VaultEntry, needle: &str) -> bool {
    entry.label.to_lowercase().contains(needle)
        || entry
            .username
            .as_deref()
            .is_some_and(|u| u.to_lowercase().contains(needle))
}

fn split_nullable(field: Option<Option<String>>) -> (bool, Option<String>) {
    match field {
        Some(value) => (true, value),
        None => (false, None),
    }
}
