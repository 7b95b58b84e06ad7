use crate::db::sqlite::decode_ts;
use crate::types::{Account, AppCategory, VaultEntry};
use sqlx::FromRow;

/// Raw `accounts` row. Carries the secret hash, so it never leaves `db`.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct DbAccount {
    pub id: i64,
    pub login_id: String,
    pub secret_hash: String,
    pub display_name: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<DbAccount> for Account {
    type Error = sqlx::Error;

    fn try_from(row: DbAccount) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            login_id: row.login_id,
            display_name: row.display_name,
            role: row
                .role
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: decode_ts(&row.created_at)?,
            updated_at: decode_ts(&row.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct DbVaultEntry {
    pub id: i64,
    pub owner_id: i64,
    pub label: String,
    pub kind: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub secret: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<DbVaultEntry> for VaultEntry {
    type Error = sqlx::Error;

    fn try_from(row: DbVaultEntry) -> Result<Self, Self::Error> {
        Ok(VaultEntry {
            id: row.id,
            owner_id: row.owner_id,
            label: row.label,
            kind: row.kind.parse().map_err(|e: String| sqlx::Error::Decode(e.into()))?,
            username: row.username,
            email: row.email,
            secret: row.secret,
            url: row.url,
            notes: row.notes,
            created_at: decode_ts(&row.created_at)?,
            updated_at: decode_ts(&row.updated_at)?,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct DbAppCategory {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub created_at: String,
}

impl TryFrom<DbAppCategory> for AppCategory {
    type Error = sqlx::Error;

    fn try_from(row: DbAppCategory) -> Result<Self, Self::Error> {
        Ok(AppCategory {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            created_at: decode_ts(&row.created_at)?,
        })
    }
}
