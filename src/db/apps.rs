use crate::db::models::DbAppCategory;
use crate::db::sqlite::{SqlitePool, encode_ts, now};
use crate::error::LockboxError;
use crate::types::{AccountId, AppCategory};
use tracing::info;

/// Per-owner app names used to label vault entries.
#[derive(Clone)]
pub struct AppStore {
    pool: SqlitePool,
}

impl AppStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: AccountId, name: String) -> Result<AppCategory, LockboxError> {
        let row: DbAppCategory = sqlx::query_as(
            r#"INSERT INTO app_categories (owner_id, name, created_at)
               VALUES (?, ?, ?)
               RETURNING id, owner_id, name, created_at"#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(encode_ts(now()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LockboxError::from_unique(e, "name"))?;

        let app = AppCategory::try_from(row)?;
        info!(app_id = app.id, owner_id, "app category created");
        Ok(app)
    }

    /// Alphabetical by name.
    pub async fn list(&self, owner_id: AccountId) -> Result<Vec<AppCategory>, LockboxError> {
        let rows: Vec<DbAppCategory> = sqlx::query_as(
            r#"SELECT id, owner_id, name, created_at
               FROM app_categories WHERE owner_id = ? ORDER BY name ASC, id ASC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(AppCategory::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
