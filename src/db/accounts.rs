use crate::auth::SecretHasher;
use crate::db::models::DbAccount;
use crate::db::sqlite::{SqlitePool, encode_ts, now};
use crate::error::LockboxError;
use crate::types::{Account, AccountId, AccountPatch, NewAccount, Role};
use tracing::{debug, info};

/// Durable table of accounts. Secrets are hashed before they reach SQL and
/// hashes are never handed back to callers.
#[derive(Clone)]
pub struct AccountStore {
    pool: SqlitePool,
    hasher: SecretHasher,
}

impl AccountStore {
    pub fn new(pool: SqlitePool, hasher: SecretHasher) -> Self {
        Self { pool, hasher }
    }

    /// Insert a new account. The UNIQUE constraint on `login_id` decides
    /// conflicts, so concurrent creates cannot both succeed.
    pub async fn create(&self, new: NewAccount) -> Result<Account, LockboxError> {
        let secret_hash = self.hasher.hash_blocking(new.secret).await?;
        let ts = encode_ts(now());
        let row: DbAccount = sqlx::query_as(
            r#"INSERT INTO accounts (login_id, secret_hash, display_name, role, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               RETURNING id, login_id, secret_hash, display_name, role, created_at, updated_at"#,
        )
        .bind(&new.login_id)
        .bind(secret_hash)
        .bind(new.display_name)
        .bind(new.role.as_str())
        .bind(&ts)
        .bind(&ts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LockboxError::from_unique(e, "loginId"))?;

        let account = Account::try_from(row)?;
        info!(
            account_id = account.id,
            login_id = %account.login_id,
            role = %account.role,
            "account created"
        );
        Ok(account)
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, LockboxError> {
        let row: Option<DbAccount> = sqlx::query_as(
            r#"SELECT id, login_id, secret_hash, display_name, role, created_at, updated_at
               FROM accounts WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let row = row.ok_or(LockboxError::not_found("account"))?;
        Ok(Account::try_from(row)?)
    }

    /// Newest accounts first.
    pub async fn list(&self) -> Result<Vec<Account>, LockboxError> {
        let rows: Vec<DbAccount> = sqlx::query_as(
            r#"SELECT id, login_id, secret_hash, display_name, role, created_at, updated_at
               FROM accounts ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        let accounts = rows
            .into_iter()
            .map(Account::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = accounts.len(), "listed accounts");
        Ok(accounts)
    }

    /// Apply only the supplied fields and refresh `updated_at`, in a single
    /// statement. A changed `login_id` is checked by the UNIQUE constraint.
    ///
    /// The row must still hold `expected_role`, the role the caller was
    /// authorized against. `Ok(None)` means the role changed in between.
    pub async fn update(
        &self,
        id: AccountId,
        expected_role: Role,
        patch: AccountPatch,
    ) -> Result<Option<Account>, LockboxError> {
        let secret_hash = match patch.secret {
            Some(secret) => Some(self.hasher.hash_blocking(secret).await?),
            None => None,
        };
        let (set_display_name, display_name) = match patch.display_name {
            Some(value) => (true, value),
            None => (false, None),
        };

        let row: Option<DbAccount> = sqlx::query_as(
            r#"UPDATE accounts SET
                login_id = COALESCE(?, login_id),
                secret_hash = COALESCE(?, secret_hash),
                display_name = CASE WHEN ? THEN ? ELSE display_name END,
                role = COALESCE(?, role),
                updated_at = ?
              WHERE id = ? AND role = ?
              RETURNING id, login_id, secret_hash, display_name, role, created_at, updated_at"#,
        )
        .bind(patch.login_id)
        .bind(secret_hash)
        .bind(set_display_name)
        .bind(display_name)
        .bind(patch.role.map(|r| r.as_str()))
        .bind(encode_ts(now()))
        .bind(id)
        .bind(expected_role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LockboxError::from_unique(e, "loginId"))?;

        let Some(row) = row else {
            // Missing rows stay `NotFound`; an existing row had its role changed.
            self.get(id).await?;
            return Ok(None);
        };
        let account = Account::try_from(row)?;
        info!(account_id = account.id, role = %account.role, "account updated");
        Ok(Some(account))
    }

    /// Hard delete; owned vault entries, app categories and sessions cascade.
    pub async fn delete(&self, id: AccountId) -> Result<(), LockboxError> {
        let res = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(LockboxError::not_found("account"));
        }
        info!(account_id = id, "account deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, LockboxError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    /// Check a login id / plaintext pair. Unknown login ids and wrong
    /// secrets are indistinguishable to the caller, in result and in cost.
    pub async fn authenticate(
        &self,
        login_id: &str,
        secret: &str,
    ) -> Result<Option<Account>, LockboxError> {
        let row: Option<DbAccount> = sqlx::query_as(
            r#"SELECT id, login_id, secret_hash, display_name, role, created_at, updated_at
               FROM accounts WHERE login_id = ?"#,
        )
        .bind(login_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            self.hasher.verify_decoy(secret.to_string()).await;
            return Ok(None);
        };
        if !self
            .hasher
            .verify_blocking(secret.to_string(), row.secret_hash.clone())
            .await
        {
            return Ok(None);
        }
        Ok(Some(Account::try_from(row)?))
    }

    /// Insert `seed` only when the table is empty. The emptiness test and the
    /// insert are one statement, so racing starters create at most one row.
    pub async fn seed_if_empty(&self, seed: NewAccount) -> Result<Option<Account>, LockboxError> {
        if self.count().await? > 0 {
            return Ok(None);
        }
        let secret_hash = self.hasher.hash_blocking(seed.secret).await?;
        let ts = encode_ts(now());
        let row: Option<DbAccount> = sqlx::query_as(
            r#"INSERT INTO accounts (login_id, secret_hash, display_name, role, created_at, updated_at)
               SELECT ?, ?, ?, ?, ?, ?
               WHERE NOT EXISTS (SELECT 1 FROM accounts)
               RETURNING id, login_id, secret_hash, display_name, role, created_at, updated_at"#,
        )
        .bind(&seed.login_id)
        .bind(secret_hash)
        .bind(seed.display_name)
        .bind(seed.role.as_str())
        .bind(&ts)
        .bind(&ts)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LockboxError::from_unique(e, "loginId"))?;

        row.map(Account::try_from).transpose().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{HashCost, SecretHasher};
    use crate::db::sqlite::open;
    use crate::db::test_support::memory_stores;
    use std::time::{Duration, Instant};

    fn new_account(login: &str, role: Role) -> NewAccount {
        NewAccount {
            login_id: login.to_string(),
            secret: "secret-1".to_string(),
            display_name: Some("Someone".to_string()),
            role,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let stores = memory_stores().await;
        let created = stores
            .accounts
            .create(new_account("a@x.com", Role::User))
            .await
            .unwrap();
        let fetched = stores.accounts.get(created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.role, Role::User);
    }

    #[tokio::test]
    async fn duplicate_login_conflicts() {
        let stores = memory_stores().await;
        stores
            .accounts
            .create(new_account("a@x.com", Role::User))
            .await
            .unwrap();
        let err = stores
            .accounts
            .create(new_account("a@x.com", Role::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, LockboxError::Conflict { field: "loginId" }));
    }

    #[tokio::test]
    async fn login_ids_are_case_sensitive() {
        let stores = memory_stores().await;
        stores
            .accounts
            .create(new_account("Alice", Role::User))
            .await
            .unwrap();
        stores
            .accounts
            .create(new_account("alice", Role::User))
            .await
            .unwrap();
        assert_eq!(stores.accounts.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let stores = memory_stores().await;
        let created = stores
            .accounts
            .create(new_account("a@x.com", Role::User))
            .await
            .unwrap();
        let updated = stores
            .accounts
            .update(
                created.id,
                Role::User,
                AccountPatch {
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.login_id, created.login_id);
        assert_eq!(updated.display_name, created.display_name);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let cleared = stores
            .accounts
            .update(
                created.id,
                Role::Admin,
                AccountPatch {
                    display_name: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.display_name, None);
        assert_eq!(cleared.role, Role::Admin);
    }

    #[tokio::test]
    async fn update_rehashes_supplied_secret() {
        let stores = memory_stores().await;
        let created = stores
            .accounts
            .create(new_account("a@x.com", Role::User))
            .await
            .unwrap();
        stores
            .accounts
            .update(
                created.id,
                Role::User,
                AccountPatch {
                    secret: Some("brand-new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(
            stores
                .accounts
                .authenticate("a@x.com", "secret-1")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            stores
                .accounts
                .authenticate("a@x.com", "brand-new")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn update_to_taken_login_conflicts() {
        let stores = memory_stores().await;
        stores
            .accounts
            .create(new_account("a@x.com", Role::User))
            .await
            .unwrap();
        let b = stores
            .accounts
            .create(new_account("b@x.com", Role::User))
            .await
            .unwrap();
        let err = stores
            .accounts
            .update(
                b.id,
                Role::User,
                AccountPatch {
                    login_id: Some("a@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LockboxError::Conflict { field: "loginId" }));

        // Re-submitting the current login id is not a collision.
        stores
            .accounts
            .update(
                b.id,
                Role::User,
                AccountPatch {
                    login_id: Some("b@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let stores = memory_stores().await;
        assert!(matches!(
            stores.accounts.get(42).await,
            Err(LockboxError::NotFound { .. })
        ));
        assert!(matches!(
            stores
                .accounts
                .update(42, Role::User, AccountPatch::default())
                .await,
            Err(LockboxError::NotFound { .. })
        ));
        assert!(matches!(
            stores.accounts.delete(42).await,
            Err(LockboxError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn seed_only_fills_an_empty_table() {
        let stores = memory_stores().await;
        let seeded = stores
            .accounts
            .seed_if_empty(new_account("admin", Role::SuperAdmin))
            .await
            .unwrap()
            .expect("empty table is seeded");
        assert_eq!(seeded.role, Role::SuperAdmin);

        let again = stores
            .accounts
            .seed_if_empty(new_account("other", Role::SuperAdmin))
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(stores.accounts.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_skips_rows_whose_role_changed() {
        let stores = memory_stores().await;
        let target = stores
            .accounts
            .create(new_account("a@x.com", Role::User))
            .await
            .unwrap();
        // promoted after the caller was authorized against `user`
        stores
            .accounts
            .update(
                target.id,
                Role::User,
                AccountPatch {
                    role: Some(Role::SuperAdmin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        let stale = stores
            .accounts
            .update(
                target.id,
                Role::User,
                AccountPatch {
                    secret: Some("taken-over".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(stale.is_none());
        assert!(
            stores
                .accounts
                .authenticate("a@x.com", "taken-over")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(
            stores.accounts.get(target.id).await.unwrap().role,
            Role::SuperAdmin
        );
    }

    async fn elapsed_failed_logins(store: &AccountStore, login_id: &str) -> Duration {
        let start = Instant::now();
        for _ in 0..3 {
            let found = store.authenticate(login_id, "wrong-secret").await.unwrap();
            assert!(found.is_none());
        }
        start.elapsed()
    }

    #[tokio::test]
    async fn unknown_login_costs_a_full_verification() {
        let pool = open("sqlite::memory:").await.unwrap();
        let hasher = SecretHasher::new(HashCost {
            memory_kib: 4 * 1024,
            iterations: 3,
            parallelism: 1,
        })
        .unwrap();
        let store = AccountStore::new(pool, hasher);
        store
            .create(new_account("alice", Role::User))
            .await
            .unwrap();

        let known = elapsed_failed_logins(&store, "alice").await;
        let unknown = elapsed_failed_logins(&store, "nobody").await;
        // Without the decoy the unknown path is orders of magnitude faster.
        assert!(
            unknown * 4 >= known,
            "known={known:?} unknown={unknown:?}"
        );
    }
}
