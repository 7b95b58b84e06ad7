use crate::db::models::DbAccount;
use crate::db::sqlite::{SqlitePool, encode_ts, now};
use crate::error::LockboxError;
use crate::types::{Account, AccountId};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Opaque bearer sessions, deleted together with their account.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        account_id: AccountId,
        ttl: Duration,
    ) -> Result<IssuedSession, LockboxError> {
        let token = generate_token();
        let created_at = now();
        let expires_at = created_at
            .checked_add_signed(ttl)
            .ok_or_else(|| LockboxError::Validation("session lifetime out of range".to_string()))?;
        sqlx::query(
            "INSERT INTO sessions (token, account_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&token)
        .bind(account_id)
        .bind(encode_ts(created_at))
        .bind(encode_ts(expires_at))
        .execute(&self.pool)
        .await?;
        info!(account_id, expires_at = %expires_at, "session issued");
        Ok(IssuedSession { token, expires_at })
    }

    /// Read-only lookup of the account behind a live token.
    pub async fn resolve(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Account>, LockboxError> {
        let row: Option<DbAccount> = sqlx::query_as(
            r#"SELECT a.id, a.login_id, a.secret_hash, a.display_name, a.role,
                      a.created_at, a.updated_at
               FROM sessions s JOIN accounts a ON a.id = s.account_id
               WHERE s.token = ? AND s.expires_at > ?"#,
        )
        .bind(token)
        .bind(encode_ts(at))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Account::try_from).transpose()?)
    }

    /// Returns whether a session was removed.
    pub async fn revoke(&self, token: &str) -> Result<bool, LockboxError> {
        let res = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn purge_expired(&self, at: DateTime<Utc>) -> Result<u64, LockboxError> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(encode_ts(at))
            .execute(&self.pool)
            .await?;
        debug!(purged = res.rows_affected(), "expired sessions purged");
        Ok(res.rows_affected())
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_stores;
    use crate::types::{NewAccount, Role};

    #[test]
    fn tokens_are_random_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[tokio::test]
    async fn sessions_resolve_until_expiry_or_revocation() {
        let stores = memory_stores().await;
        let account = stores
            .accounts
            .create(NewAccount {
                login_id: "me".to_string(),
                secret: "secret-1".to_string(),
                display_name: None,
                role: Role::Admin,
            })
            .await
            .unwrap();

        let issued = stores
            .sessions
            .create(account.id, Duration::hours(1))
            .await
            .unwrap();
        let resolved = stores
            .sessions
            .resolve(&issued.token, now())
            .await
            .unwrap()
            .expect("live session resolves");
        assert_eq!(resolved.id, account.id);

        let later = issued.expires_at + Duration::seconds(1);
        assert!(stores.sessions.resolve(&issued.token, later).await.unwrap().is_none());
        assert_eq!(stores.sessions.purge_expired(later).await.unwrap(), 1);

        let second = stores
            .sessions
            .create(account.id, Duration::hours(1))
            .await
            .unwrap();
        assert!(stores.sessions.revoke(&second.token).await.unwrap());
        assert!(!stores.sessions.revoke(&second.token).await.unwrap());
        assert!(stores.sessions.resolve(&second.token, now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_account_drops_its_sessions() {
        let stores = memory_stores().await;
        let account = stores
            .accounts
            .create(NewAccount {
                login_id: "me".to_string(),
                secret: "secret-1".to_string(),
                display_name: None,
                role: Role::User,
            })
            .await
            .unwrap();
        let issued = stores
            .sessions
            .create(account.id, Duration::hours(1))
            .await
            .unwrap();
        stores.accounts.delete(account.id).await.unwrap();
        assert!(stores.sessions.resolve(&issued.token, now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_lifetime_is_an_error_not_a_panic() {
        let stores = memory_stores().await;
        let account = stores
            .accounts
            .create(NewAccount {
                login_id: "me".to_string(),
                secret: "secret-1".to_string(),
                display_name: None,
                role: Role::User,
            })
            .await
            .unwrap();
        let err = stores
            .sessions
            .create(account.id, Duration::MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, LockboxError::Validation(_)));
    }
}
