use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt};

use crate::db::SessionStore;
use crate::db::sqlite::now;
use crate::error::LockboxError;
use crate::types::Account;

pub const SESSION_COOKIE: &str = "lockbox_session";

/// Turns request credential material into an authenticated account.
/// Never creates accounts or sessions and never writes.
#[derive(Clone)]
pub struct SessionResolver {
    sessions: SessionStore,
}

impl SessionResolver {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Extract the session token.
    /// Accepts either:
    /// - Header: `Authorization: Bearer <token>`
    /// - Cookie: `lockbox_session=<token>`
    pub fn credential_from_headers(headers: &HeaderMap) -> Option<String> {
        if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
            return Some(bearer.token().to_string());
        }
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
    }

    pub async fn resolve(&self, credential: Option<&str>) -> Result<Account, LockboxError> {
        let token = credential
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LockboxError::Unauthenticated)?;
        self.sessions
            .resolve(token, now())
            .await?
            .ok_or(LockboxError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_stores;
    use crate::types::{NewAccount, Role};
    use axum::http::HeaderValue;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("lockbox_session=from-cookie"));
        assert_eq!(
            SessionResolver::credential_from_headers(&headers).as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; lockbox_session=abc"));
        assert_eq!(
            SessionResolver::credential_from_headers(&headers).as_deref(),
            Some("abc")
        );
        assert_eq!(SessionResolver::credential_from_headers(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn absent_or_unknown_tokens_are_unauthenticated() {
        let stores = memory_stores().await;
        let resolver = SessionResolver::new(stores.sessions.clone());
        assert!(matches!(
            resolver.resolve(None).await,
            Err(LockboxError::Unauthenticated)
        ));
        assert!(matches!(
            resolver.resolve(Some("")).await,
            Err(LockboxError::Unauthenticated)
        ));
        assert!(matches!(
            resolver.resolve(Some("nope")).await,
            Err(LockboxError::Unauthenticated)
        ));

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
            .create(account.id, chrono::Duration::minutes(5))
            .await
            .unwrap();
        let resolved = resolver.resolve(Some(&issued.token)).await.unwrap();
        assert_eq!(resolved, account);
    }
}
