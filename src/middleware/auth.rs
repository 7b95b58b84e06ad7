use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::SessionResolver;
use crate::error::LockboxError;
use crate::router::LockboxState;
use crate::types::Account;

/// The authenticated caller. Extracting it runs the session resolver, so a
/// handler that takes `CurrentAccount` rejects absent or invalid credentials
/// with a bare 401 before touching any data.
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

impl FromRequestParts<LockboxState> for CurrentAccount {
    type Rejection = LockboxError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LockboxState,
    ) -> Result<Self, Self::Rejection> {
        let credential = SessionResolver::credential_from_headers(&parts.headers);
        let account = state.resolver.resolve(credential.as_deref()).await?;
        Ok(Self(account))
    }
}
