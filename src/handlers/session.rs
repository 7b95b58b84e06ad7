use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use time::Duration;
use tracing::{info, warn};

use crate::auth::SessionResolver;
use crate::auth::session::SESSION_COOKIE;
use crate::middleware::{CurrentAccount, JsonBody, parse_body};
use crate::types::Account;
use crate::types::account::LoginRequest;
use crate::{LockboxError, router::LockboxState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

/// POST /auth/login -> issues a session token and sets the session cookie.
pub async fn login(
    State(state): State<LockboxState>,
    jar: CookieJar,
    body: JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), LockboxError> {
    let req = parse_body(body)?;
    let Some(account) = state
        .accounts
        .authenticate(&req.login_id, &req.password)
        .await?
    else {
        warn!(login_id = %req.login_id, "login rejected");
        return Err(LockboxError::Unauthenticated);
    };

    let issued = state.sessions.create(account.id, state.session_ttl).await?;
    let max_age = Duration::seconds(state.session_ttl.num_seconds());
    let jar = jar.add(build_cookie(
        issued.token.clone(),
        max_age,
        state.insecure_cookie,
    ));

    info!(account_id = account.id, "login succeeded");
    Ok((
        jar,
        Json(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            account,
        }),
    ))
}

/// POST /auth/logout -> revokes the presented session.
pub async fn logout(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), LockboxError> {
    if let Some(token) = SessionResolver::credential_from_headers(&headers) {
        state.sessions.revoke(&token).await?;
    }
    info!(account_id = caller.id, "session revoked");
    Ok((
        jar.remove(clear_cookie()),
        Json(json!({ "message": "logged out" })),
    ))
}

/// GET /auth/me
pub async fn me(CurrentAccount(caller): CurrentAccount) -> Json<Account> {
    Json(caller)
}

fn build_cookie(token: String, max_age: Duration, insecure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(!insecure)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
