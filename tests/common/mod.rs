#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use lockbox::auth::{HashCost, SecretHasher};
use lockbox::config::SecurityConfig;
use lockbox::types::{Account, NewAccount, Role};
use lockbox::{LockboxState, lockbox_router};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: LockboxState,
    _dir: Option<TempDir>,
}

fn cheap_hasher() -> SecretHasher {
    SecretHasher::new(HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap argon2 params are valid")
}

fn security() -> SecurityConfig {
    SecurityConfig {
        insecure_cookie: true,
        ..SecurityConfig::default()
    }
}

async fn build(database_url: &str, dir: Option<TempDir>) -> TestApp {
    let pool = lockbox::db::open(database_url)
        .await
        .expect("failed to open database");
    let state = LockboxState::new(pool, cheap_hasher(), &security());
    let app = lockbox_router(state.clone());
    TestApp {
        app,
        state,
        _dir: dir,
    }
}

/// App over a private in-memory database.
pub async fn spawn_app() -> TestApp {
    build("sqlite::memory:", None).await
}

/// App over a file-backed database, for tests that need real concurrent
/// connections.
pub async fn spawn_file_app() -> TestApp {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let database_url = format!("sqlite:{}", dir.path().join("lockbox.db").display());
    build(&database_url, Some(dir)).await
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");
        read_json(resp).await
    }

    /// Insert an account directly and open a session for it.
    pub async fn account_with_session(&self, login_id: &str, role: Role) -> (Account, String) {
        let account = self
            .state
            .accounts
            .create(NewAccount {
                login_id: login_id.to_string(),
                secret: "secret-1".to_string(),
                display_name: None,
                role,
            })
            .await
            .expect("failed to create account");
        let issued = self
            .state
            .sessions
            .create(account.id, self.state.session_ttl)
            .await
            .expect("failed to create session");
        (account, issued.token)
    }
}

pub async fn read_json(resp: axum::response::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not json")
    };
    (status, json)
}

pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
