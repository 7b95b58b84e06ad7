use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::StatusCode;
use axum::http::request::Parts;

use crate::error::LockboxError;

/// A JSON body whose rejection is kept for the handler, so authorization can
/// run before body validation.
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

pub fn parse_body<T>(body: JsonBody<T>) -> Result<T, LockboxError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            LockboxError::PayloadTooLarge
        } else {
            LockboxError::Validation(rejection.body_text())
        }
    })
}

/// Numeric `{id}` path segment; a malformed id is a validation error.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = LockboxError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| LockboxError::Validation("id must be an integer".to_string()))?;
        Ok(Self(id))
    }
}
