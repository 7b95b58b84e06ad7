use axum::{Json, extract::State, http::StatusCode};

use crate::middleware::{CurrentAccount, JsonBody, parse_body};
use crate::types::AppCategory;
use crate::types::app::CreateAppRequest;
use crate::{LockboxError, router::LockboxState};

/// GET /apps
pub async fn list_apps(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
) -> Result<Json<Vec<AppCategory>>, LockboxError> {
    Ok(Json(state.apps.list(caller.id).await?))
}

/// POST /apps
pub async fn create_app(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    body: JsonBody<CreateAppRequest>,
) -> Result<(StatusCode, Json<AppCategory>), LockboxError> {
    let name = parse_body(body)?.validate()?;
    let app = state.apps.create(caller.id, name).await?;
    Ok((StatusCode::CREATED, Json(app)))
}
