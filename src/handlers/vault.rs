use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::auth::{Decision, Operation, decide};
use crate::db::vault::RESOURCE;
use crate::middleware::{CurrentAccount, EntityId, JsonBody, parse_body};
use crate::types::vault::{CreateEntryRequest, ListEntriesQuery, UpdateEntryRequest};
use crate::types::{Account, EntryId, VaultEntry};
use crate::{LockboxError, router::LockboxState};

/// GET /vault?search=
pub async fn list_entries(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<Vec<VaultEntry>>, LockboxError> {
    let entries = state
        .vault
        .list(caller.id, query.search.as_deref())
        .await?;
    Ok(Json(entries))
}

/// POST /vault
pub async fn create_entry(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    body: JsonBody<CreateEntryRequest>,
) -> Result<(StatusCode, Json<VaultEntry>), LockboxError> {
    let new = parse_body(body)?.validate()?;
    let entry = state.vault.create(caller.id, new).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /vault/{id}
pub async fn get_entry(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    EntityId(id): EntityId,
) -> Result<Json<VaultEntry>, LockboxError> {
    Ok(Json(owned_entry(&state, &caller, id).await?))
}

/// PATCH /vault/{id}
pub async fn update_entry(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    EntityId(id): EntityId,
    body: JsonBody<UpdateEntryRequest>,
) -> Result<Json<VaultEntry>, LockboxError> {
    owned_entry(&state, &caller, id).await?;
    let patch = parse_body(body)?.validate()?;
    Ok(Json(state.vault.update(id, caller.id, patch).await?))
}

/// DELETE /vault/{id}
pub async fn delete_entry(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    EntityId(id): EntityId,
) -> Result<Json<Value>, LockboxError> {
    owned_entry(&state, &caller, id).await?;
    state.vault.delete(id, caller.id).await?;
    Ok(Json(json!({ "id": id, "message": "vault entry deleted" })))
}

/// Load an entry and apply the ownership rule. A foreign entry yields the
/// same `NotFound` as a missing one.
async fn owned_entry(
    state: &LockboxState,
    caller: &Account,
    id: EntryId,
) -> Result<VaultEntry, LockboxError> {
    let entry = state
        .vault
        .find(id)
        .await?
        .ok_or(LockboxError::not_found(RESOURCE))?;
    match decide(
        caller,
        Operation::AccessEntry {
            owner_id: entry.owner_id,
        },
    ) {
        Decision::Allow => Ok(entry),
        Decision::Deny(_) => Err(LockboxError::not_found(RESOURCE)),
    }
}
