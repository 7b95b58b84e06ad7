use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::auth::{DenyReason, Operation, authorize, require_account_manager};
use crate::middleware::{CurrentAccount, EntityId, JsonBody, parse_body};
use crate::types::Account;
use crate::types::account::{CreateAccountRequest, UpdateAccountRequest};
use crate::{LockboxError, router::LockboxState};

const UPDATE_ATTEMPTS: usize = 3;

/// GET /accounts
pub async fn list_accounts(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
) -> Result<Json<Vec<Account>>, LockboxError> {
    authorize(&caller, Operation::ListAccounts)?;
    Ok(Json(state.accounts.list().await?))
}

/// POST /accounts
pub async fn create_account(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    body: JsonBody<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), LockboxError> {
    require_account_manager(&caller)?;
    let new = parse_body(body)?.validate()?;
    authorize(&caller, Operation::CreateAccount { role: new.role }).inspect_err(|_| {
        warn!(
            caller_id = caller.id,
            requested_role = %new.role,
            "account creation denied"
        );
    })?;

    let account = state.accounts.create(new).await?;
    info!(caller_id = caller.id, account_id = account.id, "account created via API");
    Ok((StatusCode::CREATED, Json(account)))
}

/// PUT /accounts/{id}
pub async fn update_account(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    EntityId(id): EntityId,
    body: JsonBody<UpdateAccountRequest>,
) -> Result<Json<Account>, LockboxError> {
    require_account_manager(&caller)?;
    let patch = parse_body(body)?.validate()?;

    // The write only lands while the target keeps the role it was
    // authorized against; a concurrent role change means re-checking.
    for _ in 0..UPDATE_ATTEMPTS {
        let target = state.accounts.get(id).await?;
        authorize(
            &caller,
            Operation::UpdateAccount {
                target: &target,
                new_role: patch.role,
            },
        )
        .inspect_err(|_| warn!(caller_id = caller.id, target_id = id, "account update denied"))?;

        if let Some(account) = state.accounts.update(id, target.role, patch.clone()).await? {
            return Ok(Json(account));
        }
        debug!(target_id = id, "target role changed during update, retrying");
    }

    warn!(caller_id = caller.id, target_id = id, "account update gave up after role churn");
    Err(LockboxError::Forbidden(DenyReason::ProtectedSuperAdmin))
}

/// DELETE /accounts/{id}
pub async fn delete_account(
    State(state): State<LockboxState>,
    CurrentAccount(caller): CurrentAccount,
    EntityId(id): EntityId,
) -> Result<Json<Value>, LockboxError> {
    authorize(&caller, Operation::DeleteAccount { target_id: id })
        .inspect_err(|_| warn!(caller_id = caller.id, target_id = id, "account delete denied"))?;
    state.accounts.delete(id).await?;
    info!(caller_id = caller.id, account_id = id, "account deleted via API");
    Ok(Json(json!({ "id": id, "message": "account deleted" })))
}
