use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::validate::{self, ValidationError};

pub type AppId = i64;

/// Label used to group vault entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCategory {
    pub id: AppId,
    pub owner_id: AccountId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    pub name: String,
}

impl CreateAppRequest {
    pub fn validate(self) -> Result<String, ValidationError> {
        validate::app_name(&self.name)?;
        Ok(self.name)
    }
}
