use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::AccountId;
use super::validate::{self, ValidationError, double_option};

pub type EntryId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Password,
    Webhook,
    ApiKey,
    Token,
    Other,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Password => "password",
            EntryKind::Webhook => "webhook",
            EntryKind::ApiKey => "api_key",
            EntryKind::Token => "token",
            EntryKind::Other => "other",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(EntryKind::Password),
            "webhook" => Ok(EntryKind::Webhook),
            "api_key" => Ok(EntryKind::ApiKey),
            "token" => Ok(EntryKind::Token),
            "other" => Ok(EntryKind::Other),
            other => Err(format!("unknown entry kind `{other}`")),
        }
    }
}

/// One stored secret. `secret` is returned verbatim to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub id: EntryId,
    pub owner_id: AccountId,
    pub label: String,
    pub kind: EntryKind,
    pub username: Option<String>,
    pub email: Option<String>,
    pub secret: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVaultEntry {
    pub label: String,
    pub kind: EntryKind,
    pub username: Option<String>,
    pub email: Option<String>,
    pub secret: String,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// Partial update. Outer `None` keeps the stored value; `Some(None)` clears
/// an optional column.
#[derive(Debug, Clone, Default)]
pub struct VaultEntryPatch {
    pub label: Option<String>,
    pub kind: Option<EntryKind>,
    pub username: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub secret: Option<String>,
    pub url: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub label: String,
    #[serde(default)]
    pub kind: Option<EntryKind>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub secret: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateEntryRequest {
    pub fn validate(self) -> Result<NewVaultEntry, ValidationError> {
        validate::label(&self.label)?;
        validate::entry_secret(&self.secret)?;
        Ok(NewVaultEntry {
            label: self.label,
            kind: self.kind.unwrap_or_default(),
            username: self.username,
            email: self.email,
            secret: self.secret,
            url: self.url,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: Option<EntryKind>,
    #[serde(default, deserialize_with = "double_option")]
    pub username: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

impl UpdateEntryRequest {
    pub fn validate(self) -> Result<VaultEntryPatch, ValidationError> {
        if let Some(label) = self.label.as_deref() {
            validate::label(label)?;
        }
        if let Some(secret) = self.secret.as_deref() {
            validate::entry_secret(secret)?;
        }
        Ok(VaultEntryPatch {
            label: self.label,
            kind: self.kind,
            username: self.username,
            email: self.email,
            secret: self.secret,
            url: self.url,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEntriesQuery {
    #[serde(default)]
    pub search: Option<String>,
}
