use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::validate::{self, ValidationError, double_option};

pub type AccountId = i64;

/// Role hierarchy, ordered `User < Admin < SuperAdmin`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
        }
    }

    /// Roles that may manage other accounts.
    pub fn is_privileged(self) -> bool {
        match self {
            Role::User => false,
            Role::Admin | Role::SuperAdmin => true,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role `{}`", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super-admin" => Ok(Role::SuperAdmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Sanitized account. The secret hash never leaves the account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub login_id: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for `AccountStore::create`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub login_id: String,
    pub secret: String,
    pub display_name: Option<String>,
    pub role: Role,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub login_id: Option<String>,
    pub secret: Option<String>,
    pub display_name: Option<Option<String>>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub login_id: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl CreateAccountRequest {
    pub fn validate(self) -> Result<NewAccount, ValidationError> {
        validate::login_id(&self.login_id)?;
        validate::account_secret(&self.password)?;
        if let Some(name) = self.display_name.as_deref() {
            validate::display_name(name)?;
        }
        Ok(NewAccount {
            login_id: self.login_id,
            secret: self.password,
            display_name: self.display_name,
            role: self.role.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub login_id: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub display_name: Option<Option<String>>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl UpdateAccountRequest {
    pub fn validate(self) -> Result<AccountPatch, ValidationError> {
        if let Some(login) = self.login_id.as_deref() {
            validate::login_id(login)?;
        }
        if let Some(secret) = self.password.as_deref() {
            validate::account_secret(secret)?;
        }
        if let Some(Some(name)) = self.display_name.as_ref() {
            validate::display_name(name)?;
        }
        Ok(AccountPatch {
            login_id: self.login_id,
            secret: self.password,
            display_name: self.display_name,
            role: self.role,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}
