//! Pure input validators.
//!
//! Every check returns the first failing field only; callers convert the
//! error into `LockboxError::Validation` at the HTTP boundary.

use serde::{Deserialize, Deserializer};
use std::fmt;

pub const MIN_ACCOUNT_SECRET_LEN: usize = 6;
pub const MAX_LOGIN_ID_LEN: usize = 254;
pub const MAX_DISPLAY_NAME_LEN: usize = 100;
pub const MAX_LABEL_LEN: usize = 200;
pub const MAX_APP_NAME_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn login_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("loginId", "loginId is required"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::new(
            "loginId",
            "loginId must not contain whitespace",
        ));
    }
    if value.chars().count() > MAX_LOGIN_ID_LEN {
        return Err(ValidationError::new(
            "loginId",
            format!("loginId must be at most {MAX_LOGIN_ID_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn account_secret(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_ACCOUNT_SECRET_LEN {
        return Err(ValidationError::new(
            "password",
            format!("password must be at least {MIN_ACCOUNT_SECRET_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn display_name(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(ValidationError::new(
            "displayName",
            format!("displayName must be at most {MAX_DISPLAY_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn label(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("label", "label is required"));
    }
    if value.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::new(
            "label",
            format!("label must be at most {MAX_LABEL_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn entry_secret(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("secret", "secret is required"));
    }
    Ok(())
}

pub fn app_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("name", "name is required"));
    }
    if value.chars().count() > MAX_APP_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            format!("name must be at most {MAX_APP_NAME_LEN} characters"),
        ));
    }
    Ok(())
}

/// Keeps "field absent" (`None`) apart from "field set to null" (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
