use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::errors::{ServiceError, ServiceResult};

// Non-whitespace on either side of a single '@', and a dot in the domain.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

/// Fully validated payload for create and full-update requests
///
/// `name` is trimmed and `email` is trimmed + lower-cased by the time this
/// struct exists; the store persists these values as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidUserInput {
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
}

/// Validated field subset for partial-update requests
///
/// Only fields present in the request payload are `Some`; each carries the
/// same normalization as the full-input path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}

/// Validate a `:id` path segment
///
/// Accepts any integer ≥ 1 and normalizes it to `i64` for the store.
pub fn validate_id_param(raw: &str) -> ServiceResult<i64> {
    let id: i64 = raw.parse().map_err(|_| ServiceError::InvalidId)?;
    if id < 1 {
        return Err(ServiceError::InvalidId);
    }
    Ok(id)
}

/// Validate the full payload required by create and full-update
pub fn validate_user_input(body: &Value) -> ServiceResult<ValidUserInput> {
    let name = validate_name(body.get("name").ok_or(ServiceError::InvalidName)?)?;
    let email = validate_email(body.get("email").ok_or(ServiceError::InvalidEmail)?)?;
    let age = match body.get("age") {
        Some(value) => Some(validate_age(value)?),
        None => None,
    };

    Ok(ValidUserInput { name, email, age })
}

/// Validate the fields supplied by a partial-update payload
///
/// Fields absent from the payload stay untouched; a payload supplying none
/// of the recognized fields is rejected.
pub fn validate_user_changes(body: &Value) -> ServiceResult<UserChanges> {
    let mut changes = UserChanges::default();

    if let Some(value) = body.get("name") {
        changes.name = Some(validate_name(value)?);
    }
    if let Some(value) = body.get("email") {
        changes.email = Some(validate_email(value)?);
    }
    if let Some(value) = body.get("age") {
        changes.age = Some(validate_age(value)?);
    }

    if changes.is_empty() {
        return Err(ServiceError::EmptyUpdate);
    }

    Ok(changes)
}

// Shared per-field rules. Both the full-input and partial-input paths go
// through these, so the two can never drift apart.

fn validate_name(value: &Value) -> ServiceResult<String> {
    let name = value.as_str().ok_or(ServiceError::InvalidName)?.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidName);
    }
    Ok(name.to_string())
}

fn validate_email(value: &Value) -> ServiceResult<String> {
    let email = value
        .as_str()
        .ok_or(ServiceError::InvalidEmail)?
        .trim()
        .to_lowercase();
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(ServiceError::InvalidEmail);
    }
    Ok(email)
}

fn validate_age(value: &Value) -> ServiceResult<i32> {
    // JSON null, floats and strings all fail the integer check; a present
    // `age` key must carry a non-negative integer.
    let age = value.as_i64().ok_or(ServiceError::InvalidAge)?;
    if age < 0 {
        return Err(ServiceError::InvalidAge);
    }
    i32::try_from(age).map_err(|_| ServiceError::InvalidAge)
}
