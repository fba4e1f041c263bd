//! Credential normalization and validation.
//!
//! Pure functions, applied identically before login and registration so the
//! user sees exactly the canonical username the server will store.

use streampass_core::{ApiError, ApiResult};

pub const USERNAME_MIN_LEN: usize = 2;
pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Canonical username/password pair accepted for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Canonicalize a raw username: trim surrounding whitespace, lowercase,
/// strip every `@`. Idempotent.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase().replace('@', "")
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
}

/// Validate credentials, fail-fast: length bounds, then charset, then
/// password length. Only the first failing rule is surfaced.
pub fn validate(raw_username: &str, password: &str) -> ApiResult<Credentials> {
    let username = normalize_username(raw_username);

    if username.len() < USERNAME_MIN_LEN || username.len() > USERNAME_MAX_LEN {
        return Err(ApiError::InvalidUsernameFormat);
    }
    if !username.chars().all(is_allowed_char) {
        return Err(ApiError::InvalidUsernameFormat);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ApiError::PasswordTooShort);
    }

    Ok(Credentials {
        username,
        password: password.to_string(),
    })
}
