//! Closed client-facing error taxonomy.
//!
//! Every failure — transport, HTTP status, or local validation — is expressed
//! as one `ApiError` variant so calling views can treat all of them uniformly.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("session required — please sign in")]
    SessionRequired,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("username must be 2-64 characters: lowercase letters, digits, dot, underscore or dash")]
    InvalidUsernameFormat,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("no such route")]
    NotFoundRoute,
    #[error("not found: {0}")]
    NotFoundResource(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("network unavailable")]
    NetworkUnavailable,
    #[error("request failed: {0}")]
    RequestFailed(String),
}

impl ApiError {
    /// Map a non-success HTTP status plus the server's optional `detail`
    /// string to a taxonomy variant.
    ///
    /// `auth_endpoint` distinguishes a 401 on login/register (wrong
    /// credentials) from a 401 anywhere else (missing/expired session).
    ///
    /// Detail substring matching is a compatibility shim for backends that
    /// report errors as free text instead of structured codes; a structured
    /// `code` field should take precedence if the backend ever grows one.
    pub fn from_response(status: u16, detail: Option<&str>, auth_endpoint: bool) -> Self {
        let detail = detail.map(str::trim).filter(|d| !d.is_empty());

        match status {
            401 if auth_endpoint => Self::InvalidCredentials,
            401 => Self::SessionRequired,
            403 => Self::Forbidden(detail.unwrap_or("access denied").to_string()),
            409 => Self::Conflict(detail.unwrap_or("resource already exists").to_string()),
            400 => match detail {
                Some(d) if contains_ignore_case(d, "username") => Self::InvalidUsernameFormat,
                Some(d) if contains_ignore_case(d, "password") => Self::PasswordTooShort,
                Some(d) => Self::BadRequest(d.to_string()),
                None => Self::BadRequest("bad request".to_string()),
            },
            404 => match detail {
                Some(d) if d.eq_ignore_ascii_case("not found") => Self::NotFoundRoute,
                Some(d) if contains_ignore_case(d, "license") => {
                    Self::NotFoundResource("license key not found".to_string())
                }
                Some(d) => Self::NotFoundResource(d.to_string()),
                None => Self::NotFoundRoute,
            },
            _ => Self::RequestFailed(
                detail
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("server returned status {status}")),
            ),
        }
    }

    /// Whether this error invalidates the stored session token.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionRequired)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
