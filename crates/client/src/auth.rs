//! Account operations: registration, login, profile fetch, session
//! verification, and license key activation.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use streampass_core::types::{AuthResponse, UserProfile};
use streampass_core::ApiResult;

use crate::credentials::{validate, Credentials};
use crate::gateway::ApiGateway;

#[derive(Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LicenseKeyBody<'a> {
    license_key: &'a str,
}

#[derive(Debug, serde::Deserialize)]
pub struct ActivationResponse {
    pub success: bool,
}

/// High-level account client. Credentials are normalized and validated
/// locally before any request leaves the process.
pub struct AccountClient {
    gateway: Arc<ApiGateway>,
}

impl AccountClient {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Register a new account and store the returned token.
    pub async fn register(&self, raw_username: &str, password: &str) -> ApiResult<UserProfile> {
        let creds = validate(raw_username, password)?;
        self.submit_credentials("/v2/auth/register", &creds).await
    }

    /// Log in and store the returned token.
    pub async fn login(&self, raw_username: &str, password: &str) -> ApiResult<UserProfile> {
        let creds = validate(raw_username, password)?;
        self.submit_credentials("/v2/auth/login", &creds).await
    }

    async fn submit_credentials(&self, path: &str, creds: &Credentials) -> ApiResult<UserProfile> {
        let response: AuthResponse = self
            .gateway
            .post_auth(
                path,
                &CredentialsBody {
                    username: &creds.username,
                    password: &creds.password,
                },
            )
            .await?;
        self.gateway.session().set(response.access_token);

        let profile = self.me().await?;
        info!(user_id = %profile.id, username = %profile.username, "Signed in");
        Ok(profile)
    }

    /// Drop the stored session token.
    pub fn logout(&self) {
        self.gateway.session().clear();
        info!("Signed out");
    }

    /// Fetch the current user's profile.
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.gateway.get("/v2/auth/me").await
    }

    /// Check whether the stored token is still valid. Any failure purges
    /// the session — this is the single point where an invalid or expired
    /// token is cleared.
    pub async fn verify_session(&self) -> bool {
        if self.gateway.session().get().is_none() {
            return false;
        }
        match self.me().await {
            Ok(_) => true,
            Err(e) => {
                info!(error = %e, "Session verification failed; clearing token");
                self.gateway.session().clear();
                false
            }
        }
    }

    /// Redeem a license key produced by the checkout flow, then re-fetch the
    /// profile so derived entitlement fields come from the server.
    pub async fn activate_license_key(&self, license_key: &str) -> ApiResult<UserProfile> {
        let key = license_key.trim();
        if key.is_empty() {
            return Err(streampass_core::ApiError::BadRequest(
                "license key required".to_string(),
            ));
        }
        let _: ActivationResponse = self
            .gateway
            .post("/v2/auth/upgrade-license", &LicenseKeyBody { license_key: key })
            .await?;
        info!("License key activated");
        self.me().await
    }
}
