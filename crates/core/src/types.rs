//! Shared wire models for the StreamPass account backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token envelope returned by `POST /v2/auth/login` and `/v2/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
}

/// The signed-in user's profile, fetched per view from `GET /v2/auth/me`.
/// Read-only on the client; the backend owns every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw role string; parse with [`crate::Role::parse`] before gating.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub tariff_name: Option<String>,
    #[serde(default)]
    pub allowed_platforms: Vec<String>,
    #[serde(default)]
    pub license_expires_at: Option<DateTime<Utc>>,
}

/// A subscription plan from the catalog (`GET /v2/license/plans`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub allowed_platforms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlansResponse {
    pub items: Vec<Plan>,
}

/// Per-donor coin aggregate attached to an admin user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorStat {
    pub username: String,
    #[serde(default)]
    pub coins: u64,
}

/// Per-gift coin aggregate attached to an admin user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftStat {
    pub name: String,
    #[serde(default)]
    pub coins: u64,
}

/// Operational superset of [`UserProfile`] returned by the admin listing.
/// Strictly a read-only projection — every mutation goes through a named
/// operation, never a record patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserRecord {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub tariff_id: Option<String>,
    #[serde(default)]
    pub license_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub online_now: bool,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub client_os: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub tiktok_username: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_live_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_gifts: u64,
    #[serde(default)]
    pub total_coins: u64,
    #[serde(default)]
    pub today_coins: u64,
    #[serde(default)]
    pub last_7d_coins: u64,
    #[serde(default)]
    pub last_30d_coins: u64,
    #[serde(default)]
    pub top_donors_all: Vec<DonorStat>,
    #[serde(default)]
    pub top_donors_today: Vec<DonorStat>,
    #[serde(default)]
    pub top_donors_7d: Vec<DonorStat>,
    #[serde(default)]
    pub top_donors_30d: Vec<DonorStat>,
    #[serde(default)]
    pub top_gifts_all: Vec<GiftStat>,
    #[serde(default)]
    pub top_gifts_today: Vec<GiftStat>,
    #[serde(default)]
    pub top_gifts_7d: Vec<GiftStat>,
    #[serde(default)]
    pub top_gifts_30d: Vec<GiftStat>,
}

impl AdminUserRecord {
    /// Whether the account has ever been granted a license — the local
    /// precondition for extend/revoke.
    pub fn has_license(&self) -> bool {
        self.license_expires_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_record_tolerates_sparse_payload() {
        let raw = serde_json::json!({
            "id": "6a5f4c6e-0f3a-4a8e-9a2b-1c0d9e8f7a6b",
            "username": "streamer123"
        });
        let record: AdminUserRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.username, "streamer123");
        assert!(!record.is_banned);
        assert!(!record.has_license());
        assert!(record.top_donors_all.is_empty());
    }
}
