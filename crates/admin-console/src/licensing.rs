//! License lifecycle per user account: grant, extend, revoke.
//!
//! The state machine is `NONE -> ACTIVE -> (EXPIRED | NONE)`; expiry is
//! observed from the stored timestamp, never caused by a client operation.
//! Every mutation is a single remote call and the caller re-fetches the
//! record afterwards — the server owns all derived fields.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use streampass_client::ApiGateway;
use streampass_core::types::{AdminUserRecord, Plan};
use streampass_core::{ApiError, ApiResult, Role};

/// Default grant duration in days.
pub const DEFAULT_TTL_DAYS: u32 = 30;

/// Entitlement state derived from `plan` + `license_expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseState {
    /// No plan assigned (shown as "free" in staff tooling).
    None,
    /// Plan assigned, expiry absent or in the future.
    Active,
    /// Plan assigned, expiry in the past.
    Expired,
}

impl LicenseState {
    pub fn derive(plan: Option<&str>, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match (plan, expires_at) {
            (None, _) => Self::None,
            (Some(_), Some(expiry)) if expiry <= now => Self::Expired,
            (Some(_), _) => Self::Active,
        }
    }

    pub fn of_record(record: &AdminUserRecord) -> Self {
        Self::derive(
            record.tariff_id.as_deref(),
            record.license_expires_at,
            Utc::now(),
        )
    }
}

/// Plan choice for a grant. `Free` is not a plan — it clears the license
/// back to the NONE state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSelection {
    Free,
    Paid(String),
}

#[derive(Serialize)]
struct SetLicenseBody<'a> {
    plan: Option<&'a str>,
    ttl_days: u32,
}

#[derive(Serialize)]
struct ExtendLicenseBody {
    extend_days: u32,
}

#[derive(Serialize)]
struct EmptyBody {}

/// Superadmin-gated license operations against one target account.
pub struct LicenseAdmin {
    gateway: Arc<ApiGateway>,
    catalog: Vec<Plan>,
}

impl LicenseAdmin {
    /// `catalog` is the fetched paid-plan list used to validate grants.
    pub fn new(gateway: Arc<ApiGateway>, catalog: Vec<Plan>) -> Self {
        Self { gateway, catalog }
    }

    fn require_superadmin(operator: &Role) -> ApiResult<()> {
        if operator.can_mutate_roles_and_licenses() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("superadmin role required".into()))
        }
    }

    /// Grant a plan for `ttl_days` (default 30), or clear the license when
    /// the selection is `Free`. A paid plan must exist in the catalog.
    pub async fn grant(
        &self,
        operator: &Role,
        user_id: Uuid,
        selection: &PlanSelection,
        ttl_days: Option<u32>,
    ) -> ApiResult<()> {
        Self::require_superadmin(operator)?;

        let ttl_days = ttl_days.unwrap_or(DEFAULT_TTL_DAYS);
        if ttl_days == 0 {
            return Err(ApiError::BadRequest("ttl_days must be positive".into()));
        }

        let plan = match selection {
            PlanSelection::Free => None,
            PlanSelection::Paid(id) => {
                if !self.catalog.iter().any(|p| &p.id == id) {
                    return Err(ApiError::BadRequest(format!("unknown plan: {id}")));
                }
                Some(id.as_str())
            }
        };

        let _: serde_json::Value = self
            .gateway
            .post(
                &format!("/v2/admin/users/{user_id}/license/set"),
                &SetLicenseBody { plan, ttl_days },
            )
            .await?;
        info!(user_id = %user_id, plan = ?plan, ttl_days, "License set");
        Ok(())
    }

    /// Extend from the stored expiry. The server computes the new expiry as
    /// `stored expiry + days`, also when the license is already expired —
    /// extending never restarts the clock from now.
    pub async fn extend(
        &self,
        operator: &Role,
        record: &AdminUserRecord,
        days: u32,
    ) -> ApiResult<()> {
        Self::require_superadmin(operator)?;
        if !record.has_license() {
            return Err(ApiError::BadRequest("no license to extend".into()));
        }
        if days == 0 {
            return Err(ApiError::BadRequest("extend_days must be positive".into()));
        }

        let _: serde_json::Value = self
            .gateway
            .post(
                &format!("/v2/admin/users/{}/license/extend", record.id),
                &ExtendLicenseBody { extend_days: days },
            )
            .await?;
        info!(user_id = %record.id, days, "License extended");
        Ok(())
    }

    /// Revoke the license, clearing plan and expiry. Rejected locally when
    /// there is nothing to revoke — no request is issued.
    pub async fn revoke(&self, operator: &Role, record: &AdminUserRecord) -> ApiResult<()> {
        Self::require_superadmin(operator)?;
        if !record.has_license() {
            return Err(ApiError::BadRequest("no license to revoke".into()));
        }

        let _: serde_json::Value = self
            .gateway
            .post(
                &format!("/v2/admin/users/{}/license/revoke", record.id),
                &EmptyBody {},
            )
            .await?;
        info!(user_id = %record.id, "License revoked");
        Ok(())
    }

    /// Filter dropdown options: the `free` sentinel plus every catalog
    /// plan id, deduped in order.
    pub fn tariff_filter_options(&self) -> Vec<String> {
        let mut options = vec!["free".to_string()];
        for plan in &self.catalog {
            if !options.contains(&plan.id) {
                options.push(plan.id.clone());
            }
        }
        options
    }
}
