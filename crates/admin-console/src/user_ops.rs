//! Account-level staff operations: role assignment, ban toggle, deletion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use streampass_client::ApiGateway;
use streampass_core::{ApiError, ApiResult, Role};

#[derive(Serialize)]
struct SetRoleBody<'a> {
    role: &'a str,
}

#[derive(Serialize)]
struct SetBanBody<'a> {
    banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RoleItem {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RolesResponse {
    items: Vec<RoleItem>,
}

pub struct UserOps {
    gateway: Arc<ApiGateway>,
}

impl UserOps {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    fn require_superadmin(operator: &Role) -> ApiResult<()> {
        if operator.can_mutate_roles_and_licenses() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("superadmin role required".into()))
        }
    }

    /// List assignable role ids.
    pub async fn list_roles(&self, operator: &Role) -> ApiResult<Vec<String>> {
        Self::require_superadmin(operator)?;
        let response: RolesResponse = self.gateway.get("/v2/admin/roles").await?;
        Ok(response.items.into_iter().map(|r| r.id).collect())
    }

    pub async fn set_role(&self, operator: &Role, user_id: Uuid, role: &str) -> ApiResult<()> {
        Self::require_superadmin(operator)?;
        let _: serde_json::Value = self
            .gateway
            .patch(
                &format!("/v2/admin/users/{user_id}/role"),
                &SetRoleBody { role },
            )
            .await?;
        info!(user_id = %user_id, role, "Role changed");
        Ok(())
    }

    pub async fn set_ban(
        &self,
        operator: &Role,
        user_id: Uuid,
        banned: bool,
        reason: Option<&str>,
    ) -> ApiResult<()> {
        Self::require_superadmin(operator)?;
        let _: serde_json::Value = self
            .gateway
            .post(
                &format!("/v2/admin/users/{user_id}/ban"),
                &SetBanBody { banned, reason },
            )
            .await?;
        info!(user_id = %user_id, banned, "Ban status changed");
        Ok(())
    }

    /// Irreversible account deletion.
    pub async fn delete(&self, operator: &Role, user_id: Uuid) -> ApiResult<()> {
        Self::require_superadmin(operator)?;
        let _: serde_json::Value = self
            .gateway
            .delete(&format!("/v2/admin/users/{user_id}"))
            .await?;
        info!(user_id = %user_id, "User deleted");
        Ok(())
    }
}
