//! Subscription plan catalog.

use std::sync::Arc;

use streampass_core::types::{Plan, PlansResponse};
use streampass_core::ApiResult;

use crate::gateway::ApiGateway;

pub struct PlanCatalog {
    gateway: Arc<ApiGateway>,
}

impl PlanCatalog {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch the paid plan catalog. The `free` tier is not a plan — it is
    /// the label for the no-license state and never appears here.
    pub async fn list(&self) -> ApiResult<Vec<Plan>> {
        let response: PlansResponse = self.gateway.get("/v2/license/plans").await?;
        Ok(response.items)
    }
}
