//! Filter/sort/pagination engine for the admin user listing.
//!
//! A [`UserQuery`] is a value the view mutates through setters; every filter
//! or sort change resets the offset to zero, because paging into a result set
//! that just changed shape is undefined. The listing request itself is a
//! single `GET /v2/admin/users` built deterministically from the query.

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use streampass_client::ApiGateway;
use streampass_core::types::AdminUserRecord;
use streampass_core::{ApiError, ApiResult, Role};

/// Default page size for the user listing.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Activity filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Online,
    /// No login within the given number of days.
    Inactive { within_days: u32 },
}

/// Client platform filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
    Desktop,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
        }
    }
}

/// Server-side sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    LastLoginAt,
    TotalCoins,
    TodayCoins,
    Last7dCoins,
    Last30dCoins,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::LastLoginAt => "last_login_at",
            Self::TotalCoins => "total_coins",
            Self::TodayCoins => "today_coins",
            Self::Last7dCoins => "last_7d_coins",
            Self::Last30dCoins => "last_30d_coins",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Aggregation window for the top-donors preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopDonorsWindow {
    Today,
    Last7d,
    Last30d,
    AllTime,
}

/// Composed listing parameters. All filters are optional and AND-combined
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    q: String,
    activity: Option<Activity>,
    platform: Option<Platform>,
    region: Option<String>,
    tariff_id: Option<String>,
    has_donations: bool,
    sort_by: SortKey,
    sort_dir: SortDir,
    page_size: u32,
    offset: u32,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl UserQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            q: String::new(),
            activity: None,
            platform: None,
            region: None,
            tariff_id: None,
            has_donations: false,
            sort_by: SortKey::CreatedAt,
            sort_dir: SortDir::Desc,
            page_size,
            offset: 0,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Free-text search over username/email.
    pub fn set_search(&mut self, q: impl Into<String>) {
        self.q = q.into();
        self.offset = 0;
    }

    pub fn set_activity(&mut self, activity: Option<Activity>) {
        self.activity = activity;
        self.offset = 0;
    }

    pub fn set_platform(&mut self, platform: Option<Platform>) {
        self.platform = platform;
        self.offset = 0;
    }

    pub fn set_region(&mut self, region: Option<String>) {
        self.region = region;
        self.offset = 0;
    }

    /// Tariff filter; only ever sent for superadmin operators.
    pub fn set_tariff_id(&mut self, tariff_id: Option<String>) {
        self.tariff_id = tariff_id;
        self.offset = 0;
    }

    pub fn set_has_donations(&mut self, has_donations: bool) {
        self.has_donations = has_donations;
        self.offset = 0;
    }

    pub fn set_sort(&mut self, sort_by: SortKey, sort_dir: SortDir) {
        self.sort_by = sort_by;
        self.sort_dir = sort_dir;
        self.offset = 0;
    }

    /// Top-donors preset: sugar over has-donations + a coin sort, not a
    /// separate server concept.
    pub fn apply_top_donors(&mut self, window: TopDonorsWindow) {
        self.has_donations = true;
        self.sort_dir = SortDir::Desc;
        self.sort_by = match window {
            TopDonorsWindow::Today => SortKey::TodayCoins,
            TopDonorsWindow::Last7d => SortKey::Last7dCoins,
            TopDonorsWindow::Last30d => SortKey::Last30dCoins,
            TopDonorsWindow::AllTime => SortKey::TotalCoins,
        };
        self.offset = 0;
    }

    pub fn next_page(&mut self) {
        self.offset += self.page_size;
    }

    /// Retreat one page, clamped at zero.
    pub fn prev_page(&mut self) {
        self.offset = self.offset.saturating_sub(self.page_size);
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    /// Recomputed from the reported total — never from whether the last
    /// page came back full.
    pub fn has_next(&self, total: u64) -> bool {
        u64::from(self.offset) + u64::from(self.page_size) < total
    }

    /// Deterministic query-string parameters for the listing request.
    /// The tariff filter is dropped for non-superadmin operators.
    pub fn to_params(&self, superadmin: bool) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let push = |params: &mut Vec<(String, String)>, k: &str, v: String| {
            params.push((k.to_string(), v));
        };

        if !self.q.trim().is_empty() {
            push(&mut params, "q", self.q.trim().to_string());
        }
        match self.activity {
            Some(Activity::Online) => push(&mut params, "activity", "online".into()),
            Some(Activity::Inactive { within_days }) => {
                push(&mut params, "activity", "inactive".into());
                push(&mut params, "inactive_days", within_days.to_string());
            }
            None => {}
        }
        if let Some(platform) = self.platform {
            push(&mut params, "platform", platform.as_str().into());
        }
        if let Some(region) = self.region.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            push(&mut params, "region", region.to_string());
        }
        if superadmin {
            if let Some(tariff) = &self.tariff_id {
                push(&mut params, "tariff_id", tariff.clone());
            }
        }
        if self.has_donations {
            push(&mut params, "has_donations", "true".into());
        }
        push(&mut params, "sort_by", self.sort_by.as_str().into());
        push(&mut params, "sort_dir", self.sort_dir.as_str().into());
        push(&mut params, "limit", self.page_size.to_string());
        push(&mut params, "offset", self.offset.to_string());
        params
    }
}

/// One page of the admin user listing.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPage {
    pub items: Vec<AdminUserRecord>,
    pub total: u64,
}

/// Executes [`UserQuery`] listings through the gateway.
pub struct UserDirectory {
    gateway: Arc<ApiGateway>,
}

impl UserDirectory {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Run the listing. Staff tier required; the tariff filter only takes
    /// effect for superadmin operators.
    pub async fn list(&self, query: &UserQuery, operator: &Role) -> ApiResult<UserPage> {
        if !operator.can_view_admin_console() {
            return Err(ApiError::Forbidden("staff role required".into()));
        }
        let params = query.to_params(operator.can_mutate_roles_and_licenses());
        debug!(offset = query.offset(), "Listing users");
        self.gateway.get_query("/v2/admin/users", &params).await
    }

    /// Re-fetch a single record after a mutation (read-your-writes by
    /// re-query; the server owns all derived fields).
    pub async fn refetch(
        &self,
        username: &str,
        operator: &Role,
    ) -> ApiResult<Option<AdminUserRecord>> {
        let mut query = UserQuery::default();
        query.set_search(username);
        let page = self.list(&query, operator).await?;
        Ok(page.items.into_iter().find(|u| u.username == username))
    }
}
