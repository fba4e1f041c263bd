//! Targeted notification dispatch.
//!
//! A notification is built once, validated cheaply (title/body first), its
//! audience resolved into a concrete [`Targeting`] descriptor, and sent as a
//! single `POST /v2/admin/notifications`. Descriptors are constructed only
//! through [`resolve_targeting`] — callers never hand-build the wire shape.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use streampass_client::ApiGateway;
use streampass_core::{ApiError, ApiResult, Role};

/// Notification severity shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Promo,
}

/// Product vs marketing classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Product,
    Marketing,
}

/// Audience choice as selected in the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    All,
    MissingEmail,
    Plan,
    Users,
}

/// Resolved, validated targeting descriptor. `ByPlan` and `ByUsernames`
/// always carry a non-empty, deduped selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targeting {
    AllUsers,
    MissingEmail,
    ByPlan(Vec<String>),
    ByUsernames(Vec<String>),
}

/// Split a selector on commas/newlines, trim, drop empties, dedupe in order.
fn clean_selector(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(['\n', ',']) {
        let part = part.trim();
        if part.is_empty() || out.iter().any(|p| p == part) {
            continue;
        }
        out.push(part.to_string());
    }
    out
}

/// Resolve an audience choice plus its selector string into a descriptor.
pub fn resolve_targeting(audience: Audience, value: &str) -> ApiResult<Targeting> {
    match audience {
        Audience::All => Ok(Targeting::AllUsers),
        Audience::MissingEmail => Ok(Targeting::MissingEmail),
        Audience::Plan => {
            let plans = clean_selector(value);
            if plans.is_empty() {
                return Err(ApiError::BadRequest("tariff id required".into()));
            }
            Ok(Targeting::ByPlan(plans))
        }
        Audience::Users => {
            let names = clean_selector(value);
            if names.is_empty() {
                return Err(ApiError::BadRequest("usernames required".into()));
            }
            Ok(Targeting::ByUsernames(names))
        }
    }
}

/// Immutable message value, constructed once per send.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub severity: Severity,
    pub notification_type: NotificationType,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl NotificationDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            link: None,
            severity: Severity::Promo,
            notification_type: NotificationType::Marketing,
            starts_at: None,
            ends_at: None,
        }
    }

    /// Cheap field validation, checked before targeting is even resolved.
    pub fn validate(&self) -> ApiResult<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::BadRequest("title required".into()));
        }
        if self.body.trim().is_empty() {
            return Err(ApiError::BadRequest("body required".into()));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct TargetingBody<'a> {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    all_users: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    missing_email: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plans: Option<&'a [String]>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    users: bool,
}

impl<'a> TargetingBody<'a> {
    fn of(targeting: &'a Targeting) -> Self {
        let mut body = Self {
            all_users: false,
            missing_email: false,
            plans: None,
            users: false,
        };
        match targeting {
            Targeting::AllUsers => body.all_users = true,
            Targeting::MissingEmail => {
                body.all_users = true;
                body.missing_email = true;
            }
            Targeting::ByPlan(plans) => {
                body.all_users = true;
                body.plans = Some(plans);
            }
            Targeting::ByUsernames(_) => body.users = true,
        }
        body
    }
}

/// Wire body for `POST /v2/admin/notifications`.
#[derive(Serialize)]
struct NotificationBody<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(rename = "type")]
    notification_type: NotificationType,
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ends_at: Option<DateTime<Utc>>,
    targeting: TargetingBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_usernames: Option<&'a [String]>,
}

fn request_body<'a>(draft: &'a NotificationDraft, targeting: &'a Targeting) -> NotificationBody<'a> {
    let target_usernames = match targeting {
        Targeting::ByUsernames(names) => Some(names.as_slice()),
        _ => None,
    };
    NotificationBody {
        title: draft.title.trim(),
        body: draft.body.trim(),
        notification_type: draft.notification_type,
        severity: draft.severity,
        link: draft.link.as_deref().map(str::trim).filter(|l| !l.is_empty()),
        starts_at: draft.starts_at,
        ends_at: draft.ends_at,
        targeting: TargetingBody::of(targeting),
        target_usernames,
    }
}

#[derive(Debug, Deserialize)]
pub struct NotificationReceipt {
    pub id: Uuid,
}

pub struct NotificationSender {
    gateway: Arc<ApiGateway>,
}

impl NotificationSender {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Validate the draft, resolve the audience, and dispatch. Staff tier
    /// required.
    pub async fn send(
        &self,
        operator: &Role,
        draft: &NotificationDraft,
        audience: Audience,
        selector: &str,
    ) -> ApiResult<NotificationReceipt> {
        if !operator.can_view_admin_console() {
            return Err(ApiError::Forbidden("staff role required".into()));
        }
        draft.validate()?;
        let targeting = resolve_targeting(audience, selector)?;

        let receipt: NotificationReceipt = self
            .gateway
            .post("/v2/admin/notifications", &request_body(draft, &targeting))
            .await?;
        info!(notification_id = %receipt.id, audience = ?audience, "Notification sent");
        Ok(receipt)
    }
}
