//! Staff console for the StreamPass user population — listing and filtering
//! accounts, mutating roles and licenses, and sending targeted notifications.
//!
//! # Modules
//!
//! - [`user_query`] — Filter/sort/paginate parameter engine for the user listing
//! - [`user_ops`] — Role assignment, ban toggle, account deletion
//! - [`licensing`] — License lifecycle (grant / extend / revoke) per account
//! - [`notifications`] — Audience resolution and notification dispatch

pub mod licensing;
pub mod notifications;
pub mod user_ops;
pub mod user_query;

pub use licensing::{LicenseAdmin, LicenseState, PlanSelection, DEFAULT_TTL_DAYS};
pub use notifications::{
    Audience, NotificationDraft, NotificationSender, NotificationType, Severity, Targeting,
};
pub use user_ops::UserOps;
pub use user_query::{
    Activity, Platform, SortDir, SortKey, TopDonorsWindow, UserDirectory, UserPage, UserQuery,
};
