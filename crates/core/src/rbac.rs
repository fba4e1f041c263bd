//! Role parsing and capability gating.
//!
//! Only two decisions matter to the client: may this role open the admin
//! console at all, and may it mutate roles and licenses. Everything between
//! `user` and `superadmin` is an opaque staff tier.

use serde::{Deserialize, Serialize};

/// Account role, parsed from the raw role string the backend returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Default tier; no administrative capabilities.
    User,
    /// Any non-`user` role other than `superadmin` (e.g. `staff`, `admin`).
    Staff(String),
    /// The sole role permitted to mutate roles and licenses.
    Superadmin,
}

impl Role {
    /// Parse a raw role string. Absent, empty, or whitespace-only input
    /// falls back to `User` — never to an elevated tier.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => return Self::User,
        };
        let lowered = raw.to_lowercase();
        match lowered.as_str() {
            "user" => Self::User,
            "superadmin" => Self::Superadmin,
            _ => Self::Staff(lowered),
        }
    }

    /// Staff tiers and above may open the admin console.
    pub fn can_view_admin_console(&self) -> bool {
        !matches!(self, Self::User)
    }

    /// Only `superadmin` may change roles, grant/extend/revoke licenses,
    /// ban, or delete accounts.
    pub fn can_mutate_roles_and_licenses(&self) -> bool {
        matches!(self, Self::Superadmin)
    }

    /// Raw string form for wire use and display.
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Staff(name) => name,
            Self::Superadmin => "superadmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!(Role::parse(Some("user")), Role::User);
        assert_eq!(Role::parse(Some("superadmin")), Role::Superadmin);
        assert_eq!(Role::parse(Some("SuperAdmin")), Role::Superadmin);
        assert_eq!(Role::parse(Some("Staff")), Role::Staff("staff".into()));
        assert_eq!(Role::parse(Some("admin")), Role::Staff("admin".into()));
    }

    #[test]
    fn test_absent_role_defaults_to_least_privilege() {
        assert_eq!(Role::parse(None), Role::User);
        assert_eq!(Role::parse(Some("")), Role::User);
        assert_eq!(Role::parse(Some("   ")), Role::User);
    }

    #[test]
    fn test_console_access() {
        assert!(!Role::User.can_view_admin_console());
        assert!(Role::Staff("staff".into()).can_view_admin_console());
        assert!(Role::Superadmin.can_view_admin_console());
    }

    #[test]
    fn test_only_superadmin_mutates() {
        assert!(!Role::parse(Some("Staff")).can_mutate_roles_and_licenses());
        assert!(!Role::parse(Some("unknown-role")).can_mutate_roles_and_licenses());
        assert!(Role::parse(Some("superadmin")).can_mutate_roles_and_licenses());
        assert!(Role::Superadmin.can_mutate_roles_and_licenses());
    }
}
