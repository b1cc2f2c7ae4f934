//! Account roles and the landing page each role is routed to.

use serde::{Deserialize, Serialize};

/// Account role as issued by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A client booking care for a senior.
    #[default]
    User,
    /// A care specialist. Only verified helpers reach the helper terminal.
    Helper,
    /// Registry administrator.
    Admin,
}

impl Role {
    /// Lowercase wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Helper => "helper",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "helper" => Ok(Self::Helper),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// The dashboard an authenticated account belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landing {
    /// `/admin` - the admin terminal.
    AdminTerminal,
    /// `/helper` - the verified helper terminal.
    HelperTerminal,
    /// `/dashboard` - the client dashboard (also unverified helpers).
    ClientDashboard,
}

impl Landing {
    /// Decide where an account lands from its role and verification flag.
    ///
    /// ```
    /// use silver_connect_core::{Landing, Role};
    ///
    /// assert_eq!(Landing::for_account(Role::Admin, false), Landing::AdminTerminal);
    /// assert_eq!(Landing::for_account(Role::Helper, true), Landing::HelperTerminal);
    /// assert_eq!(Landing::for_account(Role::Helper, false), Landing::ClientDashboard);
    /// assert_eq!(Landing::for_account(Role::User, true), Landing::ClientDashboard);
    /// ```
    #[must_use]
    pub const fn for_account(role: Role, is_verified: bool) -> Self {
        match role {
            Role::Admin => Self::AdminTerminal,
            Role::Helper if is_verified => Self::HelperTerminal,
            Role::Helper | Role::User => Self::ClientDashboard,
        }
    }

    /// Route path of the landing page.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::AdminTerminal => "/admin",
            Self::HelperTerminal => "/helper",
            Self::ClientDashboard => "/dashboard",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_lowercase() {
        let role: Role = serde_json::from_str("\"helper\"").unwrap();
        assert_eq!(role, Role::Helper);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_role_from_str_rejects_unknown() {
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
    }

    #[test]
    fn test_admin_lands_on_terminal_regardless_of_verification() {
        assert_eq!(Landing::for_account(Role::Admin, true).path(), "/admin");
        assert_eq!(Landing::for_account(Role::Admin, false).path(), "/admin");
    }

    #[test]
    fn test_helper_landing_depends_on_verification() {
        assert_eq!(Landing::for_account(Role::Helper, true).path(), "/helper");
        assert_eq!(Landing::for_account(Role::Helper, false).path(), "/dashboard");
    }
}
