//! Actor roles and the permissions they grant.
//!
//! Authentication happens upstream; callers hand the core an actor whose
//! role is already known. The core only answers "may this role do X".

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Stored role value for administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Stored role value for plantation managers.
pub const ROLE_MANAGER: &str = "manager";
/// Stored role value for read-only viewers.
pub const ROLE_VIEWER: &str = "viewer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Viewer,
}

/// Operation classes gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewDashboard,
    ViewMonitoring,
    ExportTreeLocations,
    SeedSampleData,
    ManageUsers,
}

impl Permission {
    /// Stable lowercase label used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewDashboard => "view_dashboard",
            Self::ViewMonitoring => "view_monitoring",
            Self::ExportTreeLocations => "export_tree_locations",
            Self::SeedSampleData => "seed_sample_data",
            Self::ManageUsers => "manage_users",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Role {
    /// Lowercase label accepted by `parse_role`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Manager => ROLE_MANAGER,
            Self::Viewer => ROLE_VIEWER,
        }
    }

    /// Whether this role grants `permission`.
    pub fn allows(self, permission: Permission) -> bool {
        match self {
            Self::Admin => true,
            Self::Manager => permission != Permission::ManageUsers,
            Self::Viewer => matches!(
                permission,
                Permission::ViewDashboard
                    | Permission::ViewMonitoring
                    | Permission::ExportTreeLocations
            ),
        }
    }

    /// Returns `AccessDenied` when this role lacks `permission`.
    pub fn ensure(self, permission: Permission) -> Result<(), AccessDenied> {
        if self.allows(permission) {
            Ok(())
        } else {
            Err(AccessDenied {
                role: self,
                permission,
            })
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one role from its stored lowercase value.
pub fn parse_role(value: &str) -> Result<Role, RoleError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(RoleError::EmptyRole);
    }

    match normalized {
        ROLE_ADMIN => Ok(Role::Admin),
        ROLE_MANAGER => Ok(Role::Manager),
        ROLE_VIEWER => Ok(Role::Viewer),
        other => Err(RoleError::UnsupportedRole(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    #[error("role value must not be empty")]
    EmptyRole,
    #[error("role is unsupported: {0}")]
    UnsupportedRole(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("role `{role}` is not allowed to {permission}")]
pub struct AccessDenied {
    pub role: Role,
    pub permission: Permission,
}
