//! Role model: a global ceiling role plus per-institution local roles.

use serde::{Deserialize, Serialize};

/// Account-wide role, independent of any institution.
///
/// This is a ceiling, not the operative permission: except for `Master`, what
/// an account may do inside an institution is decided solely by its
/// [`crate::Membership`] there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    /// Bypasses tenant scoping for every action, including permanent delete.
    Master,
    Admin,
    Professor,
}

impl GlobalRole {
    pub fn is_master(&self) -> bool {
        matches!(self, GlobalRole::Master)
    }
}

impl core::fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GlobalRole::Master => write!(f, "master"),
            GlobalRole::Admin => write!(f, "admin"),
            GlobalRole::Professor => write!(f, "professor"),
        }
    }
}

/// Role an account holds within one specific institution.
///
/// An account may hold different local roles in different institutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalRole {
    Admin,
    Professor,
}

impl LocalRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, LocalRole::Admin)
    }
}

impl core::fmt::Display for LocalRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LocalRole::Admin => write!(f, "admin"),
            LocalRole::Professor => write!(f, "professor"),
        }
    }
}
