//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Role of a user inside their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Founder,
    Admin,
    Contributor,
    Auditor,
}

impl UserRole {
    /// Roles that may manage organization settings, exports and deletions.
    pub const MANAGERS: &'static [UserRole] = &[UserRole::Founder, UserRole::Admin];

    /// Roles that may review evidence.
    pub const REVIEWERS: &'static [UserRole] =
        &[UserRole::Founder, UserRole::Admin, UserRole::Auditor];

    pub fn is_one_of(&self, allowed: &[UserRole]) -> bool {
        allowed.contains(self)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Contributor
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "founder" => Ok(UserRole::Founder),
            "admin" => Ok(UserRole::Admin),
            "contributor" => Ok(UserRole::Contributor),
            "auditor" => Ok(UserRole::Auditor),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Founder => write!(f, "Founder"),
            UserRole::Admin => write!(f, "Admin"),
            UserRole::Contributor => write!(f, "Contributor"),
            UserRole::Auditor => write!(f, "Auditor"),
        }
    }
}

/// User as exposed to handlers. The password hash never leaves persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from_str("Founder").unwrap(), UserRole::Founder);
        assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
        assert_eq!(UserRole::from_str("AUDITOR").unwrap(), UserRole::Auditor);
        assert!(UserRole::from_str("owner").is_err());
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in [
            UserRole::Founder,
            UserRole::Admin,
            UserRole::Contributor,
            UserRole::Auditor,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
        }
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::Admin.is_one_of(UserRole::MANAGERS));
        assert!(!UserRole::Auditor.is_one_of(UserRole::MANAGERS));
        assert!(UserRole::Auditor.is_one_of(UserRole::REVIEWERS));
        assert!(!UserRole::Contributor.is_one_of(UserRole::REVIEWERS));
    }

    #[test]
    fn test_default_role() {
        assert_eq!(UserRole::default(), UserRole::Contributor);
    }
}
