//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user_role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Founder,
    Admin,
    Contributor,
    Auditor,
}

impl From<UserRoleDb> for domain::models::UserRole {
    fn from(db: UserRoleDb) -> Self {
        match db {
            UserRoleDb::Founder => Self::Founder,
            UserRoleDb::Admin => Self::Admin,
            UserRoleDb::Contributor => Self::Contributor,
            UserRoleDb::Auditor => Self::Auditor,
        }
    }
}

impl From<domain::models::UserRole> for UserRoleDb {
    fn from(domain: domain::models::UserRole) -> Self {
        match domain {
            domain::models::UserRole::Founder => Self::Founder,
            domain::models::UserRole::Admin => Self::Admin,
            domain::models::UserRole::Contributor => Self::Contributor,
            domain::models::UserRole::Auditor => Self::Auditor,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRoleDb,
    pub is_active: bool,
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            full_name: entity.full_name,
            role: entity.role.into(),
            is_active: entity.is_active,
            organization_id: entity.organization_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
