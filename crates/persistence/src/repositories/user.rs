//! User repository for database operations.

use domain::models::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{OrganizationEntity, UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, is_active, organization_id, created_at, updated_at";

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email address, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a user, optionally attached to an existing organization.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: UserRole,
        organization_id: Option<Uuid>,
    ) -> Result<UserEntity, sqlx::Error> {
        sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, organization_id)
            VALUES (LOWER($1), $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(UserRoleDb::from(role))
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Create an organization and its first user in one transaction.
    pub async fn create_with_organization(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: UserRole,
        organization_name: &str,
        industry: Option<&str>,
    ) -> Result<UserEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let organization = sqlx::query_as::<_, OrganizationEntity>(
            r#"
            INSERT INTO organizations (name, industry)
            VALUES ($1, $2)
            RETURNING id, name, industry, employee_count, compliance_targets, created_at, updated_at
            "#,
        )
        .bind(organization_name)
        .bind(industry)
        .fetch_one(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, role, organization_id)
            VALUES (LOWER($1), $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(UserRoleDb::from(role))
        .bind(organization.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Whether a user with this id belongs to the organization.
    pub async fn is_member(&self, user_id: Uuid, organization_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND organization_id = $2)
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await
    }
}
