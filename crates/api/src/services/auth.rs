//! Authentication service for registration, login and token resolution.

use domain::models::{User, UserRole};
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_password_strength, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::jwks::JwksVerifier;

/// Industry recorded on organizations created during founder sign-up.
const DEFAULT_INDUSTRY: &str = "Technology";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    UserDisabled,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Organization not found")]
    OrganizationNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::WeakPassword(msg) => ApiError::Validation(msg),
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::UserDisabled => ApiError::Forbidden(err.to_string()),
            AuthError::OrganizationNotFound => ApiError::NotFound(err.to_string()),
            AuthError::DatabaseError(db_err) => ApiError::from(db_err),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Input for a new account.
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
}

/// Issued access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
    jwks: Option<Arc<JwksVerifier>>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>, jwks: Option<Arc<JwksVerifier>>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
            jwks,
        }
    }

    /// Creates an account. A founder without an organization gets a new one.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        check_password_strength(registration.password)
            .map_err(|e| AuthError::WeakPassword(e.to_string()))?;

        if self
            .users
            .find_by_email(registration.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(registration.password)?;

        let created = match (registration.organization_id, registration.role) {
            (None, UserRole::Founder) => {
                let organization_name = format!("{}'s Organization", registration.full_name);
                self.users
                    .create_with_organization(
                        registration.email,
                        &password_hash,
                        registration.full_name,
                        registration.role,
                        &organization_name,
                        Some(DEFAULT_INDUSTRY),
                    )
                    .await
            }
            (organization_id, role) => {
                self.users
                    .create(
                        registration.email,
                        &password_hash,
                        registration.full_name,
                        role,
                        organization_id,
                    )
                    .await
            }
        };

        let user = match created {
            Ok(user) => user,
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23503") => {
                return Err(AuthError::OrganizationNotFound)
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            user_id = %user.id,
            organization_id = ?user.organization_id,
            role = ?user.role,
            "User registered"
        );

        Ok(user.into())
    }

    /// Checks credentials and issues an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let (token, _jti) = self.jwt.generate_access_token(user.id)?;
        tracing::info!(user_id = %user.id, "Login successful");

        Ok(AccessToken {
            token,
            expires_in: self.jwt.access_token_expiry_secs,
        })
    }

    /// Resolves a bearer token to its user.
    ///
    /// External tokens are tried first when a key set is configured; any
    /// failure there falls back to local validation.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        if let Some(jwks) = &self.jwks {
            match jwks.verify(token).await {
                Ok(claims) => {
                    if let Some(user) = self.resolve_external(&claims.sub, claims.email.as_deref()).await? {
                        return Ok(user);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "External token verification failed"),
            }
        }

        let claims = self
            .jwt
            .validate_access_token(token)
            .map_err(|_| AuthError::InvalidToken)?;
        let user_id = shared::jwt::extract_user_id(&claims).map_err(|_| AuthError::InvalidToken)?;

        self.users
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or(AuthError::InvalidToken)
    }

    async fn resolve_external(
        &self,
        subject: &str,
        email: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        if let Ok(user_id) = Uuid::parse_str(subject) {
            if let Some(user) = self.users.find_by_id(user_id).await? {
                return Ok(Some(user.into()));
            }
        }
        match email {
            Some(email) => Ok(self.users.find_by_email(email).await?.map(User::from)),
            None => Ok(None),
        }
    }
}
