//! Registration, login and session endpoints.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{User, UserRole};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::services::auth::{AuthService, Registration};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Full name must be 1-255 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub full_name: String,

    #[serde(default)]
    pub role: UserRole,

    pub organization_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone(), state.jwks.clone())
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    request.validate()?;

    let user = auth_service(&state)
        .register(Registration {
            email: request.email.trim(),
            password: &request.password,
            full_name: request.full_name.trim(),
            role: request.role,
            organization_id: request.organization_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    request.validate()?;

    let token = auth_service(&state)
        .login(request.email.trim(), &request.password)
        .await?;

    Ok(Json(TokenResponse {
        access_token: token.token,
        token_type: "bearer".to_string(),
        expires_in: token.expires_in,
    }))
}

/// GET /api/v1/auth/me
pub async fn me(user: CurrentUser) -> Json<User> {
    Json(user.0)
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Json<Value> {
    Json(json!({ "message": "Successfully logged out" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults_role() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@example.com","password":"longenough","full_name":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(request.role, UserRole::Contributor);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            email: "not-an-email".into(),
            password: "short".into(),
            full_name: "   ".into(),
            role: UserRole::Founder,
            organization_id: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("full_name"));
    }

    #[tokio::test]
    async fn test_logout_message() {
        let Json(body) = logout().await;
        assert_eq!(body["message"], "Successfully logged out");
    }
}
