use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::eligibility::Role;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "maria")]
    pub username: String,
    #[schema(example = "maria@example.com")]
    pub email: String,
    pub password: String,
    /// `individual` (default) or `business`. Admin accounts cannot be
    /// self-registered.
    #[schema(example = "individual")]
    pub role: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
    pub role: String,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            role: m.role,
            created_at: m.created_at,
        }
    }
}

/// Validate a registration payload and resolve the requested role.
pub fn validate_register_request(req: &RegisterRequest) -> Result<Role, AppError> {
    let username = req.username.trim();
    if username.len() < 3 || username.len() > 32 {
        return Err(AppError::Validation(
            "Username must be 3-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '-' and '_'".into(),
        ));
    }

    let email = req.email.trim();
    if email.len() > 254 || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    let role = match req.role.as_deref() {
        None => Role::Individual,
        Some(raw) => match Role::parse(raw) {
            Some(Role::Admin) | None => {
                return Err(AppError::Validation(
                    "Role must be 'individual' or 'business'".into(),
                ));
            }
            Some(role) => role,
        },
    };

    Ok(role)
}

pub fn validate_login_request(req: &LoginRequest) -> Result<(), AppError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    }
    Ok(())
}
