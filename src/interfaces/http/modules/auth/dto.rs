//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::Registration;
use crate::domain::User;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email address")
    )]
    pub email: Option<String>,
    #[validate(required(message = "Password is required"))]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email address")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters long")
    )]
    pub password: Option<String>,
    #[validate(
        required(message = "First name is required"),
        length(min = 2, max = 100, message = "First name must be 2-100 characters long")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Last name is required"),
        length(min = 2, max = 100, message = "Last name must be 2-100 characters long")
    )]
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// Call only after validation has passed.
    pub fn into_registration(self) -> Registration {
        Registration {
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        }
    }
}

/// Public view of an account
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserInfo,
    /// Same JWT as the session cookie, for `Authorization: Bearer` clients
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    pub user: UserInfo,
}
