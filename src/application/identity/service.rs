//! User service: application-layer orchestration for accounts
//!
//! HTTP handlers stay thin and delegate here.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{DomainError, DomainResult, NewUser, User};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::shared::InfraError;

/// Authentication result returned after a successful login or registration
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

/// Validated registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self { repos, jwt_config }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check credentials and issue a token.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.repos.users().find_user_by_email(email).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let valid = verify_password(password, &user.password_hash).unwrap_or(false);
        if !valid {
            warn!(user_id = user.id, "Rejected login with wrong password");
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        info!(user_id = user.id, "User logged in");
        self.issue(user)
    }

    // ── Registration ────────────────────────────────────────────

    /// Create an account and log it in.
    pub async fn register(&self, registration: Registration) -> DomainResult<AuthResult> {
        if self
            .repos
            .users()
            .find_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(DomainError::duplicate_user_email());
        }

        let password_hash = hash_password(&registration.password)
            .map_err(|e| InfraError::Crypto(format!("Failed to hash password: {}", e)))?;

        let user = self
            .repos
            .users()
            .create_user(NewUser {
                email: registration.email,
                password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
            })
            .await?;

        info!(user_id = user.id, "New user registered");
        self.issue(user)
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Resolve the account behind a verified session.
    pub async fn current_user(&self, user_id: i32) -> DomainResult<User> {
        self.repos
            .users()
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("User not found".into()))
    }

    fn issue(&self, user: User) -> DomainResult<AuthResult> {
        let token = create_token(user.id, &user.email, &self.jwt_config)
            .map_err(|e| InfraError::Crypto(format!("Failed to create token: {}", e)))?;

        Ok(AuthResult {
            token,
            expires_in: self.jwt_config.expires_in(),
            user,
        })
    }
}
