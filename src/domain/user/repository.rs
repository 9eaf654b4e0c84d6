use async_trait::async_trait;

use super::{NewUser, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// A taken email yields `DomainError::Conflict`.
    async fn create_user(&self, user: NewUser) -> DomainResult<User>;

    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn find_user_by_id(&self, id: i32) -> DomainResult<Option<User>>;
}
