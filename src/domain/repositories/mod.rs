//! Repository access for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to the per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::lead::LeadRepositoryInterface;
use super::user::UserRepositoryInterface;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Implemented once for the SeaORM store and once for the in-memory demo
/// store; the rest of the service only sees this trait.
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let user = repos.users().find_user_by_id(1).await?;
///     let lead = repos.leads().find_lead(1, 42).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn leads(&self) -> &dyn LeadRepositoryInterface;
    fn users(&self) -> &dyn UserRepositoryInterface;
}
