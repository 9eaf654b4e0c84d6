//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{LeadRepositoryInterface, UserRepositoryInterface};

use super::lead_repository::SeaOrmLeadRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let lead = repos.leads().find_lead(owner_id, 42).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    leads: SeaOrmLeadRepository,
    users: SeaOrmUserRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            leads: SeaOrmLeadRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn leads(&self) -> &dyn LeadRepositoryInterface {
        &self.leads
    }

    fn users(&self) -> &dyn UserRepositoryInterface {
        &self.users
    }
}
