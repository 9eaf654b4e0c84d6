//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod lead_repository;
pub mod lead_sql;
pub mod repository_provider;
pub mod user_repository;

pub use lead_repository::SeaOrmLeadRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use user_repository::SeaOrmUserRepository;
