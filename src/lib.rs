//! # Lead Service
//!
//! REST backend for managing sales leads, with a filtered, paginated
//! listing endpoint at its center.
//!
//! ## Architecture
//!
//! - **domain**: entities, listing filter and predicate, repository traits
//! - **application**: lead and identity services
//! - **infrastructure**: SeaORM store, in-memory demo store, crypto
//! - **interfaces**: HTTP API with Swagger documentation
//! - **shared**: errors, pagination, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider};

pub use interfaces::{create_api_router, ApiContext};
