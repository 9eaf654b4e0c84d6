//! In-memory storage used in demo mode and tests

mod memory;
mod seed;

pub use memory::{InMemoryLeadRepository, InMemoryRepositoryProvider, InMemoryUserRepository};
pub use seed::{seed_demo_data, DEMO_EMAIL, DEMO_PASSWORD};
