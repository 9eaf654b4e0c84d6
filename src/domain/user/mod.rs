//! Account aggregate: the owners of leads

pub mod model;
pub mod repository;

pub use model::{NewUser, User};
pub use repository::UserRepositoryInterface;
