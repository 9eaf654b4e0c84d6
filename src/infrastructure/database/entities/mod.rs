//! Database entities module

pub mod lead;
pub mod user;

pub use lead::Entity as Lead;
pub use user::Entity as User;
