//! Identity module: registration, login and session lookup
//!
//! Contains the `UserService`, which owns password hashing and token
//! issuance for accounts.

pub mod service;

pub use service::{AuthResult, Registration, UserService};
