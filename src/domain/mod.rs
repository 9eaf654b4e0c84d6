pub mod lead;
pub mod repositories;
pub mod user;

pub use lead::{
    Lead, LeadChanges, LeadFilter, LeadPredicate, LeadQuery, LeadRepositoryInterface, LeadSource,
    LeadStatus, NewLead, OneOrMany, SortField, SortOrder,
};
pub use repositories::{DomainResult, RepositoryProvider};
pub use user::{NewUser, User, UserRepositoryInterface};

pub use crate::shared::errors::DomainError;
