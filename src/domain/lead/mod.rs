//! Lead aggregate
//!
//! Contains the Lead entity, the listing filter and predicate, and the
//! repository interface.

pub mod filter;
pub mod model;
pub mod predicate;
pub mod repository;

pub use filter::{LeadFilter, OneOrMany, SortField, SortOrder};
pub use model::{
    max_lead_value, Lead, LeadChanges, LeadSource, LeadStatus, NewLead, LEAD_VALUE_TOO_LARGE,
};
pub use predicate::{like_pattern, Condition, LeadPredicate};
pub use repository::{LeadQuery, LeadRepositoryInterface};
