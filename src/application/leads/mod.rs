//! Lead use-cases: listing, lookup and mutations for the owning account

pub mod service;

pub use service::LeadService;
