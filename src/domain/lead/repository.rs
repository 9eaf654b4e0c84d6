use async_trait::async_trait;

use super::{Lead, LeadChanges, LeadFilter, LeadPredicate, NewLead, SortField, SortOrder};
use crate::domain::DomainResult;
use crate::shared::{PageRequest, PaginatedResult};

/// Everything a store needs to produce one page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct LeadQuery {
    pub predicate: LeadPredicate,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}

impl LeadQuery {
    pub fn new(owner_id: i32, filter: &LeadFilter) -> Self {
        Self {
            predicate: LeadPredicate::build(owner_id, filter),
            sort_by: filter.sort_by,
            sort_order: filter.sort_order,
            page: filter.page,
        }
    }
}

/// Lead persistence. Every operation is scoped to the owning account; a
/// lead belonging to someone else behaves as if it does not exist.
#[async_trait]
pub trait LeadRepositoryInterface: Send + Sync {
    /// Store a new lead. A duplicate `(owner, email)` yields `DomainError::Conflict`.
    async fn insert_lead(&self, owner_id: i32, lead: NewLead) -> DomainResult<Lead>;

    async fn find_lead(&self, owner_id: i32, id: i32) -> DomainResult<Option<Lead>>;

    /// Whether another lead of this owner already uses `email`.
    async fn email_taken(
        &self,
        owner_id: i32,
        email: &str,
        exclude_id: Option<i32>,
    ) -> DomainResult<bool>;

    /// Count matching rows, then fetch the requested page with the same predicate.
    async fn list_leads(&self, query: &LeadQuery) -> DomainResult<PaginatedResult<Lead>>;

    async fn update_lead(
        &self,
        owner_id: i32,
        id: i32,
        changes: LeadChanges,
    ) -> DomainResult<Option<Lead>>;

    /// Returns `false` when nothing was removed.
    async fn delete_lead(&self, owner_id: i32, id: i32) -> DomainResult<bool>;
}
