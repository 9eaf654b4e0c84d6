//! Lead service: owner-scoped CRUD and filtered listing

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::repositories::RepositoryProvider;
use crate::domain::{
    DomainError, DomainResult, Lead, LeadChanges, LeadFilter, LeadQuery, NewLead,
};
use crate::shared::PaginatedResult;

pub struct LeadService {
    repos: Arc<dyn RepositoryProvider>,
}

impl LeadService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// One page of the owner's leads matching `filter`, with the total match count.
    pub async fn list_leads(
        &self,
        owner_id: i32,
        filter: &LeadFilter,
    ) -> DomainResult<PaginatedResult<Lead>> {
        let query = LeadQuery::new(owner_id, filter);
        let page = self.repos.leads().list_leads(&query).await?;
        debug!(
            user_id = owner_id,
            total = page.total,
            returned = page.items.len(),
            "Listed leads"
        );
        Ok(page)
    }

    pub async fn get_lead(&self, owner_id: i32, id: i32) -> DomainResult<Lead> {
        self.repos
            .leads()
            .find_lead(owner_id, id)
            .await?
            .ok_or_else(|| DomainError::lead_not_found(id))
    }

    pub async fn create_lead(&self, owner_id: i32, new_lead: NewLead) -> DomainResult<Lead> {
        if self
            .repos
            .leads()
            .email_taken(owner_id, &new_lead.email, None)
            .await?
        {
            return Err(DomainError::duplicate_lead_email());
        }

        let lead = self.repos.leads().insert_lead(owner_id, new_lead).await?;
        metrics::counter!("leads_created_total").increment(1);
        info!(lead_id = lead.id, user_id = owner_id, "Lead created");
        Ok(lead)
    }

    /// Apply a partial update. Callers resolve the lead first so a missing
    /// lead is reported before any input problem.
    pub async fn update_lead(
        &self,
        owner_id: i32,
        id: i32,
        changes: LeadChanges,
    ) -> DomainResult<Lead> {
        if changes.is_empty() {
            return Err(DomainError::invalid("No fields to update"));
        }

        if let Some(email) = &changes.email {
            if self
                .repos
                .leads()
                .email_taken(owner_id, email, Some(id))
                .await?
            {
                return Err(DomainError::duplicate_lead_email());
            }
        }

        let lead = self
            .repos
            .leads()
            .update_lead(owner_id, id, changes)
            .await?
            .ok_or_else(|| DomainError::lead_not_found(id))?;

        info!(lead_id = id, user_id = owner_id, "Lead updated");
        Ok(lead)
    }

    /// Remove a lead, returning its id.
    pub async fn delete_lead(&self, owner_id: i32, id: i32) -> DomainResult<i32> {
        if !self.repos.leads().delete_lead(owner_id, id).await? {
            return Err(DomainError::lead_not_found(id));
        }

        metrics::counter!("leads_deleted_total").increment(1);
        info!(lead_id = id, user_id = owner_id, "Lead deleted");
        Ok(id)
    }
}
