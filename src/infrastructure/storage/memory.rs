//! In-memory repositories for demo mode and testing

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::domain::lead::{max_lead_value, LEAD_VALUE_TOO_LARGE};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::{
    DomainError, DomainResult, Lead, LeadChanges, LeadQuery, LeadRepositoryInterface, NewLead,
    NewUser, SortField, SortOrder, User, UserRepositoryInterface,
};
use crate::shared::PaginatedResult;

// ── Leads ───────────────────────────────────────────────────────

/// Leads keyed by id, with a `(owner, email)` index claimed atomically
pub struct InMemoryLeadRepository {
    leads: DashMap<i32, Lead>,
    emails: DashMap<(i32, String), i32>,
    lead_counter: AtomicI32,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self {
            leads: DashMap::new(),
            emails: DashMap::new(),
            lead_counter: AtomicI32::new(1),
        }
    }

    /// Mirrors the SQL store, whose cents column is an `i64`.
    fn check_value(value: Option<Decimal>) -> DomainResult<()> {
        match value {
            Some(v) if v > max_lead_value() => {
                Err(DomainError::validation(vec![LEAD_VALUE_TOO_LARGE.to_string()]))
            }
            _ => Ok(()),
        }
    }

    /// Insert with an explicit creation time.
    pub fn insert_at(
        &self,
        owner_id: i32,
        new_lead: NewLead,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Lead> {
        Self::check_value(Some(new_lead.lead_value))?;
        let id = self.lead_counter.fetch_add(1, Ordering::SeqCst);

        match self.emails.entry((owner_id, new_lead.email.clone())) {
            Entry::Occupied(_) => return Err(DomainError::duplicate_lead_email()),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let lead = new_lead.into_lead(id, owner_id, created_at);
        self.leads.insert(id, lead.clone());
        Ok(lead)
    }

    pub fn len(&self) -> usize {
        self.leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leads.is_empty()
    }
}

impl Default for InMemoryLeadRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare with `None` sorting above every value.
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> CmpOrdering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => CmpOrdering::Equal,
        (None, Some(_)) => CmpOrdering::Greater,
        (Some(_), None) => CmpOrdering::Less,
    }
}

fn compare_leads(a: &Lead, b: &Lead, field: SortField, order: SortOrder) -> CmpOrdering {
    let ordering = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::LastActivityAt => nulls_last(a.last_activity_at, b.last_activity_at),
        SortField::Score => a.score.cmp(&b.score),
        SortField::LeadValue => a.lead_value.cmp(&b.lead_value),
        SortField::FirstName => a.first_name.cmp(&b.first_name),
        SortField::LastName => a.last_name.cmp(&b.last_name),
        SortField::Company => nulls_last(a.company.as_deref(), b.company.as_deref()),
    }
    .then(a.id.cmp(&b.id));

    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl LeadRepositoryInterface for InMemoryLeadRepository {
    async fn insert_lead(&self, owner_id: i32, lead: NewLead) -> DomainResult<Lead> {
        self.insert_at(owner_id, lead, Utc::now())
    }

    async fn find_lead(&self, owner_id: i32, id: i32) -> DomainResult<Option<Lead>> {
        Ok(self
            .leads
            .get(&id)
            .filter(|l| l.owner_id == owner_id)
            .map(|l| l.clone()))
    }

    async fn email_taken(
        &self,
        owner_id: i32,
        email: &str,
        exclude_id: Option<i32>,
    ) -> DomainResult<bool> {
        Ok(self
            .emails
            .get(&(owner_id, email.to_string()))
            .is_some_and(|id| Some(*id) != exclude_id))
    }

    async fn list_leads(&self, query: &LeadQuery) -> DomainResult<PaginatedResult<Lead>> {
        let mut matching: Vec<Lead> = self
            .leads
            .iter()
            .filter(|l| query.predicate.matches(l.value()))
            .map(|l| l.value().clone())
            .collect();

        let total = matching.len() as u64;
        matching.sort_by(|a, b| compare_leads(a, b, query.sort_by, query.sort_order));

        let items = matching
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .collect();

        Ok(PaginatedResult::new(
            items,
            total,
            query.page.page,
            query.page.limit,
        ))
    }

    async fn update_lead(
        &self,
        owner_id: i32,
        id: i32,
        changes: LeadChanges,
    ) -> DomainResult<Option<Lead>> {
        Self::check_value(changes.lead_value)?;
        let Some(mut lead) = self.leads.get_mut(&id).filter(|l| l.owner_id == owner_id) else {
            return Ok(None);
        };

        if let Some(email) = changes.email.as_ref().filter(|e| **e != lead.email) {
            match self.emails.entry((owner_id, email.clone())) {
                Entry::Occupied(_) => return Err(DomainError::duplicate_lead_email()),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&(owner_id, lead.email.clone()));
        }

        changes.apply_to(&mut lead, Utc::now());
        Ok(Some(lead.clone()))
    }

    async fn delete_lead(&self, owner_id: i32, id: i32) -> DomainResult<bool> {
        match self.leads.remove_if(&id, |_, l| l.owner_id == owner_id) {
            Some((_, lead)) => {
                self.emails.remove(&(owner_id, lead.email));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── Users ───────────────────────────────────────────────────────

pub struct InMemoryUserRepository {
    users: DashMap<i32, User>,
    emails: DashMap<String, i32>,
    user_counter: AtomicI32,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            emails: DashMap::new(),
            user_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, new_user: NewUser) -> DomainResult<User> {
        let id = self.user_counter.fetch_add(1, Ordering::SeqCst);

        match self.emails.entry(new_user.email.clone()) {
            Entry::Occupied(_) => return Err(DomainError::duplicate_user_email()),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let user = new_user.into_user(id, Utc::now());
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        self.find_user_by_id(id).await
    }

    async fn find_user_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

// ── Provider ────────────────────────────────────────────────────

/// Repository provider backed entirely by process memory
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    leads: InMemoryLeadRepository,
    users: InMemoryUserRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lead_store(&self) -> &InMemoryLeadRepository {
        &self.leads
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn leads(&self) -> &dyn LeadRepositoryInterface {
        &self.leads
    }

    fn users(&self) -> &dyn UserRepositoryInterface {
        &self.users
    }
}
