//! Owner-scoped lead predicate
//!
//! A [`LeadPredicate`] is the ordered AND-list of conditions derived from a
//! validated [`LeadFilter`]. The same value drives the SQL renderer and the
//! in-memory store, so both backends agree on which rows match.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{Lead, LeadFilter, LeadSource, LeadStatus, OneOrMany};

/// One AND-ed term of a predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Owner(i32),
    /// Case-insensitive substring over first/last name, email, company and city
    Search(String),
    Status(OneOrMany<LeadStatus>),
    Source(OneOrMany<LeadSource>),
    ScoreMin(i32),
    ScoreMax(i32),
    LeadValueMin(Decimal),
    LeadValueMax(Decimal),
    Qualified(bool),
    CreatedFrom(DateTime<Utc>),
    CreatedTo(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadPredicate {
    conditions: Vec<Condition>,
}

impl LeadPredicate {
    /// Build the predicate for `owner_id`. Ownership always comes first,
    /// followed by each present filter in a fixed order.
    pub fn build(owner_id: i32, filter: &LeadFilter) -> Self {
        let mut conditions = vec![Condition::Owner(owner_id)];

        if let Some(term) = &filter.search {
            conditions.push(Condition::Search(term.clone()));
        }
        if let Some(status) = &filter.status {
            conditions.push(Condition::Status(status.clone()));
        }
        if let Some(source) = &filter.source {
            conditions.push(Condition::Source(source.clone()));
        }
        if let Some(v) = filter.score_min {
            conditions.push(Condition::ScoreMin(v));
        }
        if let Some(v) = filter.score_max {
            conditions.push(Condition::ScoreMax(v));
        }
        if let Some(v) = filter.lead_value_min {
            conditions.push(Condition::LeadValueMin(v));
        }
        if let Some(v) = filter.lead_value_max {
            conditions.push(Condition::LeadValueMax(v));
        }
        if let Some(v) = filter.is_qualified {
            conditions.push(Condition::Qualified(v));
        }
        if let Some(v) = filter.date_from {
            conditions.push(Condition::CreatedFrom(v));
        }
        if let Some(v) = filter.date_to {
            conditions.push(Condition::CreatedTo(v));
        }

        Self { conditions }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        self.conditions.iter().all(|c| c.matches(lead))
    }
}

impl Condition {
    pub fn matches(&self, lead: &Lead) -> bool {
        match self {
            Self::Owner(id) => lead.owner_id == *id,
            Self::Search(term) => {
                let needle = term.to_lowercase();
                [
                    Some(lead.first_name.as_str()),
                    Some(lead.last_name.as_str()),
                    Some(lead.email.as_str()),
                    lead.company.as_deref(),
                    lead.city.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            Self::Status(wanted) => wanted.contains(&lead.status),
            Self::Source(wanted) => wanted.contains(&lead.source),
            Self::ScoreMin(v) => lead.score >= *v,
            Self::ScoreMax(v) => lead.score <= *v,
            Self::LeadValueMin(v) => lead.lead_value >= *v,
            Self::LeadValueMax(v) => lead.lead_value <= *v,
            Self::Qualified(v) => lead.is_qualified == *v,
            Self::CreatedFrom(v) => lead.created_at >= *v,
            Self::CreatedTo(v) => lead.created_at <= *v,
        }
    }
}

/// `%term%` with LIKE metacharacters escaped by backslash, so the term
/// matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
