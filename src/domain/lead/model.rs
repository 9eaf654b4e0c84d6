//! Lead domain entity

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Pipeline position of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Lost,
    Won,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Lost,
        Self::Won,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Lost => "lost",
            Self::Won => "won",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquisition channel of a lead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadSource {
    Website,
    FacebookAds,
    GoogleAds,
    Referral,
    Events,
    Other,
}

impl LeadSource {
    pub const ALL: [LeadSource; 6] = [
        Self::Website,
        Self::FacebookAds,
        Self::GoogleAds,
        Self::Referral,
        Self::Events,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::FacebookAds => "facebook_ads",
            Self::GoogleAds => "google_ads",
            Self::Referral => "referral",
            Self::Events => "events",
            Self::Other => "other",
        }
    }
}

impl FromStr for LeadSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const LEAD_VALUE_TOO_LARGE: &str = "Lead value is too large";

/// Largest lead value whose cent count fits the stores' `i64` column
pub fn max_lead_value() -> Decimal {
    Decimal::new(i64::MAX, 2)
}

/// A stored lead, always scoped to its owning account
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub id: i32,
    pub owner_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i32,
    /// Monetary value, 2-place precision
    pub lead_value: Decimal,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated insert payload; id and timestamps are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i32,
    pub lead_value: Decimal,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl NewLead {
    /// Materialize the stored record once the store has assigned an id.
    pub fn into_lead(self, id: i32, owner_id: i32, now: DateTime<Utc>) -> Lead {
        Lead {
            id,
            owner_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source: self.source,
            status: self.status,
            score: self.score,
            lead_value: self.lead_value,
            is_qualified: self.is_qualified,
            last_activity_at: self.last_activity_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: `None` leaves the stored field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<i32>,
    pub lead_value: Option<Decimal>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl LeadChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the present fields to `lead` and stamp `updated_at`.
    pub fn apply_to(self, lead: &mut Lead, now: DateTime<Utc>) {
        if let Some(v) = self.first_name {
            lead.first_name = v;
        }
        if let Some(v) = self.last_name {
            lead.last_name = v;
        }
        if let Some(v) = self.email {
            lead.email = v;
        }
        if let Some(v) = self.phone {
            lead.phone = Some(v);
        }
        if let Some(v) = self.company {
            lead.company = Some(v);
        }
        if let Some(v) = self.city {
            lead.city = Some(v);
        }
        if let Some(v) = self.state {
            lead.state = Some(v);
        }
        if let Some(v) = self.source {
            lead.source = v;
        }
        if let Some(v) = self.status {
            lead.status = v;
        }
        if let Some(v) = self.score {
            lead.score = v;
        }
        if let Some(v) = self.lead_value {
            lead.lead_value = v;
        }
        if let Some(v) = self.is_qualified {
            lead.is_qualified = v;
        }
        if let Some(v) = self.last_activity_at {
            lead.last_activity_at = Some(v);
        }
        lead.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_their_wire_names() {
        for status in LeadStatus::ALL {
            assert_eq!(status.as_str().parse::<LeadStatus>(), Ok(status));
        }
        for source in LeadSource::ALL {
            assert_eq!(source.as_str().parse::<LeadSource>(), Ok(source));
        }
        assert!("Won".parse::<LeadStatus>().is_err());
        assert!("twitter".parse::<LeadSource>().is_err());
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(LeadChanges::default().is_empty());
        let changes = LeadChanges {
            score: Some(10),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let created = Utc::now();
        let mut lead = NewLead {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: "john@example.com".into(),
            phone: None,
            company: Some("TechCorp".into()),
            city: None,
            state: None,
            source: LeadSource::Website,
            status: LeadStatus::New,
            score: 75,
            lead_value: Decimal::new(500000, 2),
            is_qualified: false,
            last_activity_at: None,
        }
        .into_lead(1, 9, created);

        let later = created + chrono::Duration::seconds(5);
        LeadChanges {
            status: Some(LeadStatus::Contacted),
            score: Some(80),
            ..Default::default()
        }
        .apply_to(&mut lead, later);

        assert_eq!(lead.status, LeadStatus::Contacted);
        assert_eq!(lead.score, 80);
        assert_eq!(lead.company.as_deref(), Some("TechCorp"));
        assert_eq!(lead.first_name, "John");
        assert_eq!(lead.created_at, created);
        assert_eq!(lead.updated_at, later);
    }
}
