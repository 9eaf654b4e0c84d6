//! Demo account and sample leads for running without a database

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use super::InMemoryRepositoryProvider;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::{DomainResult, LeadSource, LeadStatus, NewLead, NewUser, User};
use crate::infrastructure::crypto::password::hash_password;
use crate::shared::InfraError;

pub const DEMO_EMAIL: &str = "test@erino.com";
pub const DEMO_PASSWORD: &str = "test123";

struct DemoLead {
    first_name: &'static str,
    last_name: &'static str,
    email: &'static str,
    phone: &'static str,
    company: &'static str,
    city: &'static str,
    state: &'static str,
    source: LeadSource,
    status: LeadStatus,
    score: i32,
    lead_value: i64,
    is_qualified: bool,
}

const DEMO_LEADS: [DemoLead; 10] = [
    DemoLead {
        first_name: "John",
        last_name: "Smith",
        email: "john.smith@email.com",
        phone: "+15550101",
        company: "TechCorp",
        city: "San Francisco",
        state: "CA",
        source: LeadSource::Website,
        status: LeadStatus::New,
        score: 75,
        lead_value: 5000,
        is_qualified: false,
    },
    DemoLead {
        first_name: "Sarah",
        last_name: "Johnson",
        email: "sarah.j@techstart.com",
        phone: "+15550102",
        company: "TechStart",
        city: "New York",
        state: "NY",
        source: LeadSource::GoogleAds,
        status: LeadStatus::Contacted,
        score: 85,
        lead_value: 7500,
        is_qualified: true,
    },
    DemoLead {
        first_name: "Alice",
        last_name: "Williams",
        email: "alice@newcorp.com",
        phone: "+15550103",
        company: "NewCorp",
        city: "Chicago",
        state: "IL",
        source: LeadSource::Referral,
        status: LeadStatus::Contacted,
        score: 85,
        lead_value: 3000,
        is_qualified: false,
    },
    DemoLead {
        first_name: "Bob",
        last_name: "Brown",
        email: "bob@example.com",
        phone: "+15550104",
        company: "Innovate Inc.",
        city: "Austin",
        state: "TX",
        source: LeadSource::Website,
        status: LeadStatus::Qualified,
        score: 90,
        lead_value: 10000,
        is_qualified: true,
    },
    DemoLead {
        first_name: "Charlie",
        last_name: "Davis",
        email: "charlie@solutions.net",
        phone: "+15550105",
        company: "Solutions Co.",
        city: "Seattle",
        state: "WA",
        source: LeadSource::FacebookAds,
        status: LeadStatus::New,
        score: 60,
        lead_value: 2500,
        is_qualified: false,
    },
    DemoLead {
        first_name: "Diana",
        last_name: "Miller",
        email: "diana@global.org",
        phone: "+15550106",
        company: "Global Corp",
        city: "Miami",
        state: "FL",
        source: LeadSource::Events,
        status: LeadStatus::Lost,
        score: 40,
        lead_value: 1500,
        is_qualified: false,
    },
    DemoLead {
        first_name: "Eve",
        last_name: "Wilson",
        email: "eve@techsolutions.com",
        phone: "+15550107",
        company: "Tech Solutions",
        city: "Boston",
        state: "MA",
        source: LeadSource::GoogleAds,
        status: LeadStatus::Won,
        score: 95,
        lead_value: 12000,
        is_qualified: true,
    },
    DemoLead {
        first_name: "Frank",
        last_name: "Moore",
        email: "frank@data.io",
        phone: "+15550108",
        company: "Data Insights",
        city: "Denver",
        state: "CO",
        source: LeadSource::Referral,
        status: LeadStatus::Qualified,
        score: 88,
        lead_value: 6000,
        is_qualified: true,
    },
    DemoLead {
        first_name: "Grace",
        last_name: "Taylor",
        email: "grace@innovate.co",
        phone: "+15550109",
        company: "Innovate Co.",
        city: "Portland",
        state: "OR",
        source: LeadSource::Website,
        status: LeadStatus::New,
        score: 70,
        lead_value: 4000,
        is_qualified: false,
    },
    DemoLead {
        first_name: "Henry",
        last_name: "Anderson",
        email: "henry@enterprise.com",
        phone: "+15550110",
        company: "Enterprise Solutions",
        city: "Dallas",
        state: "TX",
        source: LeadSource::Events,
        status: LeadStatus::Contacted,
        score: 80,
        lead_value: 5500,
        is_qualified: true,
    },
];

/// Create the demo account and give it the sample leads, one per day
/// ending today.
pub async fn seed_demo_data(repos: &InMemoryRepositoryProvider) -> DomainResult<User> {
    let password_hash =
        hash_password(DEMO_PASSWORD).map_err(|e| InfraError::Crypto(e.to_string()))?;

    let user = repos
        .users()
        .create_user(NewUser {
            email: DEMO_EMAIL.to_string(),
            password_hash,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        })
        .await?;

    let now = Utc::now();
    let days = DEMO_LEADS.len() as i64;
    for (i, demo) in DEMO_LEADS.iter().enumerate() {
        let lead = NewLead {
            first_name: demo.first_name.to_string(),
            last_name: demo.last_name.to_string(),
            email: demo.email.to_string(),
            phone: Some(demo.phone.to_string()),
            company: Some(demo.company.to_string()),
            city: Some(demo.city.to_string()),
            state: Some(demo.state.to_string()),
            source: demo.source,
            status: demo.status,
            score: demo.score,
            lead_value: Decimal::new(demo.lead_value * 100, 2),
            is_qualified: demo.is_qualified,
            last_activity_at: None,
        };
        let created_at = now - Duration::days(days - 1 - i as i64);
        repos.lead_store().insert_at(user.id, lead, created_at)?;
    }

    info!(
        user_id = user.id,
        leads = DEMO_LEADS.len(),
        "Seeded demo account {}",
        DEMO_EMAIL
    );
    Ok(user)
}
