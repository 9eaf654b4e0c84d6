//! Lead DTOs and body validation

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::domain::lead::filter::parse_date;
use crate::domain::lead::{max_lead_value, LEAD_VALUE_TOO_LARGE};
use crate::domain::{DomainError, DomainResult, Lead, LeadChanges, LeadSource, LeadStatus, NewLead};
use crate::shared::PaginatedResult;

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn name_length(label: &str, value: &str) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < 2 {
        return Err(invalid(
            "length",
            format!("{label} must be at least 2 characters long"),
        ));
    }
    if len > 100 {
        return Err(invalid("length", format!("{label} cannot exceed 100 characters")));
    }
    Ok(())
}

fn validate_first_name(value: &str) -> Result<(), ValidationError> {
    name_length("First name", value)
}

fn validate_last_name(value: &str) -> Result<(), ValidationError> {
    name_length("Last name", value)
}

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("Invalid phone regex"));

fn one_of(values: &[&str]) -> String {
    values.join(", ")
}

fn validate_source(value: &str) -> Result<(), ValidationError> {
    value.parse::<LeadSource>().map(|_| ()).map_err(|_| {
        let names: Vec<_> = LeadSource::ALL.iter().map(|s| s.as_str()).collect();
        invalid("source", format!("Source must be one of: {}", one_of(&names)))
    })
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<LeadStatus>().map(|_| ()).map_err(|_| {
        let names: Vec<_> = LeadStatus::ALL.iter().map(|s| s.as_str()).collect();
        invalid("status", format!("Status must be one of: {}", one_of(&names)))
    })
}

fn validate_lead_value(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("range", "Lead value must be positive"));
    }
    if *value > max_lead_value() {
        return Err(invalid("range", LEAD_VALUE_TOO_LARGE));
    }
    if value.normalize().scale() > 2 {
        return Err(invalid("precision", "Lead value can have up to 2 decimal places"));
    }
    Ok(())
}

fn validate_activity_date(value: &str) -> Result<(), ValidationError> {
    parse_date(value)
        .map(|_| ())
        .ok_or_else(|| invalid("date", "Last activity date must be in ISO format"))
}

fn parse_activity(value: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            parse_date(&v).ok_or_else(|| {
                DomainError::validation(vec!["Last activity date must be in ISO format".into()])
            })
        })
        .transpose()
}

fn parse_enum<T: std::str::FromStr>(value: Option<String>, label: &str) -> DomainResult<Option<T>> {
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|_| DomainError::validation(vec![format!("{label} is invalid")]))
        })
        .transpose()
}

/// Body of `POST /api/leads`
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateLeadRequest {
    #[validate(
        required(message = "First name is required"),
        custom(function = "validate_first_name")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "Last name is required"),
        custom(function = "validate_last_name")
    )]
    pub last_name: Option<String>,
    #[validate(
        required(message = "Email is required"),
        email(message = "Please provide a valid email address")
    )]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Please provide a valid phone number"))]
    pub phone: Option<String>,
    #[validate(length(max = 255, message = "Company cannot exceed 255 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "City cannot exceed 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "State cannot exceed 100 characters"))]
    pub state: Option<String>,
    #[validate(
        required(message = "Source is required"),
        custom(function = "validate_source")
    )]
    pub source: Option<String>,
    #[validate(
        required(message = "Status is required"),
        custom(function = "validate_status")
    )]
    pub status: Option<String>,
    #[validate(
        required(message = "Score is required"),
        range(min = 0, max = 100, message = "Score must be between 0 and 100")
    )]
    pub score: Option<i32>,
    #[validate(
        required(message = "Lead value is required"),
        custom(function = "validate_lead_value")
    )]
    #[schema(value_type = Option<f64>)]
    pub lead_value: Option<Decimal>,
    /// ISO 8601 timestamp
    #[validate(custom(function = "validate_activity_date"))]
    pub last_activity_at: Option<String>,
    pub is_qualified: Option<bool>,
}

impl CreateLeadRequest {
    /// Convert a validated body into the insert payload.
    pub fn into_new_lead(self) -> DomainResult<NewLead> {
        let missing = |field: &str| DomainError::validation(vec![format!("{field} is required")]);
        Ok(NewLead {
            first_name: self.first_name.ok_or_else(|| missing("First name"))?,
            last_name: self.last_name.ok_or_else(|| missing("Last name"))?,
            email: self.email.ok_or_else(|| missing("Email"))?,
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source: parse_enum(self.source, "Source")?.ok_or_else(|| missing("Source"))?,
            status: parse_enum(self.status, "Status")?.ok_or_else(|| missing("Status"))?,
            score: self.score.ok_or_else(|| missing("Score"))?,
            lead_value: self.lead_value.ok_or_else(|| missing("Lead value"))?.round_dp(2),
            is_qualified: self.is_qualified.unwrap_or(false),
            last_activity_at: parse_activity(self.last_activity_at)?,
        })
    }
}

/// Body of `PUT /api/leads/{id}`; every field optional
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateLeadRequest {
    #[validate(custom(function = "validate_first_name"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "validate_last_name"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Please provide a valid phone number"))]
    pub phone: Option<String>,
    #[validate(length(max = 255, message = "Company cannot exceed 255 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "City cannot exceed 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "State cannot exceed 100 characters"))]
    pub state: Option<String>,
    #[validate(custom(function = "validate_source"))]
    pub source: Option<String>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: Option<i32>,
    #[validate(custom(function = "validate_lead_value"))]
    #[schema(value_type = Option<f64>)]
    pub lead_value: Option<Decimal>,
    #[validate(custom(function = "validate_activity_date"))]
    pub last_activity_at: Option<String>,
    pub is_qualified: Option<bool>,
}

impl UpdateLeadRequest {
    pub fn into_changes(self) -> DomainResult<LeadChanges> {
        Ok(LeadChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            city: self.city,
            state: self.state,
            source: parse_enum(self.source, "Source")?,
            status: parse_enum(self.status, "Status")?,
            score: self.score,
            lead_value: self.lead_value.map(|v| v.round_dp(2)),
            is_qualified: self.is_qualified,
            last_activity_at: parse_activity(self.last_activity_at)?,
        })
    }
}

/// Lead as returned by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadDto {
    pub id: i32,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: String,
    pub status: String,
    pub score: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub lead_value: Decimal,
    pub is_qualified: bool,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Lead> for LeadDto {
    fn from(l: Lead) -> Self {
        Self {
            id: l.id,
            user_id: l.owner_id,
            first_name: l.first_name,
            last_name: l.last_name,
            email: l.email,
            phone: l.phone,
            company: l.company,
            city: l.city,
            state: l.state,
            source: l.source.as_str().to_string(),
            status: l.status.as_str().to_string(),
            score: l.score,
            lead_value: l.lead_value,
            is_qualified: l.is_qualified,
            last_activity_at: l.last_activity_at,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

/// `{"lead": ...}` payload of single-lead responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadEnvelope {
    pub lead: LeadDto,
}

impl From<Lead> for LeadEnvelope {
    fn from(lead: Lead) -> Self {
        Self {
            lead: LeadDto::from(lead),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedLead {
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

/// Listing response: rows plus pagination metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadListResponse {
    pub success: bool,
    pub data: Vec<LeadDto>,
    pub pagination: PaginationMeta,
}

impl From<PaginatedResult<Lead>> for LeadListResponse {
    fn from(page: PaginatedResult<Lead>) -> Self {
        let page = page.map(LeadDto::from);
        Self {
            success: true,
            data: page.items,
            pagination: PaginationMeta {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::http::common::validation_details;
    use serde_json::json;

    fn create_body() -> serde_json::Value {
        json!({
            "first_name": "Sarah",
            "last_name": "Johnson",
            "email": "sarah@example.com",
            "phone": "+15550101",
            "source": "website",
            "status": "new",
            "score": 75,
            "lead_value": 5000.5
        })
    }

    #[test]
    fn valid_create_body_converts() {
        let req: CreateLeadRequest = serde_json::from_value(create_body()).unwrap();
        req.validate().unwrap();
        let new = req.into_new_lead().unwrap();
        assert_eq!(new.source, LeadSource::Website);
        assert_eq!(new.lead_value, Decimal::new(500050, 2));
        assert!(!new.is_qualified);
    }

    #[test]
    fn missing_fields_report_every_message() {
        let req: CreateLeadRequest = serde_json::from_value(json!({})).unwrap();
        let details = validation_details(&req.validate().unwrap_err());
        assert!(details.contains(&"Email is required".to_string()));
        assert!(details.contains(&"Score is required".to_string()));
        assert!(details.contains(&"Lead value is required".to_string()));
        assert_eq!(details.len(), 7);
    }

    #[test]
    fn field_rules_produce_readable_messages() {
        let mut body = create_body();
        body["phone"] = json!("0123");
        body["score"] = json!(101);
        body["lead_value"] = json!(10.125);
        body["source"] = json!("twitter");
        body["first_name"] = json!("S");
        let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(
            details,
            vec![
                "First name must be at least 2 characters long",
                "Lead value can have up to 2 decimal places",
                "Please provide a valid phone number",
                "Score must be between 0 and 100",
                "Source must be one of: website, facebook_ads, google_ads, referral, events, other",
            ]
        );
    }

    #[test]
    fn phone_pattern() {
        assert!(PHONE_RE.is_match("+15550101"));
        assert!(PHONE_RE.is_match("9"));
        assert!(PHONE_RE.is_match("1234567890123456"));
        assert!(!PHONE_RE.is_match("12345678901234567"));
        assert!(!PHONE_RE.is_match("0555"));
        assert!(!PHONE_RE.is_match("+"));
        assert!(!PHONE_RE.is_match("555-0101"));

        let req = UpdateLeadRequest {
            phone: Some("555-0101".into()),
            ..Default::default()
        };
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(details, vec!["Please provide a valid phone number"]);
    }

    #[test]
    fn negative_lead_value_is_rejected() {
        let mut body = create_body();
        body["lead_value"] = json!(-1);
        let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(details, vec!["Lead value must be positive"]);
    }

    #[test]
    fn lead_value_must_fit_in_cents() {
        let mut body = create_body();
        body["lead_value"] = json!(1e20);
        let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
        let details = validation_details(&req.validate().unwrap_err());
        assert_eq!(details, vec!["Lead value is too large"]);

        let req = UpdateLeadRequest {
            lead_value: Some(max_lead_value()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn unknown_body_fields_are_refused() {
        let mut body = create_body();
        body["user_id"] = json!(99);
        assert!(serde_json::from_value::<CreateLeadRequest>(body).is_err());
    }

    #[test]
    fn update_keeps_absent_fields_unset() {
        let req: UpdateLeadRequest =
            serde_json::from_value(json!({"status": "won", "score": 90})).unwrap();
        req.validate().unwrap();
        let changes = req.into_changes().unwrap();
        assert_eq!(changes.status, Some(LeadStatus::Won));
        assert_eq!(changes.score, Some(90));
        assert!(changes.email.is_none());
        assert!(UpdateLeadRequest::default().into_changes().unwrap().is_empty());
    }

    #[test]
    fn lead_value_serializes_as_number() {
        let now = Utc::now();
        let req: CreateLeadRequest = serde_json::from_value(create_body()).unwrap();
        let lead = req.into_new_lead().unwrap().into_lead(3, 1, now);
        let value = serde_json::to_value(LeadDto::from(lead)).unwrap();
        assert_eq!(value["lead_value"], json!(5000.5));
        assert_eq!(value["user_id"], json!(1));
        assert_eq!(value["source"], json!("website"));
    }
}
