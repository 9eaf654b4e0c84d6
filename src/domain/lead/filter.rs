//! Listing filter: allow-list validation of raw query parameters
//!
//! Input is the decoded query string as `(key, value)` pairs. Repeated keys
//! and `key[]` both form arrays. Every problem found is reported; nothing is
//! returned unless the whole parameter set is valid.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use super::{LeadSource, LeadStatus};
use crate::shared::{DomainError, PageRequest};

/// A single value, or an explicit list of values for membership matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> OneOrMany<U> {
        match self {
            Self::One(v) => OneOrMany::One(f(v)),
            Self::Many(vs) => OneOrMany::Many(vs.iter().map(f).collect()),
        }
    }
}

impl<T: PartialEq> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(v) => std::slice::from_ref(v),
            Self::Many(vs) => vs,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.as_slice().contains(value)
    }
}

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    LastActivityAt,
    Score,
    LeadValue,
    FirstName,
    LastName,
    Company,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::LastActivityAt,
        Self::Score,
        Self::LeadValue,
        Self::FirstName,
        Self::LastName,
        Self::Company,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::LastActivityAt => "last_activity_at",
            Self::Score => "score",
            Self::LeadValue => "lead_value",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Company => "company",
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|f| f.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A fully validated listing request
#[derive(Debug, Clone, PartialEq)]
pub struct LeadFilter {
    pub page: PageRequest,
    pub search: Option<String>,
    pub status: Option<OneOrMany<LeadStatus>>,
    pub source: Option<OneOrMany<LeadSource>>,
    pub score_min: Option<i32>,
    pub score_max: Option<i32>,
    pub lead_value_min: Option<Decimal>,
    pub lead_value_max: Option<Decimal>,
    pub is_qualified: Option<bool>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for LeadFilter {
    fn default() -> Self {
        Self {
            page: PageRequest::default(),
            search: None,
            status: None,
            source: None,
            score_min: None,
            score_max: None,
            lead_value_min: None,
            lead_value_max: None,
            is_qualified: None,
            date_from: None,
            date_to: None,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

const KNOWN_KEYS: [&str; 14] = [
    "page",
    "limit",
    "search",
    "status",
    "source",
    "score_min",
    "score_max",
    "lead_value_min",
    "lead_value_max",
    "is_qualified",
    "date_from",
    "date_to",
    "sort_by",
    "sort_order",
];

struct RawParam {
    values: Vec<String>,
    bracketed: bool,
}

impl LeadFilter {
    /// Validate decoded query pairs against the allow-list.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut raw: BTreeMap<String, RawParam> = BTreeMap::new();
        for (key, value) in pairs {
            let key: String = key.into();
            let (name, bracketed) = match key.strip_suffix("[]") {
                Some(name) => (name.to_string(), true),
                None => (key, false),
            };
            let entry = raw.entry(name).or_insert_with(|| RawParam {
                values: Vec::new(),
                bracketed: false,
            });
            entry.values.push(value.into());
            entry.bracketed |= bracketed;
        }

        let mut errors = Vec::new();
        let mut filter = LeadFilter::default();

        for key in raw.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                errors.push(format!("{key} is not allowed"));
            }
        }

        let mut p = Params {
            raw: &raw,
            errors: &mut errors,
        };

        let page = p
            .scalar("page", |s| s.parse::<u32>().ok().filter(|v| *v >= 1))
            .unwrap_or(PageRequest::DEFAULT_PAGE);
        let limit = p
            .scalar("limit", |s| {
                s.parse::<u32>()
                    .ok()
                    .filter(|v| (1..=PageRequest::MAX_LIMIT).contains(v))
            })
            .unwrap_or(PageRequest::DEFAULT_LIMIT);
        filter.page = PageRequest::new(page, limit);

        filter.search = p.scalar("search", |s| (!s.is_empty()).then(|| s.to_string()));
        filter.status = p.enum_list("status", LeadStatus::ALL.iter().map(|s| s.as_str()));
        filter.source = p.enum_list("source", LeadSource::ALL.iter().map(|s| s.as_str()));
        filter.score_min = p.scalar("score_min", parse_score);
        filter.score_max = p.scalar("score_max", parse_score);
        filter.lead_value_min = p.scalar("lead_value_min", parse_amount);
        filter.lead_value_max = p.scalar("lead_value_max", parse_amount);
        filter.is_qualified = p.scalar("is_qualified", parse_bool);
        filter.date_from = p.scalar("date_from", parse_date);
        filter.date_to = p.scalar("date_to", parse_date);
        if let Some(field) = p.scalar("sort_by", |s| s.parse::<SortField>().ok()) {
            filter.sort_by = field;
        }
        if let Some(order) = p.scalar("sort_order", |s| match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }) {
            filter.sort_order = order;
        }

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(DomainError::validation(errors))
        }
    }
}

struct Params<'a> {
    raw: &'a BTreeMap<String, RawParam>,
    errors: &'a mut Vec<String>,
}

impl Params<'_> {
    fn scalar<T>(&mut self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let param = self.raw.get(key)?;
        if param.bracketed || param.values.len() != 1 {
            self.errors.push(format!("{key} must be a single value"));
            return None;
        }
        let parsed = parse(&param.values[0]);
        if parsed.is_none() {
            self.errors.push(scalar_message(key));
        }
        parsed
    }

    fn enum_list<'v, T: FromStr>(
        &mut self,
        key: &str,
        allowed: impl Iterator<Item = &'v str>,
    ) -> Option<OneOrMany<T>> {
        let param = self.raw.get(key)?;
        let parsed: Vec<Option<T>> = param.values.iter().map(|v| v.parse().ok()).collect();
        if parsed.iter().any(Option::is_none) {
            let allowed: Vec<&str> = allowed.collect();
            self.errors
                .push(format!("{key} must be one of: {}", allowed.join(", ")));
            return None;
        }
        let mut values: Vec<T> = parsed.into_iter().flatten().collect();
        if param.bracketed || values.len() > 1 {
            Some(OneOrMany::Many(values))
        } else {
            values.pop().map(OneOrMany::One)
        }
    }
}

fn scalar_message(key: &str) -> String {
    match key {
        "page" => "page must be an integer greater than or equal to 1".to_string(),
        "limit" => format!("limit must be an integer between 1 and {}", PageRequest::MAX_LIMIT),
        "search" => "search is not allowed to be empty".to_string(),
        "score_min" | "score_max" => format!("{key} must be an integer between 0 and 100"),
        "lead_value_min" | "lead_value_max" => {
            format!("{key} must be a number greater than or equal to 0")
        }
        "is_qualified" => "is_qualified must be a boolean".to_string(),
        "date_from" | "date_to" => format!("{key} must be a valid ISO 8601 date"),
        "sort_by" => {
            let names: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
            format!("sort_by must be one of: {}", names.join(", "))
        }
        "sort_order" => "sort_order must be one of: asc, desc".to_string(),
        _ => format!("{key} is invalid"),
    }
}

fn parse_score(s: &str) -> Option<i32> {
    s.parse::<i32>().ok().filter(|v| (0..=100).contains(v))
}

fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim())
        .ok()
        .filter(|v| !v.is_sign_negative() || v.is_zero())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// ISO 8601: zoned datetime, naive datetime (UTC), or bare date (midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(pairs: &[(&str, &str)]) -> Result<LeadFilter, DomainError> {
        LeadFilter::from_query_pairs(pairs.iter().map(|(k, v)| (*k, *v)))
    }

    fn details(err: DomainError) -> Vec<String> {
        match err {
            DomainError::Validation { details, .. } => details,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_query_uses_defaults() {
        let filter = parse(&[]).unwrap();
        assert_eq!(filter, LeadFilter::default());
        assert_eq!(filter.page, PageRequest::new(1, 20));
        assert_eq!(filter.sort_by, SortField::CreatedAt);
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn parses_every_supported_key() {
        let filter = parse(&[
            ("page", "2"),
            ("limit", "50"),
            ("search", "tech"),
            ("status", "new"),
            ("source", "website"),
            ("source", "referral"),
            ("score_min", "80"),
            ("score_max", "90"),
            ("lead_value_min", "1000.5"),
            ("lead_value_max", "10000"),
            ("is_qualified", "TRUE"),
            ("date_from", "2024-01-01"),
            ("date_to", "2024-02-01T12:30:00Z"),
            ("sort_by", "score"),
            ("sort_order", "asc"),
        ])
        .unwrap();

        assert_eq!(filter.page, PageRequest::new(2, 50));
        assert_eq!(filter.search.as_deref(), Some("tech"));
        assert_eq!(filter.status, Some(OneOrMany::One(LeadStatus::New)));
        assert_eq!(
            filter.source,
            Some(OneOrMany::Many(vec![LeadSource::Website, LeadSource::Referral]))
        );
        assert_eq!(filter.score_min, Some(80));
        assert_eq!(filter.score_max, Some(90));
        assert_eq!(filter.lead_value_min, Some(Decimal::new(10005, 1)));
        assert_eq!(filter.lead_value_max, Some(Decimal::from(10000)));
        assert_eq!(filter.is_qualified, Some(true));
        assert_eq!(
            filter.date_from,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            filter.date_to,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(filter.sort_by, SortField::Score);
        assert_eq!(filter.sort_order, SortOrder::Asc);
    }

    #[test]
    fn bracketed_key_forms_array_even_with_one_value() {
        let filter = parse(&[("status[]", "won")]).unwrap();
        assert_eq!(filter.status, Some(OneOrMany::Many(vec![LeadStatus::Won])));
    }

    #[test]
    fn collects_every_failure() {
        let errs = details(
            parse(&[
                ("page", "0"),
                ("limit", "101"),
                ("status", "archived"),
                ("score_min", "-1"),
                ("lead_value_max", "-5"),
                ("is_qualified", "yes"),
                ("date_from", "yesterday"),
                ("sort_by", "password_hash"),
                ("sort_order", "up"),
            ])
            .unwrap_err(),
        );
        assert_eq!(errs.len(), 9, "{errs:?}");
        assert!(errs.iter().any(|e| e.starts_with("status must be one of")));
        assert!(errs.iter().any(|e| e.starts_with("sort_by must be one of")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let errs = details(parse(&[("user_id", "2")]).unwrap_err());
        assert_eq!(errs, vec!["user_id is not allowed".to_string()]);
    }

    #[test]
    fn repeated_scalar_is_rejected() {
        let errs = details(parse(&[("page", "1"), ("page", "2")]).unwrap_err());
        assert_eq!(errs, vec!["page must be a single value".to_string()]);
    }

    #[test]
    fn empty_search_is_rejected() {
        assert!(parse(&[("search", "")]).is_err());
    }

    #[test]
    fn one_bad_member_rejects_array() {
        let errs = details(parse(&[("status", "new"), ("status", "bogus")]).unwrap_err());
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn zero_lead_value_is_allowed() {
        let filter = parse(&[("lead_value_min", "0")]).unwrap();
        assert_eq!(filter.lead_value_min, Some(Decimal::ZERO));
    }

    #[test]
    fn naive_datetime_is_read_as_utc() {
        assert_eq!(
            parse_date("2024-03-05T08:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_date("05/03/2024"), None);
    }
}
