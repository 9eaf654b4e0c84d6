//! SQL rendering of lead predicates
//!
//! Conditions become positional `$n` placeholders in the order they appear
//! in the predicate. Column names only ever come from the fixed set below,
//! never from request input. `$n` is understood by both PostgreSQL and
//! SQLite, and a repeated `$n` binds the same value on both.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{DbBackend, Statement, Value};

use crate::domain::lead::{like_pattern, Condition, LeadPredicate, LeadQuery, OneOrMany};
use crate::domain::{SortField, SortOrder};

const SEARCH_COLUMNS: [&str; 5] = ["first_name", "last_name", "email", "company", "city"];

/// A rendered WHERE body plus its bind values, `$1` first
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    pub sql: String,
    pub values: Vec<Value>,
}

#[derive(Default)]
struct Binder {
    values: Vec<Value>,
}

impl Binder {
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    fn bind_all<T: Copy + Into<Value>>(&mut self, column: &str, values: &OneOrMany<T>) -> String {
        match values {
            OneOrMany::One(v) => format!("{column} = {}", self.bind(*v)),
            OneOrMany::Many(vs) if vs.is_empty() => "1 = 0".to_string(),
            OneOrMany::Many(vs) => {
                let placeholders: Vec<String> = vs.iter().map(|v| self.bind(*v)).collect();
                format!("{column} IN ({})", placeholders.join(", "))
            }
        }
    }
}

pub fn render_predicate(predicate: &LeadPredicate) -> SqlPredicate {
    let mut binder = Binder::default();
    let clauses: Vec<String> = predicate
        .conditions()
        .iter()
        .map(|condition| render_condition(condition, &mut binder))
        .collect();

    SqlPredicate {
        sql: clauses.join(" AND "),
        values: binder.values,
    }
}

fn render_condition(condition: &Condition, binder: &mut Binder) -> String {
    match condition {
        Condition::Owner(id) => format!("user_id = {}", binder.bind(*id)),
        Condition::Search(term) => {
            let p = binder.bind(like_pattern(term));
            let alternatives: Vec<String> = SEARCH_COLUMNS
                .iter()
                .map(|col| format!("LOWER({col}) LIKE LOWER({p}) ESCAPE '\\'"))
                .collect();
            format!("({})", alternatives.join(" OR "))
        }
        Condition::Status(statuses) => binder.bind_all("status", &statuses.map(|s| s.as_str())),
        Condition::Source(sources) => binder.bind_all("source", &sources.map(|s| s.as_str())),
        Condition::ScoreMin(v) => format!("score >= {}", binder.bind(*v)),
        Condition::ScoreMax(v) => format!("score <= {}", binder.bind(*v)),
        Condition::LeadValueMin(v) => {
            format!("lead_value_cents >= {}", binder.bind(cents_ceil(*v)))
        }
        Condition::LeadValueMax(v) => {
            format!("lead_value_cents <= {}", binder.bind(cents_floor(*v)))
        }
        Condition::Qualified(v) => format!("is_qualified = {}", binder.bind(*v)),
        Condition::CreatedFrom(v) => format!("created_at >= {}", binder.bind(*v)),
        Condition::CreatedTo(v) => format!("created_at <= {}", binder.bind(*v)),
    }
}

/// Smallest whole-cent amount not below `value`. Bounds past the column
/// range clamp to `i64::MAX`.
fn cents_ceil(value: Decimal) -> i64 {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.ceil().to_i64())
        .unwrap_or(i64::MAX)
}

/// Largest whole-cent amount not above `value`.
fn cents_floor(value: Decimal) -> i64 {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.floor().to_i64())
        .unwrap_or(i64::MAX)
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::LastActivityAt => "last_activity_at",
        SortField::Score => "score",
        SortField::LeadValue => "lead_value_cents",
        SortField::FirstName => "first_name",
        SortField::LastName => "last_name",
        SortField::Company => "company",
    }
}

/// `ORDER BY` with `id` as tie-breaker. NULLs sort as the largest value on
/// every backend.
pub fn order_clause(field: SortField, order: SortOrder) -> String {
    let (dir, nulls) = match order {
        SortOrder::Asc => ("ASC", "NULLS LAST"),
        SortOrder::Desc => ("DESC", "NULLS FIRST"),
    };
    format!("ORDER BY {} {dir} {nulls}, id {dir}", sort_column(field))
}

/// `SELECT COUNT(*)` over the predicate.
pub fn count_statement(backend: DbBackend, predicate: &SqlPredicate) -> Statement {
    Statement::from_sql_and_values(
        backend,
        format!("SELECT COUNT(*) AS count FROM leads WHERE {}", predicate.sql),
        predicate.values.clone(),
    )
}

/// Page query: the count query's predicate and values, then ordering and
/// `LIMIT`/`OFFSET` bound as the next two placeholders.
pub fn page_statement(backend: DbBackend, predicate: &SqlPredicate, query: &LeadQuery) -> Statement {
    let mut values = predicate.values.clone();
    let limit_at = values.len() + 1;
    values.push(Value::from(i64::from(query.page.limit)));
    values.push(Value::from(query.page.offset() as i64));

    Statement::from_sql_and_values(
        backend,
        format!(
            "SELECT * FROM leads WHERE {} {} LIMIT ${} OFFSET ${}",
            predicate.sql,
            order_clause(query.sort_by, query.sort_order),
            limit_at,
            limit_at + 1
        ),
        values,
    )
}
