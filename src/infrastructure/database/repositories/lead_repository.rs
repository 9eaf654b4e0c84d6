use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr,
};
use tracing::error;

use super::lead_sql::{count_statement, page_statement, render_predicate};
use crate::domain::lead::LEAD_VALUE_TOO_LARGE;
use crate::domain::{
    DomainError, DomainResult, Lead, LeadChanges, LeadQuery, LeadRepositoryInterface, LeadSource,
    LeadStatus, NewLead,
};
use crate::infrastructure::database::entities::lead;
use crate::shared::PaginatedResult;

pub struct SeaOrmLeadRepository {
    db: DatabaseConnection,
}

impl SeaOrmLeadRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn source_to_domain(source: lead::Source) -> LeadSource {
    match source {
        lead::Source::Website => LeadSource::Website,
        lead::Source::FacebookAds => LeadSource::FacebookAds,
        lead::Source::GoogleAds => LeadSource::GoogleAds,
        lead::Source::Referral => LeadSource::Referral,
        lead::Source::Events => LeadSource::Events,
        lead::Source::Other => LeadSource::Other,
    }
}

fn source_to_entity(source: LeadSource) -> lead::Source {
    match source {
        LeadSource::Website => lead::Source::Website,
        LeadSource::FacebookAds => lead::Source::FacebookAds,
        LeadSource::GoogleAds => lead::Source::GoogleAds,
        LeadSource::Referral => lead::Source::Referral,
        LeadSource::Events => lead::Source::Events,
        LeadSource::Other => lead::Source::Other,
    }
}

fn status_to_domain(status: lead::Status) -> LeadStatus {
    match status {
        lead::Status::New => LeadStatus::New,
        lead::Status::Contacted => LeadStatus::Contacted,
        lead::Status::Qualified => LeadStatus::Qualified,
        lead::Status::Lost => LeadStatus::Lost,
        lead::Status::Won => LeadStatus::Won,
    }
}

fn status_to_entity(status: LeadStatus) -> lead::Status {
    match status {
        LeadStatus::New => lead::Status::New,
        LeadStatus::Contacted => lead::Status::Contacted,
        LeadStatus::Qualified => lead::Status::Qualified,
        LeadStatus::Lost => lead::Status::Lost,
        LeadStatus::Won => lead::Status::Won,
    }
}

fn to_cents(value: Decimal) -> DomainResult<i64> {
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.round().to_i64())
        .ok_or_else(|| DomainError::validation(vec![LEAD_VALUE_TOO_LARGE.to_string()]))
}

fn lead_model_to_domain(model: lead::Model) -> Lead {
    Lead {
        id: model.id,
        owner_id: model.user_id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        phone: model.phone,
        company: model.company,
        city: model.city,
        state: model.state,
        source: source_to_domain(model.source),
        status: status_to_domain(model.status),
        score: model.score,
        lead_value: Decimal::new(model.lead_value_cents, 2),
        is_qualified: model.is_qualified,
        last_activity_at: model.last_activity_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn lead_to_active_model(lead: &Lead) -> DomainResult<lead::ActiveModel> {
    Ok(lead::ActiveModel {
        id: Set(lead.id),
        user_id: Set(lead.owner_id),
        first_name: Set(lead.first_name.clone()),
        last_name: Set(lead.last_name.clone()),
        email: Set(lead.email.clone()),
        phone: Set(lead.phone.clone()),
        company: Set(lead.company.clone()),
        city: Set(lead.city.clone()),
        state: Set(lead.state.clone()),
        source: Set(source_to_entity(lead.source)),
        status: Set(status_to_entity(lead.status)),
        score: Set(lead.score),
        lead_value_cents: Set(to_cents(lead.lead_value)?),
        is_qualified: Set(lead.is_qualified),
        last_activity_at: Set(lead.last_activity_at),
        created_at: Set(lead.created_at),
        updated_at: Set(lead.updated_at),
    })
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    error!(error = %e, "Lead query failed");
    DomainError::Internal(format!("Database error: {}", e))
}

fn write_err(e: sea_orm::DbErr) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::duplicate_lead_email()
    } else {
        db_err(e)
    }
}

pub(crate) fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl LeadRepositoryInterface for SeaOrmLeadRepository {
    async fn insert_lead(&self, owner_id: i32, new_lead: NewLead) -> DomainResult<Lead> {
        let now = Utc::now();

        let active = lead::ActiveModel {
            user_id: Set(owner_id),
            first_name: Set(new_lead.first_name),
            last_name: Set(new_lead.last_name),
            email: Set(new_lead.email),
            phone: Set(new_lead.phone),
            company: Set(new_lead.company),
            city: Set(new_lead.city),
            state: Set(new_lead.state),
            source: Set(source_to_entity(new_lead.source)),
            status: Set(status_to_entity(new_lead.status)),
            score: Set(new_lead.score),
            lead_value_cents: Set(to_cents(new_lead.lead_value)?),
            is_qualified: Set(new_lead.is_qualified),
            last_activity_at: Set(new_lead.last_activity_at),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.db).await.map_err(write_err)?;
        Ok(lead_model_to_domain(model))
    }

    async fn find_lead(&self, owner_id: i32, id: i32) -> DomainResult<Option<Lead>> {
        let model = lead::Entity::find_by_id(id)
            .filter(lead::Column::UserId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(lead_model_to_domain))
    }

    async fn email_taken(
        &self,
        owner_id: i32,
        email: &str,
        exclude_id: Option<i32>,
    ) -> DomainResult<bool> {
        let mut query = lead::Entity::find()
            .filter(lead::Column::UserId.eq(owner_id))
            .filter(lead::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(lead::Column::Id.ne(id));
        }

        let count = query.count(&self.db).await.map_err(db_err)?;
        Ok(count > 0)
    }

    async fn list_leads(&self, query: &LeadQuery) -> DomainResult<PaginatedResult<Lead>> {
        let backend = self.db.get_database_backend();
        let predicate = render_predicate(&query.predicate);

        let total = self
            .db
            .query_one(count_statement(backend, &predicate))
            .await
            .map_err(db_err)?
            .map(|row| row.try_get::<i64>("", "count"))
            .transpose()
            .map_err(db_err)?
            .unwrap_or(0);

        let models = lead::Entity::find()
            .from_raw_sql(page_statement(backend, &predicate, query))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items = models.into_iter().map(lead_model_to_domain).collect();
        Ok(PaginatedResult::new(
            items,
            total.max(0) as u64,
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
        let Some(mut existing) = self.find_lead(owner_id, id).await? else {
            return Ok(None);
        };

        changes.apply_to(&mut existing, Utc::now());
        let active = lead_to_active_model(&existing)?;
        let updated = active.update(&self.db).await.map_err(write_err)?;

        Ok(Some(lead_model_to_domain(updated)))
    }

    async fn delete_lead(&self, owner_id: i32, id: i32) -> DomainResult<bool> {
        let result = lead::Entity::delete_many()
            .filter(lead::Column::Id.eq(id))
            .filter(lead::Column::UserId.eq(owner_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::max_lead_value;

    #[test]
    fn cents_round_trip_through_model() {
        assert_eq!(to_cents(Decimal::new(750050, 2)).unwrap(), 750050);
        assert_eq!(to_cents(Decimal::from(12000)).unwrap(), 1_200_000);
        assert_eq!(Decimal::new(750050, 2).to_string(), "7500.50");
    }

    #[test]
    fn oversized_values_are_rejected_not_wrapped() {
        assert_eq!(to_cents(max_lead_value()).unwrap(), i64::MAX);
        assert!(matches!(
            to_cents(max_lead_value() + Decimal::new(1, 2)),
            Err(DomainError::Validation { .. })
        ));
        assert!(to_cents(Decimal::MAX).is_err());
    }

    #[test]
    fn enum_mappings_agree_on_names() {
        for status in LeadStatus::ALL {
            assert_eq!(status_to_domain(status_to_entity(status)), status);
        }
        for source in LeadSource::ALL {
            assert_eq!(source_to_domain(source_to_entity(source)), source);
        }
    }
}
