//! Lead API handlers
//!
//! Every route runs behind the auth middleware; the authenticated account
//! scopes every read and write.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use super::dto::{
    CreateLeadRequest, DeletedLead, LeadEnvelope, LeadListResponse, UpdateLeadRequest,
};
use crate::application::LeadService;
use crate::domain::{DomainError, LeadFilter};
use crate::interfaces::http::common::{
    error_response, validation_details, ApiError, ApiResponse, IdPath, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct LeadHandlerState {
    pub lead_service: Arc<LeadService>,
    pub expose_internal_errors: bool,
}

impl LeadHandlerState {
    fn fail(&self, err: DomainError) -> ApiError {
        error_response(err, self.expose_internal_errors)
    }
}

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Rows per page, 1-100"),
        ("search" = Option<String>, Query, description = "Substring of name, email, company or city"),
        ("status" = Option<Vec<String>>, Query, description = "One or more statuses"),
        ("source" = Option<Vec<String>>, Query, description = "One or more sources"),
        ("score_min" = Option<i32>, Query),
        ("score_max" = Option<i32>, Query),
        ("lead_value_min" = Option<f64>, Query),
        ("lead_value_max" = Option<f64>, Query),
        ("is_qualified" = Option<bool>, Query),
        ("date_from" = Option<String>, Query, description = "ISO date, lower bound on created_at"),
        ("date_to" = Option<String>, Query, description = "ISO date, upper bound on created_at"),
        ("sort_by" = Option<String>, Query, description = "Sort column, default created_at"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default desc")
    ),
    responses(
        (status = 200, description = "One page of leads", body = LeadListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_leads(
    State(state): State<LeadHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    RawQuery(query): RawQuery,
) -> Result<Json<LeadListResponse>, ApiError> {
    let raw = query.unwrap_or_default();
    let filter = LeadFilter::from_query_pairs(url::form_urlencoded::parse(raw.as_bytes()))
        .map_err(|e| state.fail(e))?;

    let page = state
        .lead_service
        .list_leads(user.user_id, &filter)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(Json(LeadListResponse::from(page)))
}

#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead details", body = ApiResponse<LeadEnvelope>),
        (status = 400, description = "Non-integer id"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_lead(
    State(state): State<LeadHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<LeadEnvelope>>, ApiError> {
    let lead = state
        .lead_service
        .get_lead(user.user_id, id)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(Json(ApiResponse::success(LeadEnvelope::from(lead))))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = ApiResponse<LeadEnvelope>),
        (status = 400, description = "Validation error or duplicate email")
    )
)]
pub async fn create_lead(
    State(state): State<LeadHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    ValidatedJson(request): ValidatedJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LeadEnvelope>>), ApiError> {
    let new_lead = request.into_new_lead().map_err(|e| state.fail(e))?;
    let lead = state
        .lead_service
        .create_lead(user.user_id, new_lead)
        .await
        .map_err(|e| state.fail(e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Lead created successfully",
            LeadEnvelope::from(lead),
        )),
    ))
}

/// The lead is resolved before the body is looked at, so an unknown id
/// answers 404 even when the body is invalid.
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lead ID")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = ApiResponse<LeadEnvelope>),
        (status = 400, description = "Validation error or duplicate email"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_lead(
    State(state): State<LeadHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    IdPath(id): IdPath,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ApiResponse<LeadEnvelope>>, ApiError> {
    state
        .lead_service
        .get_lead(user.user_id, id)
        .await
        .map_err(|e| state.fail(e))?;

    let Json(body) = body
        .map_err(|rejection| state.fail(DomainError::validation(vec![rejection.body_text()])))?;
    let request: UpdateLeadRequest = serde_json::from_value(body)
        .map_err(|e| state.fail(DomainError::validation(vec![e.to_string()])))?;
    request
        .validate()
        .map_err(|e| state.fail(DomainError::validation(validation_details(&e))))?;

    let changes = request.into_changes().map_err(|e| state.fail(e))?;
    let lead = state
        .lead_service
        .update_lead(user.user_id, id, changes)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(Json(ApiResponse::with_message(
        "Lead updated successfully",
        LeadEnvelope::from(lead),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead deleted", body = ApiResponse<DeletedLead>),
        (status = 400, description = "Non-integer id"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_lead(
    State(state): State<LeadHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    IdPath(id): IdPath,
) -> Result<Json<ApiResponse<DeletedLead>>, ApiError> {
    let id = state
        .lead_service
        .delete_lead(user.user_id, id)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(Json(ApiResponse::with_message(
        "Lead deleted successfully",
        DeletedLead { id },
    )))
}
