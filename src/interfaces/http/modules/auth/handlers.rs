//! Authentication API handlers
//!
//! Sessions are carried in an HTTP-only cookie holding the JWT.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use tower_cookies::cookie::{time::Duration, SameSite};
use tower_cookies::{Cookie, Cookies};

use super::dto::{
    CurrentUserResponse, LoginRequest, RegisterRequest, SessionResponse, UserInfo,
};
use crate::application::{AuthResult, UserService};
use crate::interfaces::http::common::{error_response, ApiError, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService>,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub expose_internal_errors: bool,
}

impl AuthHandlerState {
    fn session_cookie(&self, token: String, expires_in: i64) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Strict)
            .max_age(Duration::seconds(expires_in))
            .build()
    }

    fn start_session(&self, cookies: &Cookies, auth: AuthResult) -> SessionResponse {
        cookies.add(self.session_cookie(auth.token.clone(), auth.expires_in));
        SessionResponse {
            user: UserInfo::from(auth.user),
            token: auth.token,
            expires_in: auth.expires_in,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookie set", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Validation error or email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    cookies: Cookies,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponse>>), ApiError> {
    let auth = state
        .user_service
        .register(request.into_registration())
        .await
        .map_err(|e| error_response(e, state.expose_internal_errors))?;

    let session = state.start_session(&cookies, auth);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("User registered successfully", session)),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login, session cookie set", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    cookies: Cookies,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, ApiError> {
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let auth = state
        .user_service
        .login(&email, &password)
        .await
        .map_err(|e| error_response(e, state.expose_internal_errors))?;

    let session = state.start_session(&cookies, auth);
    Ok(Json(ApiResponse::with_message("Login successful", session)))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(
    State(state): State<AuthHandlerState>,
    cookies: Cookies,
) -> Json<ApiResponse<()>> {
    cookies.remove(Cookie::build((state.cookie_name.clone(), "")).path("/").build());
    Json(ApiResponse::message("Logout successful"))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("cookie_auth" = []), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = ApiResponse<CurrentUserResponse>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<CurrentUserResponse>>, ApiError> {
    let account = state
        .user_service
        .current_user(user.user_id)
        .await
        .map_err(|e| error_response(e, state.expose_internal_errors))?;

    Ok(Json(ApiResponse::success(CurrentUserResponse {
        user: UserInfo::from(account),
    })))
}
