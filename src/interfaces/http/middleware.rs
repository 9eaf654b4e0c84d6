//! Authentication middleware for Axum
//!
//! A request is authenticated by the session cookie, or failing that by an
//! `Authorization: Bearer` header. Either carries the same JWT.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_cookies::Cookies;

use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// State for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    /// Name of the HTTP-only session cookie
    pub cookie_name: String,
}

/// Authenticated account, inserted into request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            user_id: claims.user_id()?,
            email: claims.email,
        })
    }
}

fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim)
}

/// Cookie first, then the `Authorization` header.
fn find_token(cookies: &Cookies, cookie_name: &str, request: &Request<Body>) -> Option<String> {
    if let Some(cookie) = cookies.get(cookie_name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer)
        .map(String::from)
}

/// JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = find_token(&cookies, &auth_state.cookie_name, &request) else {
        return auth_error_response(AuthError::MissingToken);
    };

    match verify_token(&token, &auth_state.jwt_config) {
        Ok(claims) => match AuthenticatedUser::from_claims(claims) {
            Some(user) => {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
            None => auth_error_response(AuthError::InvalidToken),
        },
        Err(e) if matches!(e.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
            auth_error_response(AuthError::ExpiredToken)
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Access token required",
        AuthError::InvalidToken => "Invalid token",
        AuthError::ExpiredToken => "Token expired",
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (StatusCode::UNAUTHORIZED, body).into_response()
}
