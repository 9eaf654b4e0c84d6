//! API Router with Swagger UI

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{LeadService, UserService};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::health::StoreMode;
use crate::interfaces::http::modules::{auth, health, leads, metrics, request_id};

/// Everything the router needs, assembled once at startup
#[derive(Clone)]
pub struct ApiContext {
    pub repos: Arc<dyn RepositoryProvider>,
    pub jwt_config: JwtConfig,
    pub cookie_name: String,
    pub secure_cookie: bool,
    /// `development` exposes internal error text in 500 responses
    pub environment: String,
    pub mode: StoreMode,
    /// `None` in demo mode
    pub db: Option<DatabaseConnection>,
    /// Single allowed CORS origin; credentials are allowed for it
    pub frontend_url: String,
    /// `GET /metrics` is mounted only when set
    pub metrics: Option<PrometheusHandle>,
}

impl ApiContext {
    fn expose_internal_errors(&self) -> bool {
        self.environment == "development"
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("auth-token"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Same JWT as the session cookie"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::get_current_user,
        leads::list_leads,
        leads::get_lead,
        leads::create_lead,
        leads::update_lead,
        leads::delete_lead,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and store status"),
        (name = "Authentication", description = "Account registration and cookie sessions"),
        (name = "Leads", description = "Lead CRUD and filtered, paginated listing"),
    ),
    info(
        title = "Lead Service API",
        version = "1.0.0",
        description = "REST API for managing sales leads"
    )
)]
pub struct ApiDoc;

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = match frontend_url.parse() {
        Ok(origin) => vec![origin],
        Err(_) => {
            tracing::warn!(frontend_url, "Invalid CORS origin, cross-origin requests disabled");
            Vec::new()
        }
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn route_not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Route not found",
            "path": uri.path(),
        })),
    )
}

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let expose_internal_errors = ctx.expose_internal_errors();

    let middleware_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
        cookie_name: ctx.cookie_name.clone(),
    };

    let auth_state = auth::AuthHandlerState {
        user_service: Arc::new(UserService::new(ctx.repos.clone(), ctx.jwt_config.clone())),
        cookie_name: ctx.cookie_name.clone(),
        secure_cookie: ctx.secure_cookie,
        expose_internal_errors,
    };

    let lead_state = leads::LeadHandlerState {
        lead_service: Arc::new(LeadService::new(ctx.repos.clone())),
        expose_internal_errors,
    };

    let health_state = health::HealthState {
        db: ctx.db.clone(),
        mode: ctx.mode,
        environment: ctx.environment.clone(),
    };

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .with_state(auth_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // Lead routes (protected)
    let lead_routes = Router::new()
        .route("/", get(leads::list_leads).post(leads::create_lead))
        .route(
            "/{id}",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(lead_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::health_check).with_state(health_state))
        .nest("/api/auth", auth_routes)
        .nest("/api/auth", auth_protected_routes)
        .nest("/api/leads", lead_routes);

    if let Some(handle) = ctx.metrics {
        router = router.route(
            "/metrics",
            get(metrics::render_metrics).with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .route_layer(middleware::from_fn(metrics::track_http_metrics))
        .fallback(route_not_found)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(CookieManagerLayer::new())
        .layer(cors_layer(&ctx.frontend_url))
        .layer(TraceLayer::new_for_http())
}
