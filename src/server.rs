//! Server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: store selection (database or
//! seeded in-memory demo data), migrations, metrics recorder, REST API and
//! graceful shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::{init_database, seed_demo_data, InMemoryRepositoryProvider};
use crate::interfaces::http::modules::health::StoreMode;
use crate::interfaces::{create_api_router, ApiContext};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Use the seeded in-memory store even when a database is configured.
    pub force_demo: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            force_demo: false,
        }
    }
}

/// The global recorder can only be installed once per process.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!(error = %e, "Prometheus recorder unavailable, /metrics disabled");
                None
            }
        })
        .clone()
}

// ── Store selection ────────────────────────────────────────────────

struct Store {
    repos: Arc<dyn RepositoryProvider>,
    db: Option<DatabaseConnection>,
    mode: StoreMode,
}

async fn open_demo_store() -> Result<Store, Box<dyn std::error::Error>> {
    let provider = InMemoryRepositoryProvider::new();
    let account = seed_demo_data(&provider).await?;
    info!(
        email = %account.email,
        leads = provider.lead_store().len(),
        "🎭 Demo mode: serving seeded in-memory data"
    );
    Ok(Store {
        repos: Arc::new(provider),
        db: None,
        mode: StoreMode::Demo,
    })
}

async fn open_database_store(
    config: &AppConfig,
    auto_migrate: bool,
) -> Result<Store, Box<dyn std::error::Error>> {
    let db = init_database(&config.database.to_database_config()).await?;

    if auto_migrate {
        info!("Running database migrations...");
        Migrator::up(&db, None).await?;
        info!("Migrations completed");
    }

    Ok(Store {
        repos: Arc::new(SeaOrmRepositoryProvider::new(db.clone())),
        db: Some(db),
        mode: StoreMode::Production,
    })
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running service.
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    pub mode: StoreMode,
    /// Port the API is listening on.
    pub port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Select and prepare the store, then bind and serve the REST API.
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting lead service...");

        let metrics = if app_cfg.metrics.enabled {
            prometheus_handle()
        } else {
            None
        };

        let store = if opts.force_demo || app_cfg.is_demo() {
            open_demo_store().await?
        } else {
            open_database_store(&app_cfg, opts.auto_migrate).await?
        };

        let jwt_config = JwtConfig::new(
            app_cfg.security.jwt_secret.clone(),
            app_cfg.security.jwt_expiration_hours,
        );
        info!(
            "JWT configured with {}h token expiration",
            jwt_config.expiration_hours
        );

        let api_router = create_api_router(ApiContext {
            repos: store.repos.clone(),
            jwt_config,
            cookie_name: app_cfg.security.cookie_name.clone(),
            secure_cookie: app_cfg.security.secure_cookie,
            environment: app_cfg.server.environment.clone(),
            mode: store.mode,
            db: store.db.clone(),
            frontend_url: app_cfg.cors.frontend_url.clone(),
            metrics,
        });

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        info!("REST API server listening on http://{}", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            repos: store.repos,
            config: app_cfg,
            mode: store.mode,
            port,
            db: store.db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests (bounded by the shutdown timeout), then
    /// close the database pool.
    pub async fn wait(self) {
        let api_task = self.api_task;
        self.shutdown
            .run_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;

        if let Some(db) = self.db {
            match db.close().await {
                Ok(()) => info!("✅ Database connection closed"),
                Err(e) => warn!("Error closing database connection: {}", e),
            }
        }

        info!("👋 Lead service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config. `RUST_LOG` wins over
/// the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
