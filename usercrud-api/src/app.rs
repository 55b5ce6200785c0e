/// Application state and router builder
///
/// This module defines the shared application state, connects the configured
/// storage backend, and builds the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use usercrud_api::{app, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let backend = app::connect_backend(&config).await?;
/// let state = app::AppState::new(backend.service(), config);
/// let router = app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::{Config, StoreKind};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};
use usercrud_shared::{
    db::{migrations, pool},
    service::UserService,
    store::{memory::InMemoryUserStore, postgres::PgUserStore, UserStore},
};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// User operations
    pub users: UserService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(users: UserService, config: Config) -> Self {
        Self {
            users,
            config: Arc::new(config),
        }
    }
}

/// A connected storage backend
///
/// `pool` is set for the postgres store so the caller can close it on
/// shutdown.
pub struct Backend {
    /// The store handlers read and write through
    pub store: Arc<dyn UserStore>,

    /// Connection pool backing `store`, if any
    pub pool: Option<PgPool>,
}

impl Backend {
    /// Wraps the store in a service
    pub fn service(&self) -> UserService {
        UserService::new(Arc::clone(&self.store))
    }
}

/// Connects the storage backend selected by `config.store`
///
/// For PostgreSQL this creates the database if missing, opens the pool and
/// applies migrations (unless `RUN_MIGRATIONS=false`).
///
/// # Errors
///
/// Returns an error if the database cannot be reached or a migration fails.
pub async fn connect_backend(config: &Config) -> anyhow::Result<Backend> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory user store; data will not survive a restart");
            Ok(Backend {
                store: Arc::new(InMemoryUserStore::new()),
                pool: None,
            })
        }
        StoreKind::Postgres => {
            if config.database.run_migrations {
                migrations::ensure_database_exists(&config.database.url).await?;
            }

            let pg_pool = pool::create_pool(config.pool_config()).await?;

            if config.database.run_migrations {
                migrations::run_migrations(&pg_pool).await?;
            }

            Ok(Backend {
                store: Arc::new(PgUserStore::new(pg_pool.clone())),
                pool: Some(pg_pool),
            })
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Routes
///
/// ```text
/// /
/// ├── GET    /health       # Health check
/// ├── POST   /users        # Create user      201 | 400 | 409
/// ├── GET    /users        # List users       200
/// ├── GET    /users/:id    # Get user         200 | 400 | 404
/// ├── PATCH  /users/:id    # Update user      200 | 400 | 404 | 409
/// └── DELETE /users/:id    # Delete user      204 | 400 | 404
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let user_routes = Router::new()
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    let cors = build_cors(&state.config);

    Router::new()
        .merge(health_routes)
        .merge(user_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS policy from configuration
///
/// `*` in the origin list gives a permissive policy (the frontend usually
/// runs on a different port during development).
fn build_cors(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
