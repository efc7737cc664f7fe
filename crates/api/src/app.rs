use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_user_auth, trace_id,
    RateLimiterState,
};
use crate::routes::{
    audits, auth, controls, evidence, frameworks, health, organizations, policies, tasks,
};
use crate::services::JwksVerifier;
use crate::storage::BlobStore;

/// Room for multipart framing and the text fields around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub jwks: Option<Arc<JwksVerifier>>,
    pub auth_rate_limiter: Option<Arc<RateLimiterState>>,
    pub evidence_store: Arc<dyn BlobStore>,
    pub export_store: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        evidence_store: Arc<dyn BlobStore>,
        export_store: Arc<dyn BlobStore>,
    ) -> Result<Self, JwtError> {
        let jwt = JwtConfig::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        let jwks = config
            .jwks_url()
            .map(|url| Arc::new(JwksVerifier::new(url, config.jwt.jwks_cache_ttl_secs)));

        // Disabled when auth_rate_limit_per_minute is 0
        let auth_rate_limiter =
            RateLimiterState::new(config.security.auth_rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            jwks,
            auth_rate_limiter,
            evidence_store,
            export_store,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Registration and login, limited per client IP
    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let upload_limit = config
        .storage
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    // Protected routes (require a Bearer token)
    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/logout", post(auth::logout))
        // Organization
        .route(
            "/api/v1/organizations/me",
            get(organizations::get_my_organization).put(organizations::update_my_organization),
        )
        .route(
            "/api/v1/organizations/me/stats",
            get(organizations::get_my_organization_stats),
        )
        // Frameworks and controls
        .route("/api/v1/frameworks", get(frameworks::list_frameworks))
        .route(
            "/api/v1/frameworks/:framework_id",
            get(frameworks::get_framework),
        )
        .route("/api/v1/controls", get(controls::list_controls))
        .route("/api/v1/controls/seed", post(controls::seed_controls))
        .route("/api/v1/controls/:control_id", get(controls::get_control))
        // Policies
        .route(
            "/api/v1/policies",
            get(policies::list_policies).post(policies::create_policy),
        )
        .route("/api/v1/policies/generate", post(policies::generate))
        .route(
            "/api/v1/policies/:policy_id",
            get(policies::get_policy)
                .put(policies::update_policy)
                .delete(policies::delete_policy),
        )
        // Evidence
        .route("/api/v1/evidence", get(evidence::list_evidence))
        .route(
            "/api/v1/evidence/upload",
            post(evidence::upload_evidence).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/evidence/control/:control_id",
            get(evidence::list_control_evidence),
        )
        .route(
            "/api/v1/evidence/:evidence_id",
            get(evidence::get_evidence)
                .put(evidence::update_evidence)
                .delete(evidence::delete_evidence),
        )
        .route(
            "/api/v1/evidence/:evidence_id/download",
            get(evidence::download_evidence),
        )
        .route(
            "/api/v1/evidence/:evidence_id/status",
            put(evidence::update_evidence_status),
        )
        // Tasks
        .route(
            "/api/v1/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route("/api/v1/tasks/my", get(tasks::list_my_tasks))
        .route(
            "/api/v1/tasks/:task_id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // Audit exports
        .route("/api/v1/audits", get(audits::list_exports))
        .route("/api/v1/audits/export", post(audits::create_export))
        .route("/api/v1/audits/:export_id", get(audits::get_export))
        .route(
            "/api/v1/audits/:export_id/download",
            get(audits::download_export),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
