use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use portfolio_api_server::auth::{self, JwtManager};
use portfolio_api_server::config::Settings;
use portfolio_api_server::database::{DbPool, Repository};
use portfolio_api_server::handlers;
use portfolio_api_server::portfolio::PortfolioStore;
use portfolio_api_server::services::{AnalysisService, EmailService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,portfolio_api_server=debug".to_string()),
        )
        .with_target(true)
        .json()
        .init();

    info!("Starting Portfolio API Server...");

    // Load configuration
    let settings = Settings::load()?;
    info!("Configuration loaded");

    // Initialize database pool
    let db_pool = DbPool::new(&settings.database).await?;
    info!("Database connection established");

    // Initialize repository and portfolio cache
    let repository = Arc::new(Repository::new(db_pool));
    let portfolio_store = Arc::new(PortfolioStore::new(repository.clone()));

    // Initialize external-service clients
    let analysis_service = Arc::new(AnalysisService::new(settings.ai.clone()));
    let email_service = Arc::new(EmailService::new(settings.email.clone())?);

    let jwt_manager = Arc::new(JwtManager::new(
        &settings.auth.jwt_secret,
        settings.auth.token_expiry_hours,
    ));

    // Build router
    let app = build_router(
        repository,
        portfolio_store,
        analysis_service,
        email_service,
        jwt_manager,
        settings.clone(),
    );

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn build_router(
    repository: Arc<Repository>,
    portfolio_store: Arc<PortfolioStore>,
    analysis_service: Arc<AnalysisService>,
    email_service: Arc<EmailService>,
    jwt_manager: Arc<JwtManager>,
    settings: Settings,
) -> Router {
    // Public routes: liveness, login, the founder-facing form, and the
    // two scheduler/webhook job endpoints (the reminder job carries its
    // own shared-secret check).
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route(
            "/forms/{startup_id}",
            get(handlers::forms::form_context_handler).post(handlers::forms::submit_form_handler),
        )
        .route(
            "/jobs/analyze-health",
            post(handlers::analysis::analyze_health_handler),
        )
        .route(
            "/jobs/send-monthly-forms",
            post(handlers::reminders::send_monthly_forms_handler),
        );

    // Investor routes behind the bearer guard
    let protected_routes = Router::new()
        .route("/api/dashboard", get(handlers::dashboard::dashboard_handler))
        .route(
            "/api/startups",
            post(handlers::startups::create_startup_handler),
        )
        .route(
            "/api/startups/{id}",
            get(handlers::startups::startup_detail_handler)
                .put(handlers::startups::update_startup_handler)
                .delete(handlers::startups::delete_startup_handler),
        )
        .route(
            "/api/metrics",
            post(handlers::metrics::submit_metrics_handler),
        )
        .route(
            "/api/meetings",
            post(handlers::meetings::add_meeting_handler),
        )
        .layer(middleware::from_fn(auth::middleware::require_auth));

    // Combine routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Shared state
        .layer(Extension(repository))
        .layer(Extension(portfolio_store))
        .layer(Extension(analysis_service))
        .layer(Extension(email_service))
        .layer(Extension(jwt_manager))
        .layer(Extension(settings))
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
