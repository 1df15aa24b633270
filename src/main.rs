use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use talentgate_backend::{
    config::{get_config, init_config},
    database::registry::ConnectionManager,
    middleware, routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let registry = ConnectionManager::connect(&config.master_database_url).await?;
    registry.run_master_migrations().await?;

    let app_state = AppState::new(registry);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    // No bearer token yet; tenant comes from the X-Tenant-Id header.
    let public_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register_candidate))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/admin/login", post(routes::auth::admin_login))
        .route("/api/jobs/public", get(routes::job::list_public_jobs))
        .route("/api/jobs/public/:id", get(routes::job::get_public_job));

    let protected_api = Router::new()
        .route("/api/me", get(routes::auth::me))
        .route("/api/applications", post(routes::application::apply))
        .route(
            "/api/applications/mine",
            get(routes::application::my_applications),
        )
        .route(
            "/api/applications/:id",
            get(routes::application::get_application),
        )
        .route(
            "/api/applications/:id/communications",
            post(routes::application::add_communication),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(routes::application::withdraw),
        )
        .route(
            "/api/candidate/documents",
            post(routes::document::upload_resume),
        )
        .route(
            "/api/me/profile",
            axum::routing::patch(routes::candidate::update_profile),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_identity,
        ));

    let staff_api = Router::new()
        .route(
            "/api/jobs",
            get(routes::job::list_jobs).post(routes::job::create_job),
        )
        .route(
            "/api/jobs/:id",
            get(routes::job::get_job).patch(routes::job::update_job),
        )
        .route(
            "/api/jobs/:id/applications",
            get(routes::application::list_for_job),
        )
        .route(
            "/api/applications/:id/status",
            post(routes::application::update_status),
        )
        .route(
            "/api/applications/:id/interviews",
            post(routes::application::schedule_interview),
        )
        .route(
            "/api/applications/:id/interviews/:index/feedback",
            post(routes::application::interview_feedback),
        )
        .route(
            "/api/applications/:id/screening",
            post(routes::application::set_screening),
        )
        .route("/api/candidates", get(routes::candidate::list_candidates))
        .layer(axum::middleware::from_fn(middleware::auth::require_staff))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::require_identity,
        ));

    let upload_path = config.uploads_dir.clone();
    info!("Serving uploads from: {}", upload_path);

    let app = base_routes
        .merge(public_api)
        .merge(protected_api)
        .merge(staff_api)
        .nest_service("/uploads", tower_http::services::ServeDir::new(upload_path))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
