use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use configuration::Config;
use database::{DbRepository, RecordStore};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod logging;
pub mod upload;

use upload::UploadStore;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub uploads: UploadStore,
    /// Answer 404 instead of success when update/delete match no row.
    pub strict_not_found: bool,
}

/// Builds the application router around an already-constructed state.
pub fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());
    let static_files = ServeDir::new(state.uploads.root());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        // --- Lookups ---
        .route("/api/classes", get(handlers::lookup::get_classes))
        .route("/api/semesters", get(handlers::lookup::get_semesters))
        .route("/api/sections", get(handlers::lookup::get_sections))
        .route("/api/details", get(handlers::lookup::get_details))
        // --- Admin ---
        .route("/api/admin/add", post(handlers::admin::add_record))
        .route("/api/admin/records", get(handlers::admin::list_records))
        .route("/api/admin/update/:id", put(handlers::admin::update_record))
        .route("/api/admin/delete/:id", delete(handlers::admin::delete_record))
        .nest_service(&format!("/{}", upload::PUBLIC_PREFIX), static_files)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Connects to the database, applies the schema and serves until shutdown.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let db_pool = database::connect(&config.database).await?;
    database::run_migrations(&db_pool).await?;
    let store: Arc<dyn RecordStore> = Arc::new(DbRepository::new(db_pool));

    let uploads = UploadStore::new(&config.uploads.root);
    uploads.ensure_directories().await?;

    let app_state = Arc::new(AppState {
        store,
        uploads,
        strict_not_found: config.admin.strict_not_found,
    });
    let app = build_router(app_state, config.uploads.max_body_bytes);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        uploads = %config.uploads.root.display(),
        strict_not_found = config.admin.strict_not_found,
        "Web server listening."
    );
    axum::serve(listener, app).await?;

    Ok(())
}
