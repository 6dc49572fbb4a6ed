// Library exports for testing and external use

pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{routing::get, Router};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<utils::config::AppConfig>,
    pub storage: Arc<services::file_storage::FileStorageService>,
    pub public_url: Arc<models::public_url::PublicUrl>,
    pub qr: Arc<services::qr_generator::QrGenerator>,
}

impl AppState {
    pub fn new(
        config: utils::config::AppConfig,
        storage: services::file_storage::FileStorageService,
        public_url: Arc<models::public_url::PublicUrl>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            public_url,
            qr: Arc::new(services::qr_generator::QrGenerator::new()),
        }
    }
}

/// Build the application router without middleware
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::upload::upload_form).post(handlers::upload::upload_file),
        )
        .route("/files", get(handlers::files::list_files))
        .route("/download/:name", get(handlers::download::download_file))
        .route("/qr", get(handlers::qr::qr_code))
        .with_state(app_state)
}
