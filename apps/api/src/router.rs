use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use catalog_cell::router::catalog_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic Agenda API is running!" }))
        .nest("/catalog", catalog_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}
