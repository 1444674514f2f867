// libs/catalog-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn catalog_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/specialties", get(handlers::list_specialties))
        .route("/procedures", get(handlers::list_procedures))
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/{doctor_id}/slots", get(handlers::list_doctor_slots))
        .with_state(state)
}
