// libs/catalog-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CatalogError, SlotPeriod};
use crate::services::availability::SlotSelector;
use crate::services::catalog::CatalogService;

#[derive(Debug, Deserialize)]
pub struct SlotQueryParams {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// Catalog reads degrade to an empty list plus a warning so a broken
// collaborator never takes the booking screen down with it.
fn degraded(operation: &str, e: &CatalogError) -> Json<Value> {
    warn!("{} failed, degrading to empty result: {}", operation, e);
    Json(json!({
        "items": [],
        "warning": format!("{} is temporarily unavailable", operation),
    }))
}

pub async fn list_specialties(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let service = CatalogService::from_config(&state);
    match service.list_specialties().await {
        Ok(items) => Json(json!({ "items": items })),
        Err(e) => degraded("specialty catalog", &e),
    }
}

pub async fn list_procedures(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let service = CatalogService::from_config(&state);
    match service.list_procedures().await {
        Ok(items) => Json(json!({ "items": items })),
        Err(e) => degraded("procedure catalog", &e),
    }
}

pub async fn list_doctors(State(state): State<Arc<AppConfig>>) -> Json<Value> {
    let service = CatalogService::from_config(&state);
    match service.list_doctors().await {
        Ok(items) => Json(json!({ "items": items })),
        Err(e) => degraded("doctor catalog", &e),
    }
}

pub async fn list_doctor_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(params): Query<SlotQueryParams>,
) -> Result<Json<Value>, AppError> {
    let period = SlotPeriod::new(params.from, params.to)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let selector = SlotSelector::from_config(&state);
    match selector.list_slots(doctor_id, period).await {
        Ok(items) => Ok(Json(json!({ "items": items }))),
        Err(CatalogError::DoctorNotFound) => {
            Err(AppError::NotFound("Doctor not found".to_string()))
        }
        Err(e) => Ok(degraded("slot listing", &e)),
    }
}
