// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::currency::parse_masked_amount;

use crate::models::{
    AppointmentError, AppointmentFilters, CreateAppointmentRequest, SettlementInput,
    UpdateBasicsRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::filter::filter_and_sort;
use crate::services::lifecycle::AppointmentLifecycleService;

// ==============================================================================
// REQUEST PAYLOADS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct CancelPayload {
    pub reason: String,
}

/// Settlement fields as the masked form submits them: money arrives as
/// the raw digit string of the currency mask.
#[derive(Debug, Deserialize)]
pub struct SettlementPayload {
    pub value: Option<String>,
    pub doctor_payout: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

impl SettlementPayload {
    fn into_input(self) -> Result<SettlementInput, AppError> {
        let parse = |field: &str, raw: Option<String>| match raw {
            None => Ok(None),
            Some(raw) => parse_masked_amount(&raw)
                .map(Some)
                .map_err(|e| AppError::ValidationError(format!("{}: {}", field, e))),
        };

        Ok(SettlementInput {
            value: parse("value", self.value)?,
            doctor_payout: parse("doctor_payout", self.doctor_payout)?,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
        })
    }
}

// ==============================================================================
// HANDLERS
// ==============================================================================

pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentBookingService::from_config(&state);
    let appointment = service.create_appointment(request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "appointment": appointment }))))
}

/// List appointments through the filtering/sorting engine. A failing
/// store degrades to an empty list plus a warning; the view never
/// crashes on a read.
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(filters): Query<AppointmentFilters>,
) -> Json<Value> {
    let service = AppointmentLifecycleService::from_config(&state);

    let all = match service.list(filters.clone()).await {
        Ok(appointments) => appointments,
        Err(e) => {
            warn!("appointment listing failed, degrading to empty result: {}", e);
            return Json(json!({
                "appointments": [],
                "warning": "appointment listing is temporarily unavailable",
            }));
        }
    };

    let view = filter_and_sort(&all, &filters);
    Json(json!({ "appointments": view }))
}

pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::from_config(&state);
    let appointment = service.get(appointment_id).await?;
    Ok(Json(json!({ "appointment": appointment })))
}

pub async fn update_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateBasicsRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::from_config(&state);
    let current = service.get(appointment_id).await?;
    let updated = service.update_basics(&current, request).await?;
    Ok(Json(json!({ "appointment": updated })))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<Json<Value>, AppError> {
    if payload.reason.trim().is_empty() {
        return Err(AppointmentError::Validation("cancellation reason is required".to_string()).into());
    }

    let service = AppointmentLifecycleService::from_config(&state);
    let current = service.get(appointment_id).await?;
    let updated = service.cancel(&current, payload.reason.trim()).await?;
    Ok(Json(json!({ "appointment": updated })))
}

pub async fn realize_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentLifecycleService::from_config(&state);
    let current = service.get(appointment_id).await?;
    let updated = service.mark_realized(&current).await?;
    Ok(Json(json!({ "appointment": updated })))
}

pub async fn send_to_finance(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(payload): Json<SettlementPayload>,
) -> Result<Json<Value>, AppError> {
    let input = payload.into_input()?;

    let service = AppointmentLifecycleService::from_config(&state);
    let current = service.get(appointment_id).await?;
    let updated = service.send_to_finance(&current, &input).await?;
    Ok(Json(json!({ "appointment": updated })))
}
