// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::phone::mask_phone;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub kind: AppointmentKind,
    /// Populated for Consultation appointments.
    pub specialty: Option<String>,
    /// Populated for Exam appointments.
    pub procedure_name: Option<String>,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub patient_name: String,
    pub patient_age: String,
    pub insurance: String,
    /// Stored as bare digits; masked for display only.
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub settlement: Option<Settlement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The descriptive field for this appointment's kind.
    pub fn description(&self) -> Option<&str> {
        match self.kind {
            AppointmentKind::Consultation => self.specialty.as_deref(),
            AppointmentKind::Exam => self.procedure_name.as_deref(),
        }
    }

    pub fn display_phone(&self) -> String {
        mask_phone(&self.patient_phone)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Awaiting,
    Realized,
    Cancelled,
}

impl AppointmentStatus {
    /// Realized and Cancelled never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Realized | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Awaiting => write!(f, "awaiting"),
            AppointmentStatus::Realized => write!(f, "realized"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Consultation,
    Exam,
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentKind::Consultation => write!(f, "consultation"),
            AppointmentKind::Exam => write!(f, "exam"),
        }
    }
}

/// Financial sub-record attached to an appointment on its way to Realized.
/// Everything but `sent_to_finance` is frozen once that flag is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settlement {
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    /// start_time + duration, wrapping past midnight. Display-only.
    pub end_time: NaiveTime,
    pub value: Decimal,
    pub doctor_payout: Decimal,
    pub notes: Option<String>,
    pub sent_to_finance: bool,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub kind: AppointmentKind,
    pub specialty: Option<String>,
    pub procedure_name: Option<String>,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub patient_name: String,
    pub patient_age: String,
    pub insurance: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBasicsRequest {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Raw settlement fields as entered; validated and completed by
/// `AppointmentLifecycleService::record_settlement`.
#[derive(Debug, Clone, Default)]
pub struct SettlementInput {
    pub value: Option<Decimal>,
    pub doctor_payout: Option<Decimal>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilters {
    pub kind: Option<AppointmentKind>,
    pub specialty: Option<String>,
    pub procedure_name: Option<String>,
    pub doctor_name: Option<String>,
    pub status: Option<AppointmentStatus>,
}

/// Partial update written through the persistence collaborator. Absent
/// fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<Settlement>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

fn fmt_target(id: &Option<Uuid>) -> String {
    match id {
        Some(id) => format!(" for appointment {}", id),
        None => String::new(),
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Appointment {id} cannot leave terminal status {status}")]
    InvalidTransition { id: Uuid, status: AppointmentStatus },

    #[error("Settlement for appointment {0} is read-only after being sent to finance")]
    SettlementLocked(Uuid),

    #[error("Slot {date} {time} is already booked for doctor {doctor_id}")]
    SlotTaken {
        doctor_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    },

    #[error("{operation} failed{}: {message}", fmt_target(.id))]
    Collaborator {
        operation: &'static str,
        id: Option<Uuid>,
        message: String,
    },

    #[error("Settlement saved for appointment {id} but finance forwarding failed: {message}")]
    PartialFailure { id: Uuid, message: String },
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match &err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::Validation(_) => AppError::ValidationError(err.to_string()),
            AppointmentError::InvalidTransition { .. }
            | AppointmentError::SettlementLocked(_)
            | AppointmentError::SlotTaken { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::Collaborator { .. } => AppError::ExternalService(err.to_string()),
            AppointmentError::PartialFailure { .. } => AppError::PartialFailure(err.to_string()),
        }
    }
}
