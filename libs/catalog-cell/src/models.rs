// libs/catalog-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty_ids: Vec<Uuid>,
    pub procedure_ids: Vec<Uuid>,
}

impl Doctor {
    pub fn covers_specialty(&self, specialty_id: Uuid) -> bool {
        self.specialty_ids.contains(&specialty_id)
    }

    pub fn covers_procedure(&self, procedure_id: Uuid) -> bool {
        self.procedure_ids.contains(&procedure_id)
    }
}

/// One bookable slot as the slot provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// A day's worth of candidate times for one doctor; times ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotCandidate {
    pub date: NaiveDate,
    pub times: Vec<NaiveTime>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SlotPeriod {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CatalogError> {
        if from > to {
            return Err(CatalogError::InvalidPeriod(format!(
                "period start {} is after period end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }
}

/// Everything the booking wizard needs to populate its choice lists,
/// fetched once per wizard session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub specialties: Vec<Specialty>,
    pub procedures: Vec<Procedure>,
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("{operation} failed: {message}")]
    Upstream {
        operation: &'static str,
        message: String,
    },
}
