// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentError, AppointmentKind, AppointmentStatus, CreateAppointmentRequest,
};
use crate::store::{AppointmentStore, RestAppointmentStore};

/// Persists finalized booking drafts. New appointments always start as
/// Awaiting; a slot already held by a live appointment for the same
/// doctor is rejected before the create call goes out.
pub struct AppointmentBookingService {
    store: Arc<dyn AppointmentStore>,
}

impl AppointmentBookingService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(RestAppointmentStore::new(config)))
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        Self::validate_request(&request)?;

        debug!(
            "Booking {} with doctor {} on {} {}",
            request.kind, request.doctor_id, request.date, request.time
        );

        let same_day = self
            .store
            .list_for_doctor_date(request.doctor_id, request.date)
            .await
            .map_err(|e| {
                warn!("conflict check failed for doctor {}: {}", request.doctor_id, e);
                AppointmentError::Collaborator {
                    operation: "check_conflicts",
                    id: None,
                    message: e.to_string(),
                }
            })?;

        let slot_taken = same_day
            .iter()
            .any(|a| a.time == request.time && a.status != AppointmentStatus::Cancelled);
        if slot_taken {
            warn!(
                "Slot conflict for doctor {} at {} {}",
                request.doctor_id, request.date, request.time
            );
            return Err(AppointmentError::SlotTaken {
                doctor_id: request.doctor_id,
                date: request.date,
                time: request.time,
            });
        }

        let appointment = self.store.create(request).await.map_err(|e| {
            warn!("create_appointment failed: {}", e);
            AppointmentError::Collaborator {
                operation: "create_appointment",
                id: None,
                message: e.to_string(),
            }
        })?;

        info!(
            "Appointment {} booked with doctor {} (status {})",
            appointment.id, appointment.doctor_id, appointment.status
        );
        Ok(appointment)
    }

    // The wizard validates its own steps, but creates can also arrive
    // straight over HTTP.
    fn validate_request(request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
        let missing: Vec<&str> = [
            ("patient name", &request.patient_name),
            ("patient age", &request.patient_age),
            ("insurance", &request.insurance),
            ("patient phone", &request.patient_phone),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(AppointmentError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        match request.kind {
            AppointmentKind::Consultation => {
                if request.specialty.as_deref().map_or(true, |s| s.trim().is_empty()) {
                    return Err(AppointmentError::Validation(
                        "consultation requires a specialty".to_string(),
                    ));
                }
            }
            AppointmentKind::Exam => {
                if request
                    .procedure_name
                    .as_deref()
                    .map_or(true, |s| s.trim().is_empty())
                {
                    return Err(AppointmentError::Validation(
                        "exam requires a procedure".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}
