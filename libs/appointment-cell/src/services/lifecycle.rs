// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_utils::phone::normalize_phone;

use crate::models::{
    Appointment, AppointmentError, AppointmentFilters, AppointmentPatch, AppointmentStatus,
    Settlement, SettlementInput, UpdateBasicsRequest,
};
use crate::store::{AppointmentStore, FinanceGateway, RestAppointmentStore, RestFinanceGateway};

/// Owns the Awaiting -> Realized/Cancelled status machine and the
/// settlement sub-flow. Collaborator failures are reported once, with the
/// operation and appointment id; the in-memory appointment passed in is
/// never mutated, so a failed call leaves no partial local state.
pub struct AppointmentLifecycleService {
    store: Arc<dyn AppointmentStore>,
    finance: Arc<dyn FinanceGateway>,
}

impl AppointmentLifecycleService {
    pub fn new(store: Arc<dyn AppointmentStore>, finance: Arc<dyn FinanceGateway>) -> Self {
        Self { store, finance }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(RestAppointmentStore::new(config)),
            Arc::new(RestFinanceGateway::new(config)),
        )
    }

    /// All valid next statuses for a given current status.
    pub fn valid_transitions(current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Awaiting => {
                &[AppointmentStatus::Realized, AppointmentStatus::Cancelled]
            }
            // Terminal states - no transitions allowed
            AppointmentStatus::Realized | AppointmentStatus::Cancelled => &[],
        }
    }

    fn validate_status_transition(
        appointment: &Appointment,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Validating status transition {} -> {} for appointment {}",
            appointment.status, new_status, appointment.id
        );

        if !Self::valid_transitions(appointment.status).contains(&new_status) {
            warn!(
                "Invalid status transition attempted on appointment {}: {} -> {}",
                appointment.id, appointment.status, new_status
            );
            return Err(AppointmentError::InvalidTransition {
                id: appointment.id,
                status: appointment.status,
            });
        }

        Ok(())
    }

    fn ensure_not_terminal(appointment: &Appointment) -> Result<(), AppointmentError> {
        if appointment.is_terminal() {
            return Err(AppointmentError::InvalidTransition {
                id: appointment.id,
                status: appointment.status,
            });
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .get(id)
            .await
            .map_err(|e| AppointmentError::Collaborator {
                operation: "get_appointment",
                id: Some(id),
                message: e.to_string(),
            })?
            .ok_or(AppointmentError::NotFound)
    }

    /// Fetch appointments, letting the store narrow the result server-side.
    /// Ordering and the kind-scoped filter semantics stay with the
    /// filtering engine.
    pub async fn list(
        &self,
        filters: AppointmentFilters,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.store
            .list(filters)
            .await
            .map_err(|e| AppointmentError::Collaborator {
                operation: "list_appointments",
                id: None,
                message: e.to_string(),
            })
    }

    /// Update date/status/phone/notes while the appointment is still open.
    pub async fn update_basics(
        &self,
        appointment: &Appointment,
        request: UpdateBasicsRequest,
    ) -> Result<Appointment, AppointmentError> {
        Self::ensure_not_terminal(appointment)?;

        if let Some(new_status) = request.status {
            Self::validate_status_transition(appointment, new_status)?;
        }

        let patch = AppointmentPatch {
            date: request.date,
            time: request.time,
            status: request.status,
            patient_phone: request.phone.as_deref().map(normalize_phone),
            notes: request.notes,
            settlement: None,
        };

        let updated = self.store.update(appointment.id, patch).await.map_err(|e| {
            warn!("update_appointment failed for {}: {}", appointment.id, e);
            AppointmentError::Collaborator {
                operation: "update_appointment",
                id: Some(appointment.id),
                message: e.to_string(),
            }
        })?;

        info!("Appointment {} updated", appointment.id);
        Ok(updated)
    }

    /// Cancel an open appointment, recording the reason in its notes.
    /// Confirmation is the caller's concern.
    pub async fn cancel(
        &self,
        appointment: &Appointment,
        reason: &str,
    ) -> Result<Appointment, AppointmentError> {
        Self::validate_status_transition(appointment, AppointmentStatus::Cancelled)?;

        let notes = match appointment.notes.as_deref() {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{}\nCancelled: {}", existing, reason)
            }
            _ => format!("Cancelled: {}", reason),
        };

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Cancelled),
            notes: Some(notes),
            ..AppointmentPatch::default()
        };

        let updated = self.store.update(appointment.id, patch).await.map_err(|e| {
            warn!("cancel_appointment failed for {}: {}", appointment.id, e);
            AppointmentError::Collaborator {
                operation: "cancel_appointment",
                id: Some(appointment.id),
                message: e.to_string(),
            }
        })?;

        info!("Appointment {} cancelled", appointment.id);
        Ok(updated)
    }

    /// Mark an appointment Realized without settlement data.
    pub async fn mark_realized(
        &self,
        appointment: &Appointment,
    ) -> Result<Appointment, AppointmentError> {
        Self::validate_status_transition(appointment, AppointmentStatus::Realized)?;

        let patch = AppointmentPatch {
            status: Some(AppointmentStatus::Realized),
            ..AppointmentPatch::default()
        };

        let updated = self.store.update(appointment.id, patch).await.map_err(|e| {
            warn!("mark_realized failed for {}: {}", appointment.id, e);
            AppointmentError::Collaborator {
                operation: "mark_realized",
                id: Some(appointment.id),
                message: e.to_string(),
            }
        })?;

        info!("Appointment {} marked realized", appointment.id);
        Ok(updated)
    }

    /// Validate settlement input and compute the derived end time. Local
    /// only; persistence happens in `send_to_finance`.
    pub fn record_settlement(
        &self,
        appointment: &Appointment,
        input: &SettlementInput,
    ) -> Result<Settlement, AppointmentError> {
        if appointment
            .settlement
            .as_ref()
            .is_some_and(|s| s.sent_to_finance)
        {
            return Err(AppointmentError::SettlementLocked(appointment.id));
        }

        let value = input.value.ok_or_else(|| {
            AppointmentError::Validation("settlement value is required".to_string())
        })?;
        let start_time = input.start_time.ok_or_else(|| {
            AppointmentError::Validation("settlement start time is required".to_string())
        })?;
        let duration_minutes = input.duration_minutes.ok_or_else(|| {
            AppointmentError::Validation("settlement duration is required".to_string())
        })?;

        if !(1..=480).contains(&duration_minutes) {
            return Err(AppointmentError::Validation(format!(
                "duration must be between 1 and 480 minutes, got {}",
                duration_minutes
            )));
        }

        // Wraps past midnight; the field is display-only, so no day
        // rollover is tracked.
        let (end_time, _) =
            start_time.overflowing_add_signed(Duration::minutes(duration_minutes as i64));

        Ok(Settlement {
            start_time,
            duration_minutes,
            end_time,
            value,
            doctor_payout: input.doctor_payout.unwrap_or(Decimal::ZERO),
            notes: input.notes.clone(),
            sent_to_finance: false,
        })
    }

    /// Record the settlement, persist it through the finance gateway,
    /// forward it, then mark the appointment Realized with the flag set.
    /// A forward failure after a successful save yields `PartialFailure`:
    /// the settlement stays saved with `sent_to_finance == false`.
    pub async fn send_to_finance(
        &self,
        appointment: &Appointment,
        input: &SettlementInput,
    ) -> Result<Appointment, AppointmentError> {
        // A cancelled appointment never settles; an already-Realized one
        // may still complete its settlement sub-flow.
        if appointment.status == AppointmentStatus::Cancelled {
            return Err(AppointmentError::InvalidTransition {
                id: appointment.id,
                status: appointment.status,
            });
        }

        let settlement = self.record_settlement(appointment, input)?;

        self.finance
            .record_settlement(appointment.id, settlement.clone())
            .await
            .map_err(|e| {
                warn!("record_settlement failed for {}: {}", appointment.id, e);
                AppointmentError::Collaborator {
                    operation: "record_settlement",
                    id: Some(appointment.id),
                    message: e.to_string(),
                }
            })?;

        // Mirror the saved settlement onto the appointment record before
        // forwarding, so a forward failure still leaves it visible.
        let saved = self
            .store
            .update(
                appointment.id,
                AppointmentPatch {
                    settlement: Some(settlement.clone()),
                    ..AppointmentPatch::default()
                },
            )
            .await
            .map_err(|e| {
                warn!("save_settlement failed for {}: {}", appointment.id, e);
                AppointmentError::Collaborator {
                    operation: "save_settlement",
                    id: Some(appointment.id),
                    message: e.to_string(),
                }
            })?;

        if let Err(e) = self.finance.forward(appointment.id).await {
            warn!(
                "forward_to_finance failed for {}; settlement saved but not forwarded: {}",
                appointment.id, e
            );
            return Err(AppointmentError::PartialFailure {
                id: appointment.id,
                message: e.to_string(),
            });
        }

        let finalized = self
            .store
            .update(
                saved.id,
                AppointmentPatch {
                    status: Some(AppointmentStatus::Realized),
                    settlement: Some(Settlement {
                        sent_to_finance: true,
                        ..settlement
                    }),
                    ..AppointmentPatch::default()
                },
            )
            .await
            .map_err(|e| {
                warn!("finalize_settlement failed for {}: {}", appointment.id, e);
                AppointmentError::Collaborator {
                    operation: "finalize_settlement",
                    id: Some(appointment.id),
                    message: e.to_string(),
                }
            })?;

        info!(
            "Appointment {} settled and forwarded to finance",
            appointment.id
        );
        Ok(finalized)
    }
}
