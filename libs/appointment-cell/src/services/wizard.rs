// libs/appointment-cell/src/services/wizard.rs
use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use catalog_cell::models::{CatalogSnapshot, Doctor};
use shared_utils::phone::normalize_phone;

use crate::models::{AppointmentError, AppointmentKind, CreateAppointmentRequest};

/// Steps of the appointment-creation wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    InitialData,
    TimeSlot,
    PatientData,
    Finalized,
}

/// In-memory state of one wizard session; never persisted as-is.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub kind: Option<AppointmentKind>,
    /// Specialty id for Consultation, procedure id for Exam.
    pub selection: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub patient_name: String,
    pub patient_age: String,
    pub insurance: String,
    pub patient_phone: String,
    pub notes: Option<String>,
}

/// Fields with children in the wizard's dependency chain
/// kind -> selection -> doctor -> slot. Changing a parent always resets
/// every descendant, even when the old value would still be valid under
/// the new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftField {
    Kind,
    Selection,
    Doctor,
}

/// Drives the 3-step booking flow: Initial Data -> Time Slot ->
/// Patient Data. `finalize` emits the appointment draft; persisting it is
/// the caller's job, so the wizard stays collaborator-free.
pub struct BookingWizard {
    catalog: CatalogSnapshot,
    step: WizardStep,
    draft: BookingDraft,
}

impl BookingWizard {
    pub fn new(catalog: CatalogSnapshot) -> Self {
        Self {
            catalog,
            step: WizardStep::InitialData,
            draft: BookingDraft::default(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    // ---- selections -----------------------------------------------------

    pub fn select_kind(&mut self, kind: AppointmentKind) {
        debug!("Wizard: kind set to {}", kind);
        self.draft.kind = Some(kind);
        self.clear_children_of(DraftField::Kind);
    }

    pub fn select_specialty_or_procedure(&mut self, id: Uuid) -> Result<(), AppointmentError> {
        let kind = self.draft.kind.ok_or_else(|| {
            AppointmentError::Validation("select consultation or exam first".to_string())
        })?;

        let known = match kind {
            AppointmentKind::Consultation => {
                self.catalog.specialties.iter().any(|s| s.id == id)
            }
            AppointmentKind::Exam => self.catalog.procedures.iter().any(|p| p.id == id),
        };
        if !known {
            return Err(AppointmentError::Validation(format!(
                "unknown {} selection {}",
                kind, id
            )));
        }

        self.draft.selection = Some(id);
        self.clear_children_of(DraftField::Selection);
        Ok(())
    }

    pub fn select_doctor(&mut self, doctor_id: Uuid) -> Result<(), AppointmentError> {
        if !self.eligible_doctors().iter().any(|d| d.id == doctor_id) {
            return Err(AppointmentError::Validation(format!(
                "doctor {} does not offer the selected specialty or procedure",
                doctor_id
            )));
        }

        self.draft.doctor_id = Some(doctor_id);
        self.clear_children_of(DraftField::Doctor);
        Ok(())
    }

    pub fn select_slot(&mut self, date: NaiveDate, time: NaiveTime) -> Result<(), AppointmentError> {
        if self.draft.doctor_id.is_none() {
            return Err(AppointmentError::Validation(
                "select a doctor before choosing a slot".to_string(),
            ));
        }
        self.draft.date = Some(date);
        self.draft.time = Some(time);
        Ok(())
    }

    pub fn set_patient_name(&mut self, value: impl Into<String>) {
        self.draft.patient_name = value.into();
    }

    pub fn set_patient_age(&mut self, value: impl Into<String>) {
        self.draft.patient_age = value.into();
    }

    pub fn set_insurance(&mut self, value: impl Into<String>) {
        self.draft.insurance = value.into();
    }

    pub fn set_patient_phone(&mut self, value: impl Into<String>) {
        self.draft.patient_phone = value.into();
    }

    pub fn set_notes(&mut self, value: impl Into<String>) {
        self.draft.notes = Some(value.into());
    }

    /// Doctors whose capability set includes the current selection.
    pub fn eligible_doctors(&self) -> Vec<&Doctor> {
        let (Some(kind), Some(selection)) = (self.draft.kind, self.draft.selection) else {
            return Vec::new();
        };

        self.catalog
            .doctors
            .iter()
            .filter(|d| match kind {
                AppointmentKind::Consultation => d.covers_specialty(selection),
                AppointmentKind::Exam => d.covers_procedure(selection),
            })
            .collect()
    }

    // ---- step transitions -----------------------------------------------

    pub fn advance(&mut self) -> Result<WizardStep, AppointmentError> {
        self.validate_step(self.step)?;

        self.step = match self.step {
            WizardStep::InitialData => WizardStep::TimeSlot,
            WizardStep::TimeSlot => WizardStep::PatientData,
            WizardStep::PatientData | WizardStep::Finalized => WizardStep::Finalized,
        };

        debug!("Wizard advanced to {:?}", self.step);
        Ok(self.step)
    }

    /// Step back without validation; a no-op on the first step.
    pub fn retreat(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::InitialData | WizardStep::TimeSlot => WizardStep::InitialData,
            WizardStep::PatientData => WizardStep::TimeSlot,
            WizardStep::Finalized => WizardStep::PatientData,
        };
        self.step
    }

    /// Discard the draft and return to the first step.
    pub fn cancel(&mut self) {
        debug!("Wizard cancelled, draft discarded");
        self.draft = BookingDraft::default();
        self.step = WizardStep::InitialData;
    }

    /// Emit the appointment draft. Only callable once the terminal step's
    /// validation (and every earlier step's) passes; never touches a
    /// collaborator.
    pub fn finalize(&mut self) -> Result<CreateAppointmentRequest, AppointmentError> {
        if matches!(self.step, WizardStep::InitialData | WizardStep::TimeSlot) {
            return Err(AppointmentError::Validation(
                "booking is not complete yet".to_string(),
            ));
        }

        self.validate_step(WizardStep::InitialData)?;
        self.validate_step(WizardStep::TimeSlot)?;
        self.validate_step(WizardStep::PatientData)?;

        // validate_step(InitialData) guarantees these are set.
        let doctor_id = self
            .draft
            .doctor_id
            .ok_or_else(|| AppointmentError::Validation("doctor is required".to_string()))?;
        let kind = self
            .draft
            .kind
            .ok_or_else(|| AppointmentError::Validation("kind is required".to_string()))?;
        let selection = self
            .draft
            .selection
            .ok_or_else(|| AppointmentError::Validation("specialty or procedure is required".to_string()))?;
        let date = self
            .draft
            .date
            .ok_or_else(|| AppointmentError::Validation("date is required".to_string()))?;
        let time = self.draft.time.unwrap_or_default();

        let doctor_name = self
            .catalog
            .doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .map(|d| d.name.clone())
            .unwrap_or_default();

        let (specialty, procedure_name) = match kind {
            AppointmentKind::Consultation => (
                self.catalog
                    .specialties
                    .iter()
                    .find(|s| s.id == selection)
                    .map(|s| s.name.clone()),
                None,
            ),
            AppointmentKind::Exam => (
                None,
                self.catalog
                    .procedures
                    .iter()
                    .find(|p| p.id == selection)
                    .map(|p| p.name.clone()),
            ),
        };

        self.step = WizardStep::Finalized;

        Ok(CreateAppointmentRequest {
            kind,
            specialty,
            procedure_name,
            doctor_id,
            doctor_name,
            patient_name: self.draft.patient_name.trim().to_string(),
            patient_age: self.draft.patient_age.trim().to_string(),
            insurance: self.draft.insurance.trim().to_string(),
            patient_phone: normalize_phone(&self.draft.patient_phone),
            date,
            time,
            notes: self.draft.notes.clone(),
        })
    }

    // ---- internals ------------------------------------------------------

    fn validate_step(&self, step: WizardStep) -> Result<(), AppointmentError> {
        match step {
            WizardStep::InitialData => {
                if self.draft.doctor_id.is_none() {
                    return Err(AppointmentError::Validation(
                        "doctor is required".to_string(),
                    ));
                }
            }
            WizardStep::TimeSlot => {
                if self.draft.date.is_none() {
                    return Err(AppointmentError::Validation("date is required".to_string()));
                }
            }
            WizardStep::PatientData | WizardStep::Finalized => {
                let missing: Vec<&str> = [
                    ("patient name", &self.draft.patient_name),
                    ("patient age", &self.draft.patient_age),
                    ("insurance", &self.draft.insurance),
                    ("patient phone", &self.draft.patient_phone),
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
            }
        }
        Ok(())
    }

    fn clear_children_of(&mut self, field: DraftField) {
        if field == DraftField::Kind {
            self.draft.selection = None;
        }
        if matches!(field, DraftField::Kind | DraftField::Selection) {
            self.draft.doctor_id = None;
        }
        // The slot depends on the doctor, so every parent change drops it.
        self.draft.date = None;
        self.draft.time = None;
    }
}
