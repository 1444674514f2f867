// libs/appointment-cell/src/services/filter.rs
use crate::models::{Appointment, AppointmentFilters, AppointmentKind};

/// Apply compound filters and the default ordering: date descending,
/// ties broken by time descending, input order preserved for equal
/// (date, time) pairs. Returns a fresh sequence; the input is untouched.
pub fn filter_and_sort(
    appointments: &[Appointment],
    filters: &AppointmentFilters,
) -> Vec<Appointment> {
    let mut out: Vec<Appointment> = appointments
        .iter()
        .filter(|a| matches(a, filters))
        .cloned()
        .collect();

    // sort_by is stable, which keeps equal (date, time) pairs in input order.
    out.sort_by(|a, b| b.date.cmp(&a.date).then(b.time.cmp(&a.time)));
    out
}

fn matches(appointment: &Appointment, filters: &AppointmentFilters) -> bool {
    if let Some(kind) = filters.kind {
        if appointment.kind != kind {
            return false;
        }
    }

    if let Some(status) = filters.status {
        if appointment.status != status {
            return false;
        }
    }

    // Specialty only matches consultations and procedure only matches
    // exams; a kind mismatch is simply no match, never an error.
    if let Some(specialty) = present(&filters.specialty) {
        if appointment.kind != AppointmentKind::Consultation
            || appointment.specialty.as_deref() != Some(specialty)
        {
            return false;
        }
    }

    if let Some(procedure_name) = present(&filters.procedure_name) {
        if appointment.kind != AppointmentKind::Exam
            || appointment.procedure_name.as_deref() != Some(procedure_name)
        {
            return false;
        }
    }

    if let Some(doctor_name) = present(&filters.doctor_name) {
        if appointment.doctor_name != doctor_name {
            return false;
        }
    }

    true
}

// Empty and whitespace-only filter values behave as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
