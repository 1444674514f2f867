pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use models::{
    Appointment, AppointmentError, AppointmentFilters, AppointmentKind, AppointmentStatus,
    CreateAppointmentRequest, Settlement, SettlementInput, UpdateBasicsRequest,
};
pub use services::filter::filter_and_sort;
pub use services::lifecycle::AppointmentLifecycleService;
pub use services::wizard::{BookingDraft, BookingWizard, WizardStep};
pub use store::{AppointmentStore, FinanceGateway};
