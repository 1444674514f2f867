pub mod handlers;
pub mod models;
pub mod provider;
pub mod router;
pub mod services;

pub use models::{CatalogError, Doctor, Procedure, SlotCandidate, SlotPeriod, Specialty};
pub use provider::{CatalogProvider, RestCatalogProvider, RestSlotProvider, SlotProvider};
pub use services::availability::SlotSelector;
