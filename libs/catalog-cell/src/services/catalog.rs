// libs/catalog-cell/src/services/catalog.rs
use std::sync::Arc;

use tracing::debug;

use shared_config::AppConfig;

use crate::models::{CatalogError, CatalogSnapshot, Doctor, Procedure, Specialty};
use crate::provider::{CatalogProvider, RestCatalogProvider};

pub struct CatalogService {
    provider: Arc<dyn CatalogProvider>,
}

impl CatalogService {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(RestCatalogProvider::new(config)))
    }

    pub async fn list_specialties(&self) -> Result<Vec<Specialty>, CatalogError> {
        self.provider.list_specialties().await
    }

    pub async fn list_procedures(&self) -> Result<Vec<Procedure>, CatalogError> {
        self.provider.list_procedures().await
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, CatalogError> {
        self.provider.list_doctors().await
    }

    /// Fetch the full catalog for one wizard session.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        debug!("Fetching catalog snapshot");

        let specialties = self.provider.list_specialties().await?;
        let procedures = self.provider.list_procedures().await?;
        let doctors = self.provider.list_doctors().await?;

        debug!(
            "Catalog snapshot: {} specialties, {} procedures, {} doctors",
            specialties.len(),
            procedures.len(),
            doctors.len()
        );

        Ok(CatalogSnapshot {
            specialties,
            procedures,
            doctors,
        })
    }
}
