// libs/catalog-cell/src/provider.rs
//
// Collaborator contracts for the catalog and slot providers. Shapes are
// parsed at this boundary; nothing downstream touches raw JSON.
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{ApiStatusError, RestClient};

use crate::models::{CatalogError, Doctor, Procedure, RawSlot, SlotPeriod, Specialty};

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_specialties(&self) -> Result<Vec<Specialty>, CatalogError>;
    async fn list_procedures(&self) -> Result<Vec<Procedure>, CatalogError>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>, CatalogError>;
}

#[async_trait]
pub trait SlotProvider: Send + Sync {
    async fn list_slots(
        &self,
        doctor_id: Uuid,
        period: SlotPeriod,
    ) -> Result<Vec<RawSlot>, CatalogError>;
}

pub struct RestCatalogProvider {
    client: RestClient,
}

impl RestCatalogProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::new(config),
        }
    }
}

#[async_trait]
impl CatalogProvider for RestCatalogProvider {
    async fn list_specialties(&self) -> Result<Vec<Specialty>, CatalogError> {
        self.client
            .request(Method::GET, "/api/v1/specialties", None)
            .await
            .map_err(|e| CatalogError::Upstream {
                operation: "list_specialties",
                message: e.to_string(),
            })
    }

    async fn list_procedures(&self) -> Result<Vec<Procedure>, CatalogError> {
        self.client
            .request(Method::GET, "/api/v1/procedures", None)
            .await
            .map_err(|e| CatalogError::Upstream {
                operation: "list_procedures",
                message: e.to_string(),
            })
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, CatalogError> {
        self.client
            .request(Method::GET, "/api/v1/doctors", None)
            .await
            .map_err(|e| CatalogError::Upstream {
                operation: "list_doctors",
                message: e.to_string(),
            })
    }
}

pub struct RestSlotProvider {
    client: RestClient,
}

impl RestSlotProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::new(config),
        }
    }
}

#[async_trait]
impl SlotProvider for RestSlotProvider {
    async fn list_slots(
        &self,
        doctor_id: Uuid,
        period: SlotPeriod,
    ) -> Result<Vec<RawSlot>, CatalogError> {
        let path = format!(
            "/api/v1/doctors/{}/slots?from={}&to={}",
            doctor_id, period.from, period.to
        );

        self.client
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| {
                let not_found = e
                    .downcast_ref::<ApiStatusError>()
                    .is_some_and(|api| api.status == StatusCode::NOT_FOUND);
                if not_found {
                    CatalogError::DoctorNotFound
                } else {
                    CatalogError::Upstream {
                        operation: "list_slots",
                        message: e.to_string(),
                    }
                }
            })
    }
}
