// libs/appointment-cell/src/store.rs
//
// Persistence and finance collaborator contracts. The wizard and the
// lifecycle manager only see these traits; the REST implementations keep
// all wire details in one place. Concurrent writers for the same
// appointment id are not coordinated here: the persistence collaborator
// applies last-write-wins.
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::RestClient;

use crate::models::{
    Appointment, AppointmentFilters, AppointmentPatch, CreateAppointmentRequest, Settlement,
};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, request: CreateAppointmentRequest) -> Result<Appointment>;
    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment>;
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>>;
    async fn list(&self, filters: AppointmentFilters) -> Result<Vec<Appointment>>;
    /// Everything scheduled for one doctor on one day, any status.
    /// Backs the double-booking guard.
    async fn list_for_doctor_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>>;
}

#[async_trait]
pub trait FinanceGateway: Send + Sync {
    async fn record_settlement(&self, appointment_id: Uuid, settlement: Settlement) -> Result<()>;
    async fn forward(&self, appointment_id: Uuid) -> Result<()>;
}

pub struct RestAppointmentStore {
    client: RestClient,
}

impl RestAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::new(config),
        }
    }
}

#[async_trait]
impl AppointmentStore for RestAppointmentStore {
    async fn create(&self, request: CreateAppointmentRequest) -> Result<Appointment> {
        self.client
            .request(
                Method::POST,
                "/api/v1/appointments",
                Some(serde_json::to_value(&request)?),
            )
            .await
    }

    async fn update(&self, id: Uuid, patch: AppointmentPatch) -> Result<Appointment> {
        let path = format!("/api/v1/appointments/{}", id);
        self.client
            .request(Method::PATCH, &path, Some(serde_json::to_value(&patch)?))
            .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>> {
        let path = format!("/api/v1/appointments?id={}", id);
        let result: Vec<Appointment> = self.client.request(Method::GET, &path, None).await?;
        Ok(result.into_iter().next())
    }

    async fn list(&self, filters: AppointmentFilters) -> Result<Vec<Appointment>> {
        let mut query_parts = Vec::new();

        if let Some(kind) = filters.kind {
            query_parts.push(format!("kind={}", kind));
        }
        if let Some(status) = filters.status {
            query_parts.push(format!("status={}", status));
        }
        if let Some(specialty) = &filters.specialty {
            query_parts.push(format!("specialty={}", urlencoding::encode(specialty)));
        }
        if let Some(procedure_name) = &filters.procedure_name {
            query_parts.push(format!(
                "procedure_name={}",
                urlencoding::encode(procedure_name)
            ));
        }
        if let Some(doctor_name) = &filters.doctor_name {
            query_parts.push(format!("doctor_name={}", urlencoding::encode(doctor_name)));
        }

        let path = if query_parts.is_empty() {
            "/api/v1/appointments".to_string()
        } else {
            format!("/api/v1/appointments?{}", query_parts.join("&"))
        };

        self.client.request(Method::GET, &path, None).await
    }

    async fn list_for_doctor_date(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        let path = format!("/api/v1/appointments?doctor_id={}&date={}", doctor_id, date);
        self.client.request(Method::GET, &path, None).await
    }
}

pub struct RestFinanceGateway {
    client: RestClient,
}

impl RestFinanceGateway {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: RestClient::with_base_url(config, &config.finance_api_url),
        }
    }
}

#[async_trait]
impl FinanceGateway for RestFinanceGateway {
    async fn record_settlement(&self, appointment_id: Uuid, settlement: Settlement) -> Result<()> {
        let path = format!("/api/v1/appointments/{}/settlement", appointment_id);
        self.client
            .request_empty(Method::POST, &path, Some(json!(settlement)))
            .await
    }

    async fn forward(&self, appointment_id: Uuid) -> Result<()> {
        let path = format!("/api/v1/appointments/{}/forward", appointment_id);
        self.client.request_empty(Method::POST, &path, None).await
    }
}
