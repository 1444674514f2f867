// libs/appointment-cell/tests/integration_test.rs
//
// Wire-level coverage: the booking and lifecycle services running against
// the real REST store and finance gateway, with the collaborators played
// by wiremock.
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    Appointment, AppointmentError, AppointmentFilters, AppointmentKind, AppointmentStatus,
    CreateAppointmentRequest, SettlementInput,
};
use appointment_cell::services::booking::AppointmentBookingService;
use appointment_cell::store::{AppointmentStore, RestAppointmentStore, RestFinanceGateway};
use appointment_cell::AppointmentLifecycleService;
use shared_config::AppConfig;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        clinic_api_url: base_url.to_string(),
        clinic_api_key: "test_key".to_string(),
        finance_api_url: base_url.to_string(),
        request_timeout_secs: 5,
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

fn create_request(doctor_id: Uuid) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        kind: AppointmentKind::Consultation,
        specialty: Some("Cardiologia".to_string()),
        procedure_name: None,
        doctor_id,
        doctor_name: "Dr. Joao".to_string(),
        patient_name: "Maria Silva".to_string(),
        patient_age: "34".to_string(),
        insurance: "Unimed".to_string(),
        patient_phone: "11987654321".to_string(),
        date: date("2024-01-15"),
        time: time("08:00"),
        notes: None,
    }
}

fn stored_appointment(doctor_id: Uuid, status: AppointmentStatus) -> Appointment {
    let now = Utc::now();
    Appointment {
        id: Uuid::new_v4(),
        kind: AppointmentKind::Consultation,
        specialty: Some("Cardiologia".to_string()),
        procedure_name: None,
        doctor_id,
        doctor_name: "Dr. Joao".to_string(),
        patient_name: "Maria Silva".to_string(),
        patient_age: "34".to_string(),
        insurance: "Unimed".to_string(),
        patient_phone: "11987654321".to_string(),
        date: date("2024-01-15"),
        time: time("08:00"),
        status,
        notes: None,
        settlement: None,
        created_at: now,
        updated_at: now,
    }
}

// ---- booking ----------------------------------------------------------------

#[tokio::test]
async fn booking_creates_an_awaiting_appointment() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/v1/appointments"))
        .and(query_param("doctor_id", doctor_id.to_string()))
        .and(query_param("date", "2024-01-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Appointment>::new()))
        .mount(&mock_server)
        .await;

    let created = stored_appointment(doctor_id, AppointmentStatus::Awaiting);
    Mock::given(method("POST"))
        .and(path("/api/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&created))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let service = AppointmentBookingService::new(Arc::new(RestAppointmentStore::new(&config)));

    let appointment = service
        .create_appointment(create_request(doctor_id))
        .await
        .expect("booking should succeed");

    assert_eq!(appointment.status, AppointmentStatus::Awaiting);
    assert_eq!(appointment.doctor_id, doctor_id);
}

#[tokio::test]
async fn booking_rejects_a_taken_slot() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let existing = stored_appointment(doctor_id, AppointmentStatus::Awaiting);
    Mock::given(method("GET"))
        .and(path("/api/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![&existing]))
        .mount(&mock_server)
        .await;

    // No POST mock is mounted; the create call must never go out.
    let config = test_config(&mock_server.uri());
    let service = AppointmentBookingService::new(Arc::new(RestAppointmentStore::new(&config)));

    let result = service.create_appointment(create_request(doctor_id)).await;
    assert_matches!(
        result,
        Err(AppointmentError::SlotTaken { doctor_id: taken, .. }) if taken == doctor_id
    );
}

#[tokio::test]
async fn a_cancelled_appointment_does_not_hold_its_slot() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    let cancelled = stored_appointment(doctor_id, AppointmentStatus::Cancelled);
    Mock::given(method("GET"))
        .and(path("/api/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![&cancelled]))
        .mount(&mock_server)
        .await;

    let created = stored_appointment(doctor_id, AppointmentStatus::Awaiting);
    Mock::given(method("POST"))
        .and(path("/api/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(&created))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let service = AppointmentBookingService::new(Arc::new(RestAppointmentStore::new(&config)));

    let appointment = service
        .create_appointment(create_request(doctor_id))
        .await
        .expect("cancelled holders should be ignored");
    assert_eq!(appointment.status, AppointmentStatus::Awaiting);
}

#[tokio::test]
async fn booking_requires_a_specialty_for_consultations() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let service = AppointmentBookingService::new(Arc::new(RestAppointmentStore::new(&config)));

    let mut request = create_request(Uuid::new_v4());
    request.specialty = Some("   ".to_string());

    // Fails before any collaborator call.
    let result = service.create_appointment(request).await;
    assert_matches!(result, Err(AppointmentError::Validation(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_encodes_filters_into_the_query() {
    let mock_server = MockServer::start().await;

    // The accented name exercises percent-encoding of string filters.
    Mock::given(method("GET"))
        .and(path("/api/v1/appointments"))
        .and(query_param("kind", "consultation"))
        .and(query_param("status", "awaiting"))
        .and(query_param("specialty", "Cardiologia"))
        .and(query_param("doctor_name", "Dr. João"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Vec::<Appointment>::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let store = RestAppointmentStore::new(&config);

    let filters = AppointmentFilters {
        kind: Some(AppointmentKind::Consultation),
        status: Some(AppointmentStatus::Awaiting),
        specialty: Some("Cardiologia".to_string()),
        doctor_name: Some("Dr. João".to_string()),
        ..AppointmentFilters::default()
    };

    let result = store.list(filters).await.expect("filtered listing should succeed");
    assert!(result.is_empty());
}

// ---- settlement flow --------------------------------------------------------

fn settlement_input() -> SettlementInput {
    SettlementInput {
        value: Some(Decimal::new(15000, 2)),
        doctor_payout: None,
        start_time: Some(time("08:00")),
        duration_minutes: Some(30),
        notes: None,
    }
}

fn lifecycle_service(config: &AppConfig) -> AppointmentLifecycleService {
    AppointmentLifecycleService::new(
        Arc::new(RestAppointmentStore::new(config)),
        Arc::new(RestFinanceGateway::new(config)),
    )
}

#[tokio::test]
async fn send_to_finance_runs_the_full_wire_sequence() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let appointment = stored_appointment(doctor_id, AppointmentStatus::Awaiting);

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1/appointments/{}/settlement",
            appointment.id
        )))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Both the settlement save and the Realized finalize go through PATCH.
    let mut realized = appointment.clone();
    realized.status = AppointmentStatus::Realized;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/v1/appointments/{}", appointment.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&realized))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1/appointments/{}/forward",
            appointment.id
        )))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let service = lifecycle_service(&config);

    let updated = service
        .send_to_finance(&appointment, &settlement_input())
        .await
        .expect("settlement flow should succeed");
    assert_eq!(updated.status, AppointmentStatus::Realized);
}

#[tokio::test]
async fn forward_failure_surfaces_as_partial() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let appointment = stored_appointment(doctor_id, AppointmentStatus::Awaiting);

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1/appointments/{}/settlement",
            appointment.id
        )))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    // Only the settlement save may run; a finalize PATCH would trip expect(1).
    Mock::given(method("PATCH"))
        .and(path(format!("/api/v1/appointments/{}", appointment.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(&appointment))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1/appointments/{}/forward",
            appointment.id
        )))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let service = lifecycle_service(&config);

    let result = service.send_to_finance(&appointment, &settlement_input()).await;
    assert_matches!(
        result,
        Err(AppointmentError::PartialFailure { id, .. }) if id == appointment.id
    );
}

#[tokio::test]
async fn settlement_save_failure_stops_before_forwarding() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let appointment = stored_appointment(doctor_id, AppointmentStatus::Awaiting);

    Mock::given(method("POST"))
        .and(path(format!(
            "/api/v1/appointments/{}/settlement",
            appointment.id
        )))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = test_config(&mock_server.uri());
    let service = lifecycle_service(&config);

    let result = service.send_to_finance(&appointment, &settlement_input()).await;
    assert_matches!(
        result,
        Err(AppointmentError::Collaborator { operation: "record_settlement", .. })
    );
}
