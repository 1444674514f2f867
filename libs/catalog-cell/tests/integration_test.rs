// libs/catalog-cell/tests/integration_test.rs
use assert_matches::assert_matches;
use chrono::NaiveDate;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_cell::models::{CatalogError, SlotPeriod};
use catalog_cell::services::availability::SlotSelector;
use catalog_cell::services::catalog::CatalogService;
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

#[tokio::test]
async fn catalog_snapshot_collects_all_three_lists() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let specialty_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![serde_json::json!({
            "id": specialty_id,
            "name": "Cardiologia"
        })]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/procedures"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Ultrassom"
        })]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![serde_json::json!({
            "id": doctor_id,
            "name": "Dra. Ana Souza",
            "specialty_ids": [specialty_id],
            "procedure_ids": []
        })]))
        .mount(&mock_server)
        .await;

    let service = CatalogService::from_config(&test_config(&mock_server.uri()));
    let snapshot = service.snapshot().await.expect("snapshot should succeed");

    assert_eq!(snapshot.specialties.len(), 1);
    assert_eq!(snapshot.procedures.len(), 1);
    assert_eq!(snapshot.doctors.len(), 1);
    assert!(snapshot.doctors[0].covers_specialty(specialty_id));
}

#[tokio::test]
async fn slot_listing_groups_by_day_in_order() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/doctors/{}/slots", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![
            serde_json::json!({ "date": "2024-03-02", "time": "14:00:00" }),
            serde_json::json!({ "date": "2024-03-01", "time": "10:00:00" }),
            serde_json::json!({ "date": "2024-03-01", "time": "09:00:00" }),
            serde_json::json!({ "date": "2024-03-01", "time": "09:00:00" }),
        ]))
        .mount(&mock_server)
        .await;

    let selector = SlotSelector::from_config(&test_config(&mock_server.uri()));
    let period = SlotPeriod::new(date("2024-03-01"), date("2024-03-07")).unwrap();

    let candidates = selector
        .list_slots(doctor_id, period)
        .await
        .expect("slot listing should succeed");

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].date, date("2024-03-01"));
    assert_eq!(candidates[0].times.len(), 2, "duplicates must collapse");
    assert!(candidates[0].times[0] < candidates[0].times[1]);
    assert_eq!(candidates[1].date, date("2024-03-02"));
}

#[tokio::test]
async fn slot_listing_surfaces_upstream_failure() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/doctors/{}/slots", doctor_id)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let selector = SlotSelector::from_config(&test_config(&mock_server.uri()));
    let period = SlotPeriod::new(date("2024-03-01"), date("2024-03-07")).unwrap();

    let result = selector.list_slots(doctor_id, period).await;
    assert_matches!(
        result,
        Err(CatalogError::Upstream {
            operation: "list_slots",
            ..
        })
    );
}

#[tokio::test]
async fn slow_collaborators_are_cut_off_at_the_configured_timeout() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/doctors/{}/slots", doctor_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(Vec::<serde_json::Value>::new())
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.request_timeout_secs = 1;

    let selector = SlotSelector::from_config(&config);
    let period = SlotPeriod::new(date("2024-03-01"), date("2024-03-07")).unwrap();

    let result = selector.list_slots(doctor_id, period).await;
    assert_matches!(
        result,
        Err(CatalogError::Upstream {
            operation: "list_slots",
            ..
        })
    );
}

#[tokio::test]
async fn unknown_doctor_maps_to_not_found() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/doctors/{}/slots", doctor_id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let selector = SlotSelector::from_config(&test_config(&mock_server.uri()));
    let period = SlotPeriod::new(date("2024-03-01"), date("2024-03-07")).unwrap();

    let result = selector.list_slots(doctor_id, period).await;
    assert_matches!(result, Err(CatalogError::DoctorNotFound));
}

#[test]
fn inverted_period_is_rejected() {
    let result = SlotPeriod::new(date("2024-03-07"), date("2024-03-01"));
    assert_matches!(result, Err(CatalogError::InvalidPeriod(_)));
}
