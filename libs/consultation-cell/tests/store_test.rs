// libs/consultation-cell/tests/store_test.rs
use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::error::ConsultationError;
use consultation_cell::models::{ChatMessage, ConsultationRoom, Priority, SenderRole};
use consultation_cell::services::{
    PatientDirectory, RecordStore, SupabasePatientDirectory, SupabaseRecordStore,
};
use shared_config::AppConfig;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn config_for(mock_server: &MockServer) -> AppConfig {
    TestConfig {
        supabase_url: mock_server.uri(),
        ..Default::default()
    }
    .to_app_config()
}

fn message(room_id: &str, body: &str, offset_secs: i64) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        room_id: room_id.to_string(),
        sender_id: Uuid::new_v4(),
        sender_role: SenderRole::Doctor,
        body: body.to_string(),
        timestamp: Utc::now() + Duration::seconds(offset_secs),
    }
}

#[tokio::test]
async fn test_save_room_upserts_with_service_key() {
    let mock_server = MockServer::start().await;
    let room = ConsultationRoom::new("room_abc".to_string(), Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/rest/v1/consultation_rooms"))
        .and(query_param("on_conflict", "room_id"))
        .and(header("authorization", "Bearer test-service-key"))
        .and(body_partial_json(json!({ "room_id": "room_abc", "status": "waiting" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&mock_server));
    assert!(store.save_room(&room).await.is_ok());
}

#[tokio::test]
async fn test_save_message_inserts_row() {
    let mock_server = MockServer::start().await;
    let chat = message("room_abc", "Take fluids", 0);

    Mock::given(method("POST"))
        .and(path("/rest/v1/chat_messages"))
        .and(body_partial_json(json!({ "room_id": "room_abc", "sender_role": "doctor" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&mock_server));
    assert!(store.save_message(&chat).await.is_ok());
}

#[tokio::test]
async fn test_save_failure_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/chat_messages"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(MockSupabaseResponses::error_response("unavailable", "PGRST000")),
        )
        .mount(&mock_server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&mock_server));
    assert!(store.save_message(&message("room_abc", "hi", 0)).await.is_err());
}

#[tokio::test]
async fn test_find_by_room_returns_oldest_first() {
    let mock_server = MockServer::start().await;
    let later = message("room_abc", "second", 30);
    let earlier = message("room_abc", "first", 0);

    Mock::given(method("GET"))
        .and(path("/rest/v1/chat_messages"))
        .and(query_param("room_id", "eq.room_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([later, earlier])))
        .mount(&mock_server)
        .await;

    let store = SupabaseRecordStore::new(&config_for(&mock_server));
    let history = store.find_by_room("room_abc").await.unwrap();

    let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second"]);
}

#[tokio::test]
async fn test_waiting_patients_from_directory() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4().to_string();
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("status", "eq.waiting"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::waiting_patient_row(&patient_id, &doctor_id, "high", "2026-03-02T09:00:00Z"),
            { "id": "broken-row" }
        ])))
        .mount(&mock_server)
        .await;

    let directory = SupabasePatientDirectory::new(&config_for(&mock_server));
    let patients = directory.waiting_patients().await.unwrap();

    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].id.to_string(), patient_id);
    assert_eq!(patients[0].doctor_id.to_string(), doctor_id);
    assert_eq!(patients[0].priority, Priority::High);
}

#[tokio::test]
async fn test_patient_directory_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let directory = SupabasePatientDirectory::new(&config_for(&mock_server));

    assert_matches!(
        directory.waiting_patients().await,
        Err(ConsultationError::Directory(_))
    );
}

#[tokio::test]
async fn test_mark_admitted_patches_patient_status() {
    let mock_server = MockServer::start().await;
    let patient_id = Uuid::new_v4();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .and(header("authorization", "Bearer test-service-key"))
        .and(body_partial_json(json!({ "status": "admitted" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let directory = SupabasePatientDirectory::new(&config_for(&mock_server));
    assert!(directory.mark_admitted(patient_id).await.is_ok());
}

#[tokio::test]
async fn test_mark_admitted_failure_is_a_directory_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(MockSupabaseResponses::error_response("permission denied", "42501")),
        )
        .mount(&mock_server)
        .await;

    let directory = SupabasePatientDirectory::new(&config_for(&mock_server));
    let result = directory.mark_admitted(Uuid::new_v4()).await;

    assert_matches!(result, Err(ConsultationError::Directory(_)));
}
