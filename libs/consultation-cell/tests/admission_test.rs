// libs/consultation-cell/tests/admission_test.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use consultation_cell::error::ConsultationError;
use consultation_cell::models::{Caller, Patient, PatientStatus, Priority};
use consultation_cell::services::{
    ConsultationService, InMemoryPatientDirectory, MemoryRecordStore, PatientDirectory,
};
use shared_models::auth::CallerRole;
use shared_utils::test_utils::TestConfig;
use triage_cell::services::InMemoryDoctorDirectory;

/// Lists its patients as waiting no matter what, and rejects status updates.
struct ReadOnlyDirectory {
    patients: Vec<Patient>,
}

#[async_trait]
impl PatientDirectory for ReadOnlyDirectory {
    async fn waiting_patients(&self) -> Result<Vec<Patient>, ConsultationError> {
        Ok(self.patients.clone())
    }

    async fn mark_admitted(&self, _patient_id: Uuid) -> Result<(), ConsultationError> {
        Err(ConsultationError::Directory("patients table is read-only".to_string()))
    }
}

fn waiting_patient(name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        name: name.to_string(),
        symptoms: vec!["cough".to_string()],
        priority: Priority::Medium,
        appointment_time: Utc::now(),
        doctor_id: Uuid::new_v4(),
        status: PatientStatus::Waiting,
    }
}

fn service_with(patients: Arc<dyn PatientDirectory>) -> ConsultationService {
    let config = TestConfig::default().to_app_config();
    ConsultationService::with_collaborators(
        &config,
        Arc::new(MemoryRecordStore::new()),
        Arc::new(InMemoryDoctorDirectory::new(vec![])),
        patients,
    )
}

fn admin() -> Caller {
    Caller::new(Uuid::new_v4(), CallerRole::Admin)
}

#[tokio::test]
async fn test_admitted_patient_leaves_the_waiting_list() {
    let ada = waiting_patient("Ada");
    let directory = Arc::new(InMemoryPatientDirectory::new(vec![ada.clone()]));
    let service = service_with(directory.clone());

    let result = service.run_admission().await.unwrap();

    assert_eq!(result.admitted.len(), 1);
    assert!(directory.waiting_patients().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ended_consultation_is_not_reopened() {
    let ada = waiting_patient("Ada");
    let service = service_with(Arc::new(InMemoryPatientDirectory::new(vec![ada.clone()])));

    let first = service.run_admission().await.unwrap();
    let room_id = first.new_rooms[0].record.room_id.clone();
    service.end(&admin(), &room_id).await.unwrap();

    let second = service.run_admission().await.unwrap();

    assert_eq!(first.admitted.len(), 1);
    assert!(second.admitted.is_empty());
    assert_eq!(service.list_rooms(&admin(), Some(ada.id)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_stale_directory_does_not_reopen_finished_booking() {
    let ada = waiting_patient("Ada");
    let grace = waiting_patient("Grace");
    let service = service_with(Arc::new(ReadOnlyDirectory {
        patients: vec![ada.clone(), grace.clone()],
    }));

    let first = service.run_admission().await.unwrap();
    assert_eq!(first.admitted.len(), 2);
    for room in &first.new_rooms {
        service.end(&admin(), &room.record.room_id).await.unwrap();
    }

    for _ in 0..3 {
        let pass = service.run_admission().await.unwrap();
        assert!(pass.admitted.is_empty());
    }

    assert_eq!(service.list_rooms(&admin(), Some(ada.id)).await.unwrap().len(), 1);
    assert_eq!(service.list_rooms(&admin(), Some(grace.id)).await.unwrap().len(), 1);
    assert_eq!(service.stats().await.ended, 2);
}
