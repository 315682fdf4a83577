// libs/consultation-cell/src/services/directory.rs
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, WriteMode};

use crate::error::ConsultationError;
use crate::models::{Patient, PatientStatus};

/// Source of the waiting room fed to the admission scheduler.
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn waiting_patients(&self) -> Result<Vec<Patient>, ConsultationError>;

    /// Takes the patient off the waiting list once a room is open for them.
    async fn mark_admitted(&self, patient_id: Uuid) -> Result<(), ConsultationError>;
}

pub struct SupabasePatientDirectory {
    supabase: SupabaseClient,
    token: String,
}

impl SupabasePatientDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            token: config.record_store_token().to_string(),
        }
    }
}

#[async_trait]
impl PatientDirectory for SupabasePatientDirectory {
    async fn waiting_patients(&self) -> Result<Vec<Patient>, ConsultationError> {
        let path = "/rest/v1/patients?status=eq.waiting&order=appointment_time.asc";
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, path, Some(&self.token), None)
            .await
            .map_err(|e| {
                error!("Failed to load waiting patients: {}", e);
                ConsultationError::Directory(e.to_string())
            })?;

        let patients: Vec<Patient> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Patient>(row) {
                Ok(patient) => Some(patient),
                Err(e) => {
                    error!("Skipping malformed patient row: {}", e);
                    None
                }
            })
            .collect();

        debug!("Loaded {} waiting patients", patients.len());
        Ok(patients)
    }

    async fn mark_admitted(&self, patient_id: Uuid) -> Result<(), ConsultationError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        self.supabase
            .write(
                &path,
                Some(&self.token),
                json!({ "status": PatientStatus::Admitted }),
                WriteMode::Update,
            )
            .await
            .map_err(|e| {
                error!("Failed to mark patient {} admitted: {}", patient_id, e);
                ConsultationError::Directory(e.to_string())
            })?;

        info!("Patient {} marked admitted", patient_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPatientDirectory {
    patients: RwLock<Vec<Patient>>,
}

impl InMemoryPatientDirectory {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients: RwLock::new(patients),
        }
    }
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn waiting_patients(&self) -> Result<Vec<Patient>, ConsultationError> {
        Ok(self
            .patients
            .read()
            .await
            .iter()
            .filter(|p| p.status == PatientStatus::Waiting)
            .cloned()
            .collect())
    }

    async fn mark_admitted(&self, patient_id: Uuid) -> Result<(), ConsultationError> {
        self.patients
            .write()
            .await
            .iter_mut()
            .filter(|p| p.id == patient_id)
            .for_each(|p| p.status = PatientStatus::Admitted);
        Ok(())
    }
}
