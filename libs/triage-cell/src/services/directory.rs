// libs/triage-cell/src/services/directory.rs
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{DoctorProfile, TriageError};

const DOCTOR_COLUMNS: &str = "id,full_name,specialty,hospital,is_available,rating";

/// Doctor directory lookup owned by the account subsystem.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn list_doctors(&self, auth_token: Option<&str>) -> Result<Vec<DoctorProfile>, TriageError>;

    async fn get_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Option<DoctorProfile>, TriageError>;
}

pub struct SupabaseDoctorDirectory {
    supabase: SupabaseClient,
}

impl SupabaseDoctorDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn parse_rows(rows: Vec<Value>) -> Vec<DoctorProfile> {
        rows.into_iter()
            .filter_map(|row| match serde_json::from_value::<DoctorProfile>(row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    // One bad row should not hide the rest of the directory.
                    error!("Skipping malformed doctor row: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn list_doctors(&self, auth_token: Option<&str>) -> Result<Vec<DoctorProfile>, TriageError> {
        let path = format!("/rest/v1/doctors?select={}&order=created_at.asc", DOCTOR_COLUMNS);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let doctors = Self::parse_rows(rows);
        debug!("Loaded {} doctors from directory", doctors.len());
        Ok(doctors)
    }

    async fn get_doctor(
        &self,
        doctor_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Option<DoctorProfile>, TriageError> {
        let path = format!("/rest/v1/doctors?select={}&id=eq.{}", DOCTOR_COLUMNS, doctor_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        Ok(Self::parse_rows(rows).into_iter().next())
    }
}

/// Fixed doctor list, used where no directory service is reachable.
#[derive(Default)]
pub struct InMemoryDoctorDirectory {
    doctors: Vec<DoctorProfile>,
}

impl InMemoryDoctorDirectory {
    pub fn new(doctors: Vec<DoctorProfile>) -> Self {
        Self { doctors }
    }
}

#[async_trait]
impl DoctorDirectory for InMemoryDoctorDirectory {
    async fn list_doctors(&self, _auth_token: Option<&str>) -> Result<Vec<DoctorProfile>, TriageError> {
        Ok(self.doctors.clone())
    }

    async fn get_doctor(
        &self,
        doctor_id: Uuid,
        _auth_token: Option<&str>,
    ) -> Result<Option<DoctorProfile>, TriageError> {
        Ok(self.doctors.iter().find(|d| d.id == doctor_id).cloned())
    }
}
