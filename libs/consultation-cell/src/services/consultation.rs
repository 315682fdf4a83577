// libs/consultation-cell/src/services/consultation.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use triage_cell::{DoctorDirectory, SupabaseDoctorDirectory, TriageError};

use crate::error::ConsultationError;
use crate::models::{
    AdmissionResult, Caller, ChatMessage, ConsultationRoom, Patient, Persisted, RegistryStats,
};
use crate::services::directory::{PatientDirectory, SupabasePatientDirectory};
use crate::services::messaging::{MessageRouter, Subscription};
use crate::services::registry::SessionRegistry;
use crate::services::scheduler::AdmissionScheduler;
use crate::services::store::{RecordStore, SupabaseRecordStore};

/// Caller-facing consultation operations.
///
/// Checks that the caller may act on a room, then delegates to the registry,
/// message router and scheduler.
pub struct ConsultationService {
    registry: Arc<SessionRegistry>,
    router: Arc<MessageRouter>,
    scheduler: Arc<AdmissionScheduler>,
    store: Arc<dyn RecordStore>,
    doctors: Arc<dyn DoctorDirectory>,
    patients: Arc<dyn PatientDirectory>,
}

impl ConsultationService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_collaborators(
            config,
            Arc::new(SupabaseRecordStore::new(config)),
            Arc::new(SupabaseDoctorDirectory::new(config)),
            Arc::new(SupabasePatientDirectory::new(config)),
        )
    }

    pub fn with_collaborators(
        config: &AppConfig,
        store: Arc<dyn RecordStore>,
        doctors: Arc<dyn DoctorDirectory>,
        patients: Arc<dyn PatientDirectory>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(Arc::clone(&store)));
        let router = Arc::new(MessageRouter::new(Arc::clone(&registry), Arc::clone(&store)));
        let scheduler = Arc::new(AdmissionScheduler::from_config(Arc::clone(&registry), config));

        Self {
            registry,
            router,
            scheduler,
            store,
            doctors,
            patients,
        }
    }

    /// Doctors may open rooms for themselves; admins for anyone.
    pub async fn create_room(
        &self,
        caller: &Caller,
        doctor_id: Uuid,
        patient_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Persisted<ConsultationRoom>, ConsultationError> {
        if !caller.is_admin() && caller.id != doctor_id {
            return Err(ConsultationError::Unauthorized(
                "Only the booked doctor or an admin can open a room".to_string(),
            ));
        }

        if doctor_id == patient_id {
            return Err(ConsultationError::ValidationError(
                "Doctor and patient must be different participants".to_string(),
            ));
        }

        self.doctors
            .get_doctor(doctor_id, auth_token)
            .await?
            .ok_or(TriageError::DoctorNotFound(doctor_id))?;

        self.registry.create_room(doctor_id, patient_id).await
    }

    pub async fn get_room(&self, caller: &Caller, room_id: &str) -> Result<ConsultationRoom, ConsultationError> {
        let room = self.registry.get(room_id).await?;
        Self::authorize(caller, &room)?;
        Ok(room)
    }

    /// Admins may list anyone's rooms; everyone else only their own.
    pub async fn list_rooms(
        &self,
        caller: &Caller,
        participant_id: Option<Uuid>,
    ) -> Result<Vec<ConsultationRoom>, ConsultationError> {
        let participant_id = participant_id.unwrap_or(caller.id);

        if participant_id != caller.id && !caller.is_admin() {
            return Err(ConsultationError::Unauthorized(
                "Cannot list another participant's rooms".to_string(),
            ));
        }

        Ok(self.registry.list_by_participant(participant_id).await)
    }

    pub async fn activate(
        &self,
        caller: &Caller,
        room_id: &str,
    ) -> Result<Persisted<ConsultationRoom>, ConsultationError> {
        self.get_room(caller, room_id).await?;
        self.registry.activate(room_id).await
    }

    /// Ends the room, then closes its channel.
    pub async fn end(
        &self,
        caller: &Caller,
        room_id: &str,
    ) -> Result<Persisted<ConsultationRoom>, ConsultationError> {
        self.get_room(caller, room_id).await?;

        let ended = self.registry.end(room_id).await?;
        self.router.close_channel(room_id).await;
        Ok(ended)
    }

    /// A fresh subscription for the caller, replacing any live one.
    pub async fn subscribe(&self, caller: &Caller, room_id: &str) -> Result<Subscription, ConsultationError> {
        self.get_room(caller, room_id).await?;

        if self.router.leave_channel(room_id, caller.id).await {
            info!("Replacing subscription of {} in room {}", caller.id, room_id);
        }

        self.router
            .join_channel(room_id, caller.id)
            .await?
            .ok_or_else(|| {
                warn!("Concurrent subscription for {} in room {}", caller.id, room_id);
                ConsultationError::ValidationError("Already subscribed to this room".to_string())
            })
    }

    pub async fn leave(&self, caller: &Caller, room_id: &str) -> Result<bool, ConsultationError> {
        self.get_room(caller, room_id).await?;
        Ok(self.router.leave_channel(room_id, caller.id).await)
    }

    pub async fn send(
        &self,
        caller: &Caller,
        room_id: &str,
        body: &str,
    ) -> Result<Persisted<ChatMessage>, ConsultationError> {
        let sender_role = caller.sender_role().ok_or_else(|| {
            ConsultationError::ValidationError("Only the doctor or the patient can post messages".to_string())
        })?;

        self.router.send(room_id, caller.id, sender_role, body).await
    }

    /// Stored messages, oldest first. Ended rooms keep their history.
    pub async fn messages(&self, caller: &Caller, room_id: &str) -> Result<Vec<ChatMessage>, ConsultationError> {
        self.get_room(caller, room_id).await?;

        self.store
            .find_by_room(room_id)
            .await
            .map_err(|e| ConsultationError::RecordStore(e.to_string()))
    }

    pub async fn members(&self, caller: &Caller, room_id: &str) -> Result<Vec<Uuid>, ConsultationError> {
        self.get_room(caller, room_id).await?;
        Ok(self.router.members(room_id).await)
    }

    /// One admission pass over the directory's waiting list.
    ///
    /// Bookings that already had a room today are left out even while the
    /// directory still lists them as waiting. Admitted patients are then
    /// marked in the directory; a failed mark is logged.
    pub async fn run_admission(&self) -> Result<AdmissionResult, ConsultationError> {
        let rooms = self.registry.rooms().await;
        let waiting: Vec<Patient> = self
            .patients
            .waiting_patients()
            .await?
            .into_iter()
            .filter(|patient| !self.scheduler.booking_roomed(patient, &rooms))
            .collect();

        let result = self.scheduler.admit_next(&waiting, &rooms, Utc::now()).await;

        for patient in &result.admitted {
            if let Err(e) = self.patients.mark_admitted(patient.id).await {
                warn!("Patient {} stays listed as waiting: {}", patient.id, e);
            }
        }

        Ok(result)
    }

    pub async fn stats(&self) -> RegistryStats {
        self.registry.stats().await
    }

    fn authorize(caller: &Caller, room: &ConsultationRoom) -> Result<(), ConsultationError> {
        if caller.is_admin() || room.has_participant(caller.id) {
            Ok(())
        } else {
            Err(ConsultationError::Unauthorized(format!(
                "Not a participant of room {}",
                room.room_id
            )))
        }
    }
}
