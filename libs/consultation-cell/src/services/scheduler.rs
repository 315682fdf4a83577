// libs/consultation-cell/src/services/scheduler.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::ConsultationError;
use crate::models::{AdmissionResult, ConsultationRoom, Patient, PatientStatus};
use crate::services::registry::SessionRegistry;

/// Greedy waiting-room admission. Passes run one at a time.
pub struct AdmissionScheduler {
    registry: Arc<SessionRegistry>,
    clinic_offset: FixedOffset,
    pass_lock: Mutex<()>,
}

impl AdmissionScheduler {
    pub fn new(registry: Arc<SessionRegistry>, clinic_offset: FixedOffset) -> Self {
        Self {
            registry,
            clinic_offset,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn from_config(registry: Arc<SessionRegistry>, config: &AppConfig) -> Self {
        let offset = config
            .clinic_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "Invalid clinic UTC offset of {} minutes, using UTC",
                    config.clinic_utc_offset_minutes
                );
                Utc.fix()
            });
        Self::new(registry, offset)
    }

    /// One admission pass.
    ///
    /// Today's waiting patients are taken by priority, then appointment time,
    /// then input order. Patients already in an open room, either in
    /// `current_rooms` or in the registry, are skipped, as is a second
    /// booking for a patient admitted earlier in the same pass.
    #[instrument(skip_all, fields(waiting = waiting_patients.len(), rooms = current_rooms.len()))]
    pub async fn admit_next(
        &self,
        waiting_patients: &[Patient],
        current_rooms: &[ConsultationRoom],
        now: DateTime<Utc>,
    ) -> AdmissionResult {
        let _pass = self.pass_lock.lock().await;

        let today = self.clinic_day(now);
        let mut roomed: HashSet<Uuid> = current_rooms
            .iter()
            .chain(self.registry.rooms().await.iter())
            .filter(|room| room.is_open())
            .map(|room| room.patient_id)
            .collect();

        let mut eligible: Vec<&Patient> = waiting_patients
            .iter()
            .filter(|p| p.status == PatientStatus::Waiting)
            .filter(|p| self.clinic_day(p.appointment_time) == today)
            .collect();

        // sort_by is stable, so input order breaks the remaining ties
        eligible.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.appointment_time.cmp(&b.appointment_time))
        });

        let mut result = AdmissionResult::default();

        for patient in eligible {
            if roomed.contains(&patient.id) {
                debug!("Patient {} already has an open room", patient.id);
                continue;
            }

            match self.registry.create_room(patient.doctor_id, patient.id).await {
                Ok(created) => {
                    roomed.insert(patient.id);
                    result.admitted.push(patient.clone());
                    result.new_rooms.push(created);
                }
                Err(ConsultationError::DuplicateSession { room_id, .. }) => {
                    debug!("Patient {} already admitted to room {}", patient.id, room_id);
                    roomed.insert(patient.id);
                }
                Err(e) => {
                    warn!("Could not admit patient {}: {}", patient.id, e);
                }
            }
        }

        info!(
            "Admission pass admitted {} of {} waiting patients",
            result.admitted.len(),
            waiting_patients.len()
        );

        result
    }

    /// Whether the patient's booking already had a room, in any status, on
    /// the clinic day of its appointment.
    pub fn booking_roomed(&self, patient: &Patient, rooms: &[ConsultationRoom]) -> bool {
        let booked_day = self.clinic_day(patient.appointment_time);

        rooms.iter().any(|room| {
            room.patient_id == patient.id
                && room.doctor_id == patient.doctor_id
                && self.clinic_day(room.created_at) == booked_day
        })
    }

    fn clinic_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.clinic_offset).date_naive()
    }
}
