// libs/consultation-cell/src/error.rs
use thiserror::Error;
use uuid::Uuid;

use triage_cell::TriageError;

use crate::models::RoomStatus;

#[derive(Error, Debug)]
pub enum ConsultationError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Doctor {doctor_id} and patient {patient_id} already share open room {room_id}")]
    DuplicateSession {
        doctor_id: Uuid,
        patient_id: Uuid,
        room_id: String,
    },

    #[error("Room {room_id} cannot move from {from} to {to}")]
    InvalidTransition {
        room_id: String,
        from: RoomStatus,
        to: RoomStatus,
    },

    #[error("Room {0} has ended")]
    RoomClosed(String),

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Record store error: {0}")]
    RecordStore(String),
}

impl From<TriageError> for ConsultationError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::ValidationError(msg) => ConsultationError::ValidationError(msg),
            TriageError::DoctorNotFound(id) => {
                ConsultationError::ValidationError(format!("Unknown doctor {}", id))
            }
            TriageError::Directory(msg) => ConsultationError::Directory(msg),
        }
    }
}
