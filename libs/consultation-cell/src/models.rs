// libs/consultation-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_models::auth::CallerRole;

// ==============================================================================
// CONSULTATION ROOM
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Active,
    Ended,
}

impl RoomStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RoomStatus::Ended)
    }

    pub fn can_transition_to(&self, target: &RoomStatus) -> bool {
        use RoomStatus::*;
        matches!((self, target), (Waiting, Active) | (Waiting, Ended) | (Active, Ended))
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomStatus::Waiting => write!(f, "waiting"),
            RoomStatus::Active => write!(f, "active"),
            RoomStatus::Ended => write!(f, "ended"),
        }
    }
}

/// A doctor/patient consultation. Rooms are never deleted; `Ended` is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationRoom {
    pub room_id: String,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ConsultationRoom {
    pub fn new(room_id: String, doctor_id: Uuid, patient_id: Uuid) -> Self {
        Self {
            room_id,
            doctor_id,
            patient_id,
            status: RoomStatus::Waiting,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn has_participant(&self, participant_id: Uuid) -> bool {
        self.doctor_id == participant_id || self.patient_id == participant_id
    }

    /// Whether `sender_id` is the room's participant for `role`.
    pub fn is_sender(&self, sender_id: Uuid, role: SenderRole) -> bool {
        match role {
            SenderRole::Doctor => self.doctor_id == sender_id,
            SenderRole::Patient => self.patient_id == sender_id,
        }
    }
}

// ==============================================================================
// CHAT
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    Doctor,
    Patient,
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderRole::Doctor => write!(f, "doctor"),
            SenderRole::Patient => write!(f, "patient"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub room_id: String,
    pub sender_id: Uuid,
    pub sender_role: SenderRole,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

// ==============================================================================
// WAITING ROOM
// ==============================================================================

/// Declaration order is ascending urgency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[default]
    Waiting,
    Admitted,
    Completed,
    Cancelled,
}

/// Waiting-room entry read from the patient directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub priority: Priority,
    pub appointment_time: DateTime<Utc>,
    /// The doctor this patient is booked with.
    pub doctor_id: Uuid,
    #[serde(default)]
    pub status: PatientStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AdmissionResult {
    pub admitted: Vec<Patient>,
    pub new_rooms: Vec<Persisted<ConsultationRoom>>,
}

// ==============================================================================
// PERSISTENCE OUTCOME
// ==============================================================================

/// Outcome of the durable write that follows an in-memory change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum WriteStatus {
    Durable,
    /// Nothing changed, so nothing was written.
    Unchanged,
    Degraded { reason: String },
}

impl WriteStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, WriteStatus::Degraded { .. })
    }
}

/// An applied change together with how its write went.
#[derive(Debug, Clone, Serialize)]
pub struct Persisted<T> {
    pub record: T,
    pub write: WriteStatus,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub waiting: usize,
    pub active: usize,
    pub ended: usize,
}

// ==============================================================================
// CALLER
// ==============================================================================

/// Verified identity acting on the consultation core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: CallerRole,
}

impl Caller {
    pub fn new(id: Uuid, role: CallerRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == CallerRole::Admin
    }

    /// Chat role, if this caller may post messages at all.
    pub fn sender_role(&self) -> Option<SenderRole> {
        match self.role {
            CallerRole::Doctor => Some(SenderRole::Doctor),
            CallerRole::Patient => Some(SenderRole::Patient),
            CallerRole::Admin => None,
        }
    }
}

// ==============================================================================
// API REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct RoomListQuery {
    pub participant_id: Option<Uuid>,
}
