// libs/consultation-cell/src/lib.rs
//! # Consultation Cell
//!
//! Consultation room lifecycle, waiting-room admission and live chat between
//! a doctor and a patient.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------+
//! |                Consultation Cell                    |
//! +-----------------------------------------------------+
//! |  handlers.rs    |  HTTP endpoint handlers           |
//! |  router.rs      |  Route definitions                |
//! |  models.rs      |  Rooms, messages, patients        |
//! |  error.rs       |  ConsultationError                |
//! |  services/      |  Business logic layer             |
//! |    registry.rs  |  Room state machine               |
//! |    scheduler.rs |  Waiting-room admission           |
//! |    messaging.rs |  Per-room publish/subscribe       |
//! |    store.rs     |  Durable room/message records     |
//! |    directory.rs |  Waiting patient lookup           |
//! |    consultation.rs | Caller-facing operations       |
//! +-----------------------------------------------------+
//! ```
//!
//! Rooms move `Waiting -> Active -> Ended`, or straight from `Waiting` to
//! `Ended`. Each room has its own lock, so operations on different rooms
//! never wait on each other. State changes are applied in memory first and
//! then written to the record store; a failed write is reported as a
//! degraded write and never undoes the change.
//!
//! ## API Endpoints
//!
//! - `GET /consultations/health` - Health check with room counts
//! - `POST /consultations/rooms` - Open a room
//! - `GET /consultations/rooms` - Caller's rooms
//! - `GET /consultations/rooms/{room_id}` - Room details
//! - `POST /consultations/rooms/{room_id}/activate` - Doctor joined
//! - `POST /consultations/rooms/{room_id}/end` - End the consultation
//! - `GET /consultations/rooms/{room_id}/events` - Server-sent message stream
//! - `POST /consultations/rooms/{room_id}/leave` - Drop the caller's stream
//! - `GET /consultations/rooms/{room_id}/members` - Connected participants
//! - `POST /consultations/rooms/{room_id}/messages` - Send a message
//! - `GET /consultations/rooms/{room_id}/messages` - Message history
//! - `POST /consultations/admissions` - Run an admission pass (admin)

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::ConsultationError;

pub use models::{
    AdmissionResult, Caller, ChatMessage, ConsultationRoom, Patient, PatientStatus, Persisted,
    Priority, RegistryStats, RoomStatus, SenderRole, WriteStatus,
};

pub use services::{
    AdmissionScheduler, ConsultationService, MemoryRecordStore, MessageRouter, PatientDirectory,
    RecordStore, SessionRegistry, Subscription,
};

pub use router::{consultation_routes, ConsultationState};
