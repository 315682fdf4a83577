// libs/consultation-cell/src/services/mod.rs

pub mod consultation;
pub mod directory;
pub mod messaging;
pub mod registry;
pub mod scheduler;
pub mod store;

pub use consultation::ConsultationService;
pub use directory::{InMemoryPatientDirectory, PatientDirectory, SupabasePatientDirectory};
pub use messaging::{MessageRouter, Subscription};
pub use registry::SessionRegistry;
pub use scheduler::AdmissionScheduler;
pub use store::{MemoryRecordStore, RecordStore, SupabaseRecordStore};
