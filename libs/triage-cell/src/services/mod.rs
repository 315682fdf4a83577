// libs/triage-cell/src/services/mod.rs

pub mod directory;
pub mod ranking;
pub mod scoring;
pub mod triage;

pub use directory::{DoctorDirectory, InMemoryDoctorDirectory, SupabaseDoctorDirectory};
pub use ranking::{RecommendationRanker, MAX_RECOMMENDATIONS};
pub use scoring::TriageScorer;
pub use triage::TriageService;
