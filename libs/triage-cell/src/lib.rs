// libs/triage-cell/src/lib.rs
//! # Triage Cell
//!
//! Scores a patient's symptom questionnaire into a severity category and
//! recommends doctors from the directory for that category.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                   Triage Cell                       |
//! +-----------------------------------------------------+
//! |  handlers.rs    |  HTTP endpoint handlers           |
//! |  router.rs      |  Route definitions                |
//! |  models.rs      |  Questionnaire, outcome, doctors  |
//! |  services/      |                                   |
//! |    scoring.rs   |  Weighted symptom scorer          |
//! |    ranking.rs   |  Doctor recommendation ranker     |
//! |    directory.rs |  Doctor directory lookup          |
//! |    triage.rs    |  Assessment flow                  |
//! +-----------------------------------------------------+
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /triage/health` - Health check
//! - `POST /triage/assessments` - Score answers and recommend doctors
//! - `POST /triage/recommendations` - Recommend doctors for a known category

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    CoughKind, DoctorCandidate, DoctorProfile, SymptomAnswers, TriageCategory, TriageError,
    TriageResult,
};

pub use services::{
    DoctorDirectory, InMemoryDoctorDirectory, RecommendationRanker, SupabaseDoctorDirectory,
    TriageScorer, TriageService,
};

pub use router::{triage_routes, TriageState};
