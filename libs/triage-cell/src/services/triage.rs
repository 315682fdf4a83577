// libs/triage-cell/src/services/triage.rs
use std::sync::Arc;
use tracing::{info, warn};

use shared_config::AppConfig;

use crate::models::{
    AssessmentResponse, DoctorCandidate, DoctorProfile, SymptomAnswers, TriageCategory,
    TriageError, TriageResult,
};
use crate::services::directory::{DoctorDirectory, SupabaseDoctorDirectory};
use crate::services::ranking::RecommendationRanker;
use crate::services::scoring::TriageScorer;

/// Questionnaire → severity → ranked doctors.
pub struct TriageService {
    ranker: RecommendationRanker,
    directory: Arc<dyn DoctorDirectory>,
}

impl TriageService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_directory(config, Arc::new(SupabaseDoctorDirectory::new(config)))
    }

    pub fn with_directory(config: &AppConfig, directory: Arc<dyn DoctorDirectory>) -> Self {
        Self {
            ranker: RecommendationRanker::from_config(config),
            directory,
        }
    }

    pub fn directory(&self) -> Arc<dyn DoctorDirectory> {
        Arc::clone(&self.directory)
    }

    /// Rejects empty or out-of-range answers; otherwise scores them.
    pub fn score_assessment(&self, answers: &SymptomAnswers) -> Result<TriageResult, TriageError> {
        answers.validate().map_err(|e| {
            warn!("Rejected symptom assessment: {}", e);
            e
        })?;

        Ok(TriageScorer::score(answers))
    }

    pub fn rank_doctors(&self, category: TriageCategory, doctors: &[DoctorProfile]) -> Vec<DoctorCandidate> {
        self.ranker.rank(category, doctors)
    }

    pub async fn recommend(
        &self,
        category: TriageCategory,
        auth_token: Option<&str>,
    ) -> Result<Vec<DoctorCandidate>, TriageError> {
        let doctors = self.directory.list_doctors(auth_token).await?;
        Ok(self.rank_doctors(category, &doctors))
    }

    /// Full flow used by the assessment endpoint.
    pub async fn assess(
        &self,
        answers: &SymptomAnswers,
        auth_token: Option<&str>,
    ) -> Result<AssessmentResponse, TriageError> {
        let triage = self.score_assessment(answers)?;
        let recommendations = self.recommend(triage.category, auth_token).await?;

        info!(
            "Assessment scored {} ({}), {} doctors recommended",
            triage.score,
            triage.category,
            recommendations.len()
        );

        Ok(AssessmentResponse {
            triage,
            recommendations,
        })
    }
}
