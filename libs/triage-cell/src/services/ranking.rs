// libs/triage-cell/src/services/ranking.rs
use tracing::debug;

use shared_config::AppConfig;

use crate::models::{DoctorCandidate, DoctorProfile, TriageCategory};

pub const MAX_RECOMMENDATIONS: usize = 6;

const SPECIALTY_BONUS: u32 = 10;
const AVAILABILITY_BONUS: u32 = 3;
const LOCALITY_BONUS: u32 = 2;
const QUALITY_BONUS: u32 = 1;
const QUALITY_RATING_THRESHOLD: f64 = 4.0;

/// Ranks directory doctors against a triage category.
pub struct RecommendationRanker {
    home_region: String,
}

impl RecommendationRanker {
    pub fn new(home_region: impl Into<String>) -> Self {
        Self {
            home_region: home_region.into().trim().to_lowercase(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.home_region.as_str())
    }

    /// Highest score first, ties keep their directory order, at most
    /// `MAX_RECOMMENDATIONS` entries.
    pub fn rank(&self, category: TriageCategory, doctors: &[DoctorProfile]) -> Vec<DoctorCandidate> {
        let specialties = category.specialties();

        let mut candidates: Vec<DoctorCandidate> = doctors
            .iter()
            .map(|doctor| self.evaluate(doctor, specialties))
            .collect();

        // sort_by is stable
        candidates.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        candidates.truncate(MAX_RECOMMENDATIONS);

        debug!(
            "Ranked {} doctors for category {}, returning {}",
            doctors.len(),
            category,
            candidates.len()
        );

        candidates
    }

    fn evaluate(&self, doctor: &DoctorProfile, specialties: &[&str]) -> DoctorCandidate {
        let mut match_score = 0;
        let mut match_reasons = Vec::new();

        let specialty = doctor.specialty.trim();
        if specialties.iter().any(|s| s.eq_ignore_ascii_case(specialty)) {
            match_score += SPECIALTY_BONUS;
            match_reasons.push(format!("Specialty {} matches triage outcome", specialty));
        }

        if doctor.available {
            match_score += AVAILABILITY_BONUS;
            match_reasons.push("Currently available".to_string());
        }

        if self.is_local(doctor) {
            match_score += LOCALITY_BONUS;
            match_reasons.push("Practices in the home region".to_string());
        }

        if doctor.rating.is_some_and(|rating| rating > QUALITY_RATING_THRESHOLD) {
            match_score += QUALITY_BONUS;
            match_reasons.push("Highly rated".to_string());
        }

        DoctorCandidate {
            doctor_id: doctor.id,
            name: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            match_score,
            match_reasons,
        }
    }

    fn is_local(&self, doctor: &DoctorProfile) -> bool {
        if self.home_region.is_empty() {
            return false;
        }

        doctor
            .hospital
            .as_deref()
            .is_some_and(|hospital| hospital.to_lowercase().contains(&self.home_region))
    }
}
