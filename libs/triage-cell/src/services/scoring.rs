// libs/triage-cell/src/services/scoring.rs
use crate::models::{CoughKind, SymptomAnswers, TriageCategory, TriageResult};

const HIGH_FEVER_F: f64 = 100.4;
const LOW_GRADE_FEVER_F: f64 = 99.0;
const PERSISTENT_COUGH_DAYS: u32 = 7;

const HIGH_FEVER_POINTS: u32 = 3;
const LOW_GRADE_FEVER_POINTS: u32 = 1;
const PERSISTENT_DRY_COUGH_POINTS: u32 = 2;
const COUGH_POINTS: u32 = 1;
const SEVERE_PAIN_POINTS: u32 = 3;
const MODERATE_PAIN_POINTS: u32 = 2;
const MILD_PAIN_POINTS: u32 = 1;
const FATIGUE_POINTS: u32 = 1;
const SICK_CONTACT_POINTS: u32 = 2;

/// Inclusive lower bounds.
pub const LOW_THRESHOLD: u32 = 2;
pub const HIGH_THRESHOLD: u32 = 4;
pub const ABNORMAL_THRESHOLD: u32 = 7;

/// Weighted additive symptom scorer.
///
/// Each observation is scored independently and the contributions are summed,
/// so adding evidence can only raise the total.
pub struct TriageScorer;

impl TriageScorer {
    pub fn score(answers: &SymptomAnswers) -> TriageResult {
        let score = Self::fever_points(answers)
            + Self::cough_points(answers)
            + Self::pain_points(answers)
            + Self::flag_points(answers.fatigue, FATIGUE_POINTS)
            + Self::flag_points(answers.sick_contact, SICK_CONTACT_POINTS);

        TriageResult {
            score,
            category: Self::categorize(score),
        }
    }

    pub fn categorize(score: u32) -> TriageCategory {
        if score >= ABNORMAL_THRESHOLD {
            TriageCategory::Abnormal
        } else if score >= HIGH_THRESHOLD {
            TriageCategory::High
        } else if score >= LOW_THRESHOLD {
            TriageCategory::Low
        } else {
            TriageCategory::Normal
        }
    }

    /// The reading decides the tier; a bare "yes" without a higher reading
    /// counts as low-grade.
    fn fever_points(answers: &SymptomAnswers) -> u32 {
        let from_reading = match answers.temperature {
            Some(t) if t > HIGH_FEVER_F => HIGH_FEVER_POINTS,
            Some(t) if t > LOW_GRADE_FEVER_F => LOW_GRADE_FEVER_POINTS,
            _ => 0,
        };
        let from_report = Self::flag_points(answers.has_fever, LOW_GRADE_FEVER_POINTS);

        from_reading.max(from_report)
    }

    fn cough_points(answers: &SymptomAnswers) -> u32 {
        match answers.cough {
            Some(CoughKind::Dry)
                if answers.cough_duration_days.unwrap_or(0) > PERSISTENT_COUGH_DAYS =>
            {
                PERSISTENT_DRY_COUGH_POINTS
            }
            Some(CoughKind::Dry) | Some(CoughKind::Productive) => COUGH_POINTS,
            Some(CoughKind::Absent) | None => 0,
        }
    }

    fn pain_points(answers: &SymptomAnswers) -> u32 {
        match answers.pain_level {
            Some(level) if level >= 7 => SEVERE_PAIN_POINTS,
            Some(level) if level >= 4 => MODERATE_PAIN_POINTS,
            Some(level) if level > 0 => MILD_PAIN_POINTS,
            _ => 0,
        }
    }

    fn flag_points(flag: Option<bool>, points: u32) -> u32 {
        if flag == Some(true) {
            points
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_answers_is_normal() {
        let result = TriageScorer::score(&SymptomAnswers::default());
        assert_eq!(result.score, 0);
        assert_eq!(result.category, TriageCategory::Normal);
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(TriageScorer::categorize(0), TriageCategory::Normal);
        assert_eq!(TriageScorer::categorize(1), TriageCategory::Normal);
        assert_eq!(TriageScorer::categorize(2), TriageCategory::Low);
        assert_eq!(TriageScorer::categorize(3), TriageCategory::Low);
        assert_eq!(TriageScorer::categorize(4), TriageCategory::High);
        assert_eq!(TriageScorer::categorize(6), TriageCategory::High);
        assert_eq!(TriageScorer::categorize(7), TriageCategory::Abnormal);
        assert_eq!(TriageScorer::categorize(40), TriageCategory::Abnormal);
    }

    #[test]
    fn test_fever_tiers() {
        let high = SymptomAnswers {
            has_fever: Some(true),
            temperature: Some(101.0),
            ..Default::default()
        };
        let low_grade = SymptomAnswers {
            temperature: Some(99.5),
            ..Default::default()
        };
        let reported_only = SymptomAnswers {
            has_fever: Some(true),
            ..Default::default()
        };
        let boundary = SymptomAnswers {
            temperature: Some(100.4),
            ..Default::default()
        };

        assert_eq!(TriageScorer::score(&high).score, 3);
        assert_eq!(TriageScorer::score(&low_grade).score, 1);
        assert_eq!(TriageScorer::score(&reported_only).score, 1);
        assert_eq!(TriageScorer::score(&boundary).score, 1);
    }

    #[test]
    fn test_persistent_dry_cough_outscores_productive() {
        let dry = SymptomAnswers {
            cough: Some(CoughKind::Dry),
            cough_duration_days: Some(10),
            ..Default::default()
        };
        let productive = SymptomAnswers {
            cough: Some(CoughKind::Productive),
            cough_duration_days: Some(10),
            ..Default::default()
        };

        assert!(TriageScorer::score(&dry).score > TriageScorer::score(&productive).score);
    }

    #[test]
    fn test_negative_pain_contributes_nothing() {
        let answers = SymptomAnswers {
            pain_level: Some(-3),
            ..Default::default()
        };
        assert_eq!(TriageScorer::score(&answers).score, 0);
    }
}
