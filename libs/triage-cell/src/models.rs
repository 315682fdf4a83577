// libs/triage-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ==============================================================================
// SYMPTOM QUESTIONNAIRE
// ==============================================================================

/// Answers to the symptom questionnaire. Every field is optional; a missing
/// answer is "no evidence" and contributes nothing to the score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnswers {
    #[serde(default, with = "yes_no", skip_serializing_if = "Option::is_none")]
    pub has_fever: Option<bool>,
    /// Degrees Fahrenheit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cough: Option<CoughKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cough_duration_days: Option<u32>,
    /// Self-reported, 0-10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<i32>,
    #[serde(default, with = "yes_no", skip_serializing_if = "Option::is_none")]
    pub fatigue: Option<bool>,
    #[serde(default, with = "yes_no", skip_serializing_if = "Option::is_none")]
    pub sick_contact: Option<bool>,
}

impl SymptomAnswers {
    pub fn is_empty(&self) -> bool {
        self.has_fever.is_none()
            && self.temperature.is_none()
            && self.cough.is_none()
            && self.cough_duration_days.is_none()
            && self.pain_level.is_none()
            && self.fatigue.is_none()
            && self.sick_contact.is_none()
    }

    /// Boundary validation. The scorer itself accepts anything.
    pub fn validate(&self) -> Result<(), TriageError> {
        if self.is_empty() {
            return Err(TriageError::ValidationError(
                "No symptom answers provided".to_string(),
            ));
        }

        if let Some(pain) = self.pain_level {
            if !(0..=10).contains(&pain) {
                return Err(TriageError::ValidationError(format!(
                    "Pain level must be between 0 and 10, got {}",
                    pain
                )));
            }
        }

        if let Some(temperature) = self.temperature {
            if !temperature.is_finite() || temperature <= 0.0 {
                return Err(TriageError::ValidationError(format!(
                    "Temperature must be a positive reading, got {}",
                    temperature
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoughKind {
    #[serde(rename = "dry")]
    Dry,
    #[serde(rename = "productive")]
    Productive,
    #[serde(rename = "none")]
    Absent,
}

/// Accepts `"yes"`/`"no"` (any case) or a JSON boolean.
mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Answer {
        Flag(bool),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(true) => serializer.serialize_str("yes"),
            Some(false) => serializer.serialize_str("no"),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Answer>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Answer::Flag(flag)) => Ok(Some(flag)),
            Some(Answer::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" => Ok(Some(true)),
                "no" | "n" | "false" => Ok(Some(false)),
                "" => Ok(None),
                other => Err(serde::de::Error::custom(format!(
                    "Expected yes/no answer, got '{}'",
                    other
                ))),
            },
        }
    }
}

// ==============================================================================
// TRIAGE OUTCOME
// ==============================================================================

/// Severity categories in ascending order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TriageCategory {
    Normal,
    Low,
    High,
    Abnormal,
}

impl TriageCategory {
    /// Specialties a patient in this category should be pointed to. A healthy
    /// outcome maps to none so ranking falls back to the generic bonuses.
    pub fn specialties(&self) -> &'static [&'static str] {
        match self {
            TriageCategory::Normal => &[],
            TriageCategory::Low => &["General Medicine", "Family Medicine", "Internal Medicine"],
            TriageCategory::High => &["General Medicine", "Family Medicine"],
            TriageCategory::Abnormal => &[
                "Internal Medicine",
                "Emergency Medicine",
                "Pulmonology",
                "Infectious Disease",
            ],
        }
    }
}

impl fmt::Display for TriageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TriageCategory::Normal => "Normal",
            TriageCategory::Low => "Low",
            TriageCategory::High => "High",
            TriageCategory::Abnormal => "Abnormal",
        };
        f.write_str(label)
    }
}

impl FromStr for TriageCategory {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(TriageCategory::Normal),
            "low" => Ok(TriageCategory::Low),
            "high" => Ok(TriageCategory::High),
            "abnormal" => Ok(TriageCategory::Abnormal),
            _ => Err(TriageError::ValidationError(format!(
                "Unknown triage category '{}'",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriageResult {
    pub score: u32,
    pub category: TriageCategory,
}

// ==============================================================================
// DOCTOR RECOMMENDATION
// ==============================================================================

/// Doctor directory entry as returned by the directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorProfile {
    pub id: Uuid,
    #[serde(default, alias = "full_name")]
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub hospital: Option<String>,
    #[serde(default, alias = "is_available", deserialize_with = "availability::deserialize")]
    pub available: bool,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Directory rows carry availability as a flag or a free-text schedule;
/// any non-empty schedule counts as available.
mod availability {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(flag) => flag,
            Value::String(text) => {
                let text = text.trim().to_ascii_lowercase();
                !(text.is_empty() || text == "false" || text == "no")
            }
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorCandidate {
    pub doctor_id: Uuid,
    pub name: String,
    pub specialty: String,
    pub match_score: u32,
    pub match_reasons: Vec<String>,
}

// ==============================================================================
// API REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    pub triage: TriageResult,
    pub recommendations: Vec<DoctorCandidate>,
}

// ==============================================================================
// ERROR HANDLING
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Doctor not found: {0}")]
    DoctorNotFound(Uuid),

    #[error("Doctor directory error: {0}")]
    Directory(String),
}

impl From<anyhow::Error> for TriageError {
    fn from(err: anyhow::Error) -> Self {
        TriageError::Directory(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answers_accept_yes_no_strings_and_booleans() {
        let answers: SymptomAnswers = serde_json::from_value(json!({
            "hasFever": "yes",
            "temperature": 101,
            "fatigue": false,
            "sickContact": "No",
            "painLevel": 8
        }))
        .unwrap();

        assert_eq!(answers.has_fever, Some(true));
        assert_eq!(answers.temperature, Some(101.0));
        assert_eq!(answers.fatigue, Some(false));
        assert_eq!(answers.sick_contact, Some(false));
        assert_eq!(answers.pain_level, Some(8));
        assert_eq!(answers.cough, None);
    }

    #[test]
    fn test_empty_answers_fail_validation() {
        let answers: SymptomAnswers = serde_json::from_value(json!({})).unwrap();
        assert!(answers.is_empty());
        assert!(answers.validate().is_err());
    }

    #[test]
    fn test_out_of_range_pain_fails_validation() {
        let answers = SymptomAnswers {
            pain_level: Some(-2),
            ..Default::default()
        };
        assert!(matches!(answers.validate(), Err(TriageError::ValidationError(_))));
    }

    #[test]
    fn test_category_parsing_is_case_insensitive() {
        assert_eq!("high".parse::<TriageCategory>().unwrap(), TriageCategory::High);
        assert_eq!(" ABNORMAL ".parse::<TriageCategory>().unwrap(), TriageCategory::Abnormal);
        assert!("critical".parse::<TriageCategory>().is_err());
    }

    #[test]
    fn test_doctor_availability_from_directory_row() {
        let scheduled: DoctorProfile = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "full_name": "Dr. Ade",
            "specialty": "Family Medicine",
            "is_available": "Mon-Fri 9-5"
        }))
        .unwrap();
        assert!(scheduled.available);
        assert_eq!(scheduled.name, "Dr. Ade");

        let blank: DoctorProfile = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "specialty": "Cardiology",
            "available": ""
        }))
        .unwrap();
        assert!(!blank.available);
    }
}
