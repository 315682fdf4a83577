// libs/triage-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{
    AssessmentResponse, RecommendationRequest, SymptomAnswers, TriageCategory, TriageError,
};
use crate::router::TriageState;

impl From<TriageError> for AppError {
    fn from(err: TriageError) -> Self {
        match err {
            TriageError::ValidationError(msg) => AppError::ValidationError(msg),
            TriageError::DoctorNotFound(id) => AppError::NotFound(format!("Doctor {} not found", id)),
            TriageError::Directory(msg) => AppError::ExternalService(msg),
        }
    }
}

pub async fn triage_health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "triage-cell"
    }))
}

/// Score a questionnaire and recommend doctors for the resulting category.
#[axum::debug_handler]
pub async fn create_assessment(
    State(state): State<Arc<TriageState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(answers): Json<SymptomAnswers>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let response = state.service.assess(&answers, Some(auth.token())).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn recommend_doctors(
    State(state): State<Arc<TriageState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Value>, AppError> {
    let category: TriageCategory = request.category.parse()?;

    let recommendations = state
        .service
        .recommend(category, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "category": category,
        "recommendations": recommendations,
        "total": recommendations.len()
    })))
}
