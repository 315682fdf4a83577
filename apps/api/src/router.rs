use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use consultation_cell::{consultation_routes, ConsultationState};
use triage_cell::{triage_routes, TriageState};

pub fn create_router(
    triage_state: Arc<TriageState>,
    consultation_state: Arc<ConsultationState>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Consultation API is running!" }))
        .nest("/triage", triage_routes(triage_state))
        .nest("/consultations", consultation_routes(consultation_state))
}
