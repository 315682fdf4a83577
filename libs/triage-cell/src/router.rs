// libs/triage-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;
use crate::services::TriageService;

pub struct TriageState {
    pub config: Arc<AppConfig>,
    pub service: Arc<TriageService>,
}

impl TriageState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let service = Arc::new(TriageService::new(&config));
        Self { config, service }
    }
}

pub fn triage_routes(state: Arc<TriageState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(triage_health_check));

    let protected_routes = Router::new()
        .route("/assessments", post(create_assessment))
        .route("/recommendations", post(recommend_doctors))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
