// libs/consultation-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;
use crate::services::ConsultationService;

pub struct ConsultationState {
    pub config: Arc<AppConfig>,
    pub service: Arc<ConsultationService>,
}

impl ConsultationState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let service = Arc::new(ConsultationService::new(&config));
        Self { config, service }
    }
}

pub fn consultation_routes(state: Arc<ConsultationState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(consultation_health_check));

    let protected_routes = Router::new()
        // Room lifecycle
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/{room_id}", get(get_room))
        .route("/rooms/{room_id}/activate", post(activate_room))
        .route("/rooms/{room_id}/end", post(end_room))

        // Live messaging
        .route("/rooms/{room_id}/events", get(room_events))
        .route("/rooms/{room_id}/leave", post(leave_room))
        .route("/rooms/{room_id}/members", get(room_members))
        .route("/rooms/{room_id}/messages", post(send_message).get(message_history))

        // Admin endpoints
        .route("/admissions", post(run_admission))

        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
