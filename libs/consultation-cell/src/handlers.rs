// libs/consultation-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use axum_extra::TypedHeader;
use futures::{Stream, StreamExt};
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::error::ConsultationError;
use crate::models::{
    AdmissionResult, Caller, ChatMessage, ConsultationRoom, CreateRoomRequest, Persisted,
    RoomListQuery, SendMessageRequest,
};
use crate::router::ConsultationState;

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::ValidationError(msg) => AppError::ValidationError(msg),
            ConsultationError::RoomNotFound(id) => AppError::NotFound(format!("Room {} not found", id)),
            ConsultationError::Unauthorized(msg) => AppError::Forbidden(msg),
            ConsultationError::Directory(msg) | ConsultationError::RecordStore(msg) => {
                AppError::ExternalService(msg)
            }
            e @ (ConsultationError::DuplicateSession { .. }
            | ConsultationError::InvalidTransition { .. }
            | ConsultationError::RoomClosed(_)) => AppError::Conflict(e.to_string()),
        }
    }
}

fn caller_from(user: &User) -> Result<Caller, AppError> {
    let id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))?;
    Ok(Caller::new(id, user.caller_role()))
}

// ==============================================================================
// HEALTH
// ==============================================================================

pub async fn consultation_health_check(
    State(state): State<Arc<ConsultationState>>,
) -> Json<Value> {
    let stats = state.service.stats().await;

    Json(json!({
        "status": "healthy",
        "service": "consultation-cell",
        "rooms": stats
    }))
}

// ==============================================================================
// ROOM LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_room(
    State(state): State<Arc<ConsultationState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Persisted<ConsultationRoom>>, AppError> {
    let caller = caller_from(&user)?;

    let created = state
        .service
        .create_room(&caller, request.doctor_id, request.patient_id, Some(auth.token()))
        .await?;

    Ok(Json(created))
}

pub async fn list_rooms(
    State(state): State<Arc<ConsultationState>>,
    Query(query): Query<RoomListQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_from(&user)?;
    let rooms = state.service.list_rooms(&caller, query.participant_id).await?;

    Ok(Json(json!({
        "rooms": rooms,
        "total": rooms.len()
    })))
}

pub async fn get_room(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<ConsultationRoom>, AppError> {
    let caller = caller_from(&user)?;
    Ok(Json(state.service.get_room(&caller, &room_id).await?))
}

pub async fn activate_room(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Persisted<ConsultationRoom>>, AppError> {
    let caller = caller_from(&user)?;
    Ok(Json(state.service.activate(&caller, &room_id).await?))
}

pub async fn end_room(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Persisted<ConsultationRoom>>, AppError> {
    let caller = caller_from(&user)?;
    Ok(Json(state.service.end(&caller, &room_id).await?))
}

// ==============================================================================
// MESSAGING HANDLERS
// ==============================================================================

/// Streams the room's messages to the caller until they leave or the room ends.
pub async fn room_events(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let caller = caller_from(&user)?;
    let subscription = state.service.subscribe(&caller, &room_id).await?;
    info!(
        "Opened event stream for {} in room {}",
        subscription.participant_id(),
        subscription.room_id()
    );

    let events = subscription
        .into_stream()
        .map(|message| Event::default().event("message").json_data(message));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub async fn leave_room(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_from(&user)?;
    let left = state.service.leave(&caller, &room_id).await?;

    Ok(Json(json!({
        "room_id": room_id,
        "left": left
    })))
}

pub async fn room_members(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_from(&user)?;
    let members = state.service.members(&caller, &room_id).await?;

    Ok(Json(json!({
        "room_id": room_id,
        "members": members
    })))
}

#[axum::debug_handler]
pub async fn send_message(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<Persisted<ChatMessage>>, AppError> {
    let caller = caller_from(&user)?;
    Ok(Json(state.service.send(&caller, &room_id, &request.body).await?))
}

pub async fn message_history(
    State(state): State<Arc<ConsultationState>>,
    Path(room_id): Path<String>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let caller = caller_from(&user)?;
    let messages = state.service.messages(&caller, &room_id).await?;

    Ok(Json(json!({
        "room_id": room_id,
        "messages": messages,
        "total": messages.len()
    })))
}

// ==============================================================================
// ADMIN HANDLERS
// ==============================================================================

pub async fn run_admission(
    State(state): State<Arc<ConsultationState>>,
    Extension(user): Extension<User>,
) -> Result<Json<AdmissionResult>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let result = state.service.run_admission().await?;
    info!("Manual admission pass by {} admitted {}", user.id, result.admitted.len());

    Ok(Json(result))
}
