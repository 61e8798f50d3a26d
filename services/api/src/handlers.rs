//! Axum Handlers for the REST API
//!
//! Read-only catalog and slide queries for the browser, and the push endpoints
//! the tutor agent uses to publish into a room. It uses `utoipa` doc comments
//! to generate OpenAPI documentation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use hcv_tutor_core::slide::{SlideEvent, SlideKind, UnknownSlideKind, now_millis, resolve_slide};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    models::{
        AgentMessagePayload, DEFAULT_MESSAGE_TYPE, ErrorResponse, HealthResponse, LessonView,
        SlideQuery, SlideUpdatePayload, SuccessResponse,
    },
    state::AppState,
    ws::protocol::{AGENT_SLIDE, ServerMessage},
};

pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                warn!(%message, "Rejected request");
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

impl From<UnknownSlideKind> for ApiError {
    fn from(err: UnknownSlideKind) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// List every lesson in catalog order.
#[utoipa::path(
    get,
    path = "/api/lessons",
    responses(
        (status = 200, description = "All lessons", body = [LessonView])
    )
)]
pub async fn list_lessons(State(state): State<Arc<AppState>>) -> Json<Vec<LessonView>> {
    Json(state.catalog.lessons().iter().map(LessonView::from).collect())
}

/// Get one lesson. Unknown keys return an empty lesson titled with the key.
#[utoipa::path(
    get,
    path = "/api/lesson/{key}",
    responses(
        (status = 200, description = "Lesson details", body = LessonView)
    ),
    params(
        ("key" = String, Path, description = "Lesson key")
    )
)]
pub async fn get_lesson(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<LessonView> {
    Json(LessonView::from(&state.catalog.get_or_fallback(&key)))
}

/// Resolve a slide for a lesson topic without touching any session.
#[utoipa::path(
    get,
    path = "/api/slide/{lesson}/{kind}",
    responses(
        (status = 200, description = "Resolved slide"),
        (status = 400, description = "Unknown slide type", body = ErrorResponse)
    ),
    params(
        ("lesson" = String, Path, description = "Lesson key"),
        ("kind" = String, Path, description = "title, content, chart or process"),
        SlideQuery
    )
)]
pub async fn get_slide(
    State(state): State<Arc<AppState>>,
    Path((lesson, kind)): Path<(String, String)>,
    Query(query): Query<SlideQuery>,
) -> Result<Json<SlideEvent>, ApiError> {
    let kind: SlideKind = kind.parse()?;
    let lesson = state.catalog.get_or_fallback(&lesson);
    Ok(Json(resolve_slide(
        kind,
        &lesson,
        query.topic.unwrap_or(0),
        None,
        now_millis(),
    )))
}

/// Publish a slide from the tutor agent to every client in a room.
#[utoipa::path(
    post,
    path = "/api/agent/slide-update",
    request_body = SlideUpdatePayload,
    responses(
        (status = 200, description = "Slide published", body = SuccessResponse)
    )
)]
pub async fn agent_slide_update(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SlideUpdatePayload>,
) -> Json<SuccessResponse> {
    let title = payload.slide_data.title.clone();
    let delivered = state
        .rooms
        .publish(
            &payload.room_name,
            ServerMessage::slide_update(AGENT_SLIDE, payload.slide_data),
        )
        .await;
    info!(room = %payload.room_name, %title, delivered, "Agent slide published");
    Json(SuccessResponse { success: true })
}

/// Publish a message from the tutor agent to every client in a room.
#[utoipa::path(
    post,
    path = "/api/agent/message",
    request_body = AgentMessagePayload,
    responses(
        (status = 200, description = "Message published", body = SuccessResponse)
    )
)]
pub async fn agent_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AgentMessagePayload>,
) -> Json<SuccessResponse> {
    let kind = payload.kind.as_deref().unwrap_or(DEFAULT_MESSAGE_TYPE);
    let delivered = state
        .rooms
        .publish(
            &payload.room_name,
            ServerMessage::agent_message(kind, payload.message),
        )
        .await;
    info!(room = %payload.room_name, kind, delivered, "Agent message published");
    Json(SuccessResponse { success: true })
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Relay is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        connections: state.rooms.connection_count().await,
    })
}
