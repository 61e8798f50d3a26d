//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the relay, including the
//! REST API, the WebSocket endpoint, OpenAPI documentation and static files.

use crate::{
    handlers,
    models::{
        AgentMessagePayload, ErrorResponse, HealthResponse, LessonView, SlideUpdatePayload,
        SuccessResponse,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_lessons,
        handlers::get_lesson,
        handlers::get_slide,
        handlers::agent_slide_update,
        handlers::agent_message,
        handlers::health,
    ),
    components(
        schemas(LessonView, SlideUpdatePayload, AgentMessagePayload, SuccessResponse, HealthResponse, ErrorResponse)
    ),
    tags(
        (name = "HCV Relay", description = "Lesson catalog and slide relay for the HCV tutor")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let static_dir = app_state.config.static_dir.clone();

    let api_router = Router::new()
        .route("/api/lessons", get(handlers::list_lessons))
        .route("/api/lesson/{key}", get(handlers::get_lesson))
        .route("/api/slide/{lesson}/{kind}", get(handlers::get_slide))
        .route("/api/agent/slide-update", post(handlers::agent_slide_update))
        .route("/api/agent/message", post(handlers::agent_message))
        .route("/api/health", get(handlers::health))
        .route("/ws", get(ws_handler))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .fallback_service(ServeDir::new(static_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, rooms::ConnectionId, ws::protocol::ServerMessage};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use hcv_tutor_core::catalog::Catalog;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(Catalog::builtin(), Config::default()));
        (create_router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn lists_lessons_in_catalog_order() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/api/lessons").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let keys: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["key"].as_str().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec!["welcome", "eligibility", "application", "income", "payment", "voucher", "rights"]
        );
    }

    #[tokio::test]
    async fn unknown_lesson_echoes_key() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/api/lesson/mystery").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["title"], "mystery");
        assert_eq!(body["topics"], json!([]));
    }

    #[tokio::test]
    async fn resolves_slides_and_rejects_unknown_kinds() {
        let (app, _) = app();
        let response = app
            .clone()
            .oneshot(
                Request::get("/api/slide/voucher/process?topic=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["type"], "process");
        assert_eq!(body["title"], "Housing search process - Process Flow");
        assert_eq!(body["processSteps"][4], "Sign Lease");

        let response = app
            .oneshot(Request::get("/api/slide/voucher/hologram").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn agent_slide_update_reaches_room_members() {
        let (app, state) = app();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let member: ConnectionId = uuid::Uuid::new_v4();
        state.rooms.join(member, "room-1".into(), tx).await;

        let response = app
            .oneshot(post_json(
                "/api/agent/slide-update",
                json!({
                    "roomName": "room-1",
                    "slideData": {"type": "content", "title": "Payment standards", "content": ["a", "b"], "timestamp": 1}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"success": true}));

        match rx.try_recv().unwrap() {
            ServerMessage::SlideUpdate {
                kind, slide_data, ..
            } => {
                assert_eq!(kind, "agent-slide");
                assert_eq!(slide_data.title, "Payment standards");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test]
    async fn agent_message_defaults_type_and_tolerates_empty_rooms() {
        let (app, state) = app();
        let (tx, mut rx) = mpsc::unbounded_channel();
        state.rooms.join(uuid::Uuid::new_v4(), "room-1".into(), tx).await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/agent/message",
                json!({"roomName": "room-1", "message": "Hello learners"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        match rx.try_recv().unwrap() {
            ServerMessage::AgentMessage { kind, message, .. } => {
                assert_eq!(kind, "agent-speech");
                assert_eq!(message, "Hello learners");
            }
            other => panic!("unexpected message {other:?}"),
        }

        let response = app
            .oneshot(post_json(
                "/api/agent/message",
                json!({"roomName": "empty-room", "message": "anyone?", "type": "quiz"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_connection_count() {
        let (app, state) = app();
        let (tx, _rx) = mpsc::unbounded_channel();
        state.rooms.join(uuid::Uuid::new_v4(), "room".into(), tx).await;

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({"status": "ok", "connections": 1}));
    }

    #[test]
    fn openapi_document_lists_agent_endpoints() {
        let doc = ApiDoc::openapi().to_json().unwrap();
        assert!(doc.contains("/api/agent/slide-update"));
        assert!(doc.contains("/api/slide/{lesson}/{kind}"));
    }
}
