//! API Models
//!
//! Request and response bodies of the REST API, annotated for OpenAPI
//! generation with `utoipa`.

use hcv_tutor_core::{catalog::Lesson, slide::SlideEvent};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Message type used when the agent does not name one.
pub const DEFAULT_MESSAGE_TYPE: &str = "agent-speech";

/// A lesson as the browser sees it: topics are plain names.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LessonView {
    #[schema(example = "eligibility")]
    pub key: String,
    #[schema(example = "HCV Eligibility Requirements")]
    pub title: String,
    pub description: String,
    pub topics: Vec<String>,
}

impl From<&Lesson> for LessonView {
    fn from(lesson: &Lesson) -> Self {
        Self {
            key: lesson.key.clone(),
            title: lesson.title.clone(),
            description: lesson.description.clone(),
            topics: lesson.topic_names().map(str::to_string).collect(),
        }
    }
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SlideUpdatePayload {
    #[schema(example = "hcv-training-room")]
    pub room_name: String,
    #[schema(value_type = Object)]
    pub slide_data: SlideEvent,
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessagePayload {
    #[schema(example = "hcv-training-room")]
    pub room_name: String,
    pub message: String,
    /// Defaults to `agent-speech`.
    #[serde(rename = "type")]
    #[schema(example = "agent-speech")]
    pub kind: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
pub struct SlideQuery {
    /// Zero-based topic index within the lesson.
    pub topic: Option<usize>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub connections: usize,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
