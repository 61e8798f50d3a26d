//! HCV Tutor Agent Service
//!
//! This module exposes the tutoring session to an external speech/intent layer
//! as MCP (Model Context Protocol) tools. Lesson tools drive the progress state
//! machine and forward any resulting slide to the web relay; the remaining
//! tools answer common HCV questions without touching session state.

use crate::{
    catalog::Catalog,
    housing,
    progress::{Action, ProgressError, ProgressState, transition},
    relay::SlideDispatcher,
    slide::{SlideKind, now_millis},
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

// --- Session ---

/// The lesson progress of one room, plus the channel its slides go out on.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct TutorSession {
    catalog: Arc<Catalog>,
    room: Arc<str>,
    progress: Arc<Mutex<ProgressState>>,
    dispatcher: SlideDispatcher,
}

impl TutorSession {
    /// Creates a session for `room`, starting in the welcome lesson.
    pub fn new(catalog: Arc<Catalog>, room: impl Into<Arc<str>>, dispatcher: SlideDispatcher) -> Self {
        Self {
            catalog,
            room: room.into(),
            progress: Arc::new(Mutex::new(ProgressState::default())),
            dispatcher,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn progress(&self) -> ProgressState {
        self.progress.lock().await.clone()
    }

    /// Runs one transition and dispatches its slide.
    ///
    /// The slide is queued while the progress lock is held, so slides reach
    /// the relay in the same order as the calls that produced them.
    pub async fn apply(&self, action: Action) -> Result<String, ProgressError> {
        let mut progress = self.progress.lock().await;
        let step = transition(&progress, &self.catalog, action, now_millis())?;
        *progress = step.state;
        if let Some(slide) = step.slide {
            info!(room = %self.room, kind = %slide.kind, title = %slide.title, "Emitting slide");
            self.dispatcher.slide(&self.room, slide);
        }
        Ok(step.reply)
    }

    /// Like [`apply`](Self::apply), but recoverable errors become the reply.
    pub async fn reply(&self, action: Action) -> String {
        self.apply(action).await.unwrap_or_else(|e| {
            warn!(room = %self.room, error = %e, "Lesson action rejected");
            e.to_string()
        })
    }

    /// Forwards a spoken line to the room's clients as an agent message.
    pub fn say(&self, line: impl Into<String>) {
        self.dispatcher.message(&self.room, line);
    }
}

// --- Data Structures for Tools ---

#[derive(Deserialize, JsonSchema, Debug)]
pub struct StartLessonArgs {
    #[schemars(
        description = "The lesson to start (welcome, eligibility, application, income, payment, voucher, rights), or omit for the lesson plan overview"
    )]
    pub lesson: Option<String>,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct GenerateSlideArgs {
    #[schemars(description = "Type of slide: title, content, chart, or process")]
    pub slide_type: String,
    #[schemars(description = "Custom body lines for the slide")]
    pub custom_content: Option<Vec<String>>,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct CheckEligibilityArgs {
    #[schemars(description = "Number of people in the family")]
    pub family_size: u32,
    #[schemars(description = "Total annual household income in dollars")]
    pub annual_income: f64,
    #[schemars(description = "City or state, for area-specific income limits")]
    pub location: Option<String>,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct CalculateRentArgs {
    #[schemars(description = "Monthly adjusted income (after deductions)")]
    pub adjusted_income: f64,
    #[schemars(description = "Total monthly rent for the unit")]
    pub total_rent: f64,
    #[schemars(description = "Local payment standard")]
    pub payment_standard: Option<f64>,
}

#[derive(Deserialize, JsonSchema, Debug)]
pub struct ExplainTermArgs {
    #[schemars(description = "The HCV term or concept to explain")]
    pub term: String,
}

// --- Service and Handler Implementation ---

/// MCP service wrapping a [`TutorSession`].
pub struct TutorService {
    pub session: TutorSession,
    tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for TutorService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "HCV training assistant. Use the lesson tools to guide the learner through the \
                 curriculum; every topic change shows a slide in the learner's browser."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[tool_router]
impl TutorService {
    pub fn new(session: TutorSession) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Start a specific HCV lesson, or show the lesson plan overview when no lesson is given.")]
    pub async fn start_lesson(&self, args: Parameters<StartLessonArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'start_lesson'");
        Ok(self.session.reply(Action::StartLesson(args.0.lesson)).await)
    }

    #[tool(description = "Move to the next topic in the current lesson.")]
    pub async fn next_topic(&self) -> Result<String, String> {
        info!("Executing tool 'next_topic'");
        Ok(self.session.reply(Action::NextTopic).await)
    }

    #[tool(description = "Get information about the current lesson and progress.")]
    pub async fn get_current_lesson(&self) -> Result<String, String> {
        info!("Executing tool 'get_current_lesson'");
        Ok(self.session.reply(Action::Status).await)
    }

    /// Unrecognised slide types fall back to a content slide.
    #[tool(description = "Generate a visual slide for the current topic.")]
    pub async fn generate_slide(&self, args: Parameters<GenerateSlideArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'generate_slide'");
        let kind = args.0.slide_type.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to a content slide");
            SlideKind::Content
        });
        Ok(self
            .session
            .reply(Action::GenerateSlide {
                kind,
                content: args.0.custom_content,
            })
            .await)
    }

    #[tool(description = "Check if a family might be eligible for HCV assistance based on their income and family size.")]
    pub async fn check_eligibility(&self, args: Parameters<CheckEligibilityArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'check_eligibility'");
        let args = args.0;
        if args.annual_income < 0.0 {
            return Err("Annual income must not be negative.".to_string());
        }
        Ok(housing::check_eligibility(
            args.family_size,
            args.annual_income,
            args.location.as_deref(),
        ))
    }

    #[tool(description = "Calculate how much rent a family would pay with HCV assistance.")]
    pub async fn calculate_rent(&self, args: Parameters<CalculateRentArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'calculate_rent'");
        let args = args.0;
        if args.adjusted_income < 0.0 || args.total_rent < 0.0 {
            return Err("Income and rent must not be negative.".to_string());
        }
        Ok(housing::calculate_rent(
            args.adjusted_income,
            args.total_rent,
            args.payment_standard,
        ))
    }

    #[tool(description = "Explain HCV-related terms and concepts to help users understand the program better.")]
    pub async fn explain_term(&self, args: Parameters<ExplainTermArgs>) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'explain_term'");
        Ok(housing::explain_term(&args.0.term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{RelayEvent, testing::RecordingRelay};

    async fn service() -> (TutorService, Arc<RecordingRelay>, tokio::task::JoinHandle<()>) {
        let relay = Arc::new(RecordingRelay::default());
        let (dispatcher, handle) = SlideDispatcher::spawn(relay.clone());
        let session = TutorSession::new(Arc::new(Catalog::builtin()), "room-1", dispatcher);
        (TutorService::new(session), relay, handle)
    }

    async fn delivered(service: TutorService, relay: &RecordingRelay, handle: tokio::task::JoinHandle<()>) -> Vec<RelayEvent> {
        drop(service);
        handle.await.unwrap();
        relay.events.lock().await.clone()
    }

    fn start(lesson: Option<&str>) -> Parameters<StartLessonArgs> {
        Parameters(StartLessonArgs {
            lesson: lesson.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn lesson_tools_emit_slides_in_call_order() {
        let (service, relay, handle) = service().await;

        let reply = service.start_lesson(start(Some("eligibility"))).await.unwrap();
        assert!(reply.starts_with("Starting Lesson: HCV Eligibility Requirements"));
        for _ in 0..4 {
            service.next_topic().await.unwrap();
        }
        assert_eq!(service.session.progress().await.topic_index, 3);

        let titles: Vec<String> = delivered(service, &relay, handle)
            .await
            .into_iter()
            .map(|e| match e {
                RelayEvent::Slide { room, slide } => {
                    assert_eq!(room, "room-1");
                    slide.title
                }
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(
            titles,
            vec![
                "HCV Eligibility Requirements",
                "Family composition requirements",
                "Citizenship and immigration status",
                "Background check requirements",
                "Lesson Complete",
            ]
        );
    }

    #[tokio::test]
    async fn overview_and_unknown_lesson_emit_nothing() {
        let (service, relay, handle) = service().await;

        let overview = service.start_lesson(start(None)).await.unwrap();
        assert!(overview.contains("Here's your complete lesson plan"));

        let unknown = service.start_lesson(start(Some("nonexistent"))).await.unwrap();
        assert!(unknown.contains("welcome, eligibility, application, income, payment, voucher, rights"));

        let status = service.get_current_lesson().await.unwrap();
        assert!(status.starts_with("Current Lesson: Welcome to HCV Training"));

        assert!(delivered(service, &relay, handle).await.is_empty());
    }

    #[tokio::test]
    async fn generate_slide_falls_back_to_content() {
        let (service, relay, handle) = service().await;

        service
            .generate_slide(Parameters(GenerateSlideArgs {
                slide_type: "hologram".to_string(),
                custom_content: Some(vec!["Custom".to_string()]),
            }))
            .await
            .unwrap();

        let events = delivered(service, &relay, handle).await;
        match &events[..] {
            [RelayEvent::Slide { slide, .. }] => {
                assert_eq!(slide.kind, SlideKind::Content);
                assert_eq!(slide.content, vec!["Custom"]);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[tokio::test]
    async fn query_tools_do_not_touch_progress() {
        let (service, relay, handle) = service().await;

        let rent = service
            .calculate_rent(Parameters(CalculateRentArgs {
                adjusted_income: 1000.0,
                total_rent: 1200.0,
                payment_standard: None,
            }))
            .await
            .unwrap();
        assert!(rent.contains("$300.00") && rent.contains("$900.00"));

        assert!(service
            .calculate_rent(Parameters(CalculateRentArgs {
                adjusted_income: -1.0,
                total_rent: 1200.0,
                payment_standard: None,
            }))
            .await
            .is_err());

        let term = service
            .explain_term(Parameters(ExplainTermArgs { term: "PHA".into() }))
            .await
            .unwrap();
        assert!(term.starts_with("Public Housing Authority"));

        let eligibility = service
            .check_eligibility(Parameters(CheckEligibilityArgs {
                family_size: 2,
                annual_income: 30_000.0,
                location: None,
            }))
            .await
            .unwrap();
        assert!(eligibility.contains("you may be eligible"));

        assert!(service
            .check_eligibility(Parameters(CheckEligibilityArgs {
                family_size: 2,
                annual_income: -100.0,
                location: None,
            }))
            .await
            .is_err());

        assert_eq!(service.session.progress().await, ProgressState::default());
        assert!(delivered(service, &relay, handle).await.is_empty());
    }
}
