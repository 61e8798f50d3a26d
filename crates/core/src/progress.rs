//! Lesson Progress State Machine
//!
//! Progress through the catalog is modelled as a pure transition function:
//! given the current [`ProgressState`] and an [`Action`], [`transition`]
//! returns the next state, the reply for the learner, and at most one slide to
//! emit. Performing the emission is left to the caller.

use crate::catalog::{Catalog, Lesson, WELCOME_LESSON};
use crate::slide::{SlideEvent, SlideKind, completion_slide, resolve_slide};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Recoverable conditions. Their display text is meant for the learner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("I don't have a lesson called \"{requested}\". Available lessons are: {}", .available.join(", "))]
    UnknownLesson {
        requested: String,
        available: Vec<String>,
    },
    #[error("No lesson is currently active. Use startLesson to begin a lesson first.")]
    NoActiveLesson,
}

/// Where a tutoring session is in the curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub lesson_key: Option<String>,
    pub topic_index: usize,
}

impl Default for ProgressState {
    /// Sessions begin in the welcome lesson at its first topic.
    fn default() -> Self {
        Self {
            lesson_key: Some(WELCOME_LESSON.to_string()),
            topic_index: 0,
        }
    }
}

impl ProgressState {
    /// A state with no lesson selected.
    pub fn inactive() -> Self {
        Self {
            lesson_key: None,
            topic_index: 0,
        }
    }

    /// Resolves the current lesson, if any, against the catalog.
    pub fn lesson<'a>(&self, catalog: &'a Catalog) -> Option<&'a Lesson> {
        self.lesson_key.as_deref().and_then(|key| catalog.get(key))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start a lesson by key, or list all lessons when no key is given.
    StartLesson(Option<String>),
    NextTopic,
    Status,
    GenerateSlide {
        kind: SlideKind,
        content: Option<Vec<String>>,
    },
}

/// The outcome of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: ProgressState,
    pub reply: String,
    pub slide: Option<SlideEvent>,
}

pub fn transition(
    state: &ProgressState,
    catalog: &Catalog,
    action: Action,
    emitted_at: i64,
) -> Result<Step, ProgressError> {
    match action {
        // A blank key is treated like no key at all.
        Action::StartLesson(Some(requested)) if requested.trim().is_empty() => Ok(Step {
            state: state.clone(),
            reply: overview(catalog),
            slide: None,
        }),
        Action::StartLesson(None) => Ok(Step {
            state: state.clone(),
            reply: overview(catalog),
            slide: None,
        }),
        Action::StartLesson(Some(requested)) => start_lesson(catalog, &requested, emitted_at),
        Action::NextTopic => {
            let lesson = state.lesson(catalog).ok_or(ProgressError::NoActiveLesson)?;
            Ok(next_topic(state, lesson, emitted_at))
        }
        Action::Status => {
            let lesson = state.lesson(catalog).ok_or(ProgressError::NoActiveLesson)?;
            Ok(Step {
                state: state.clone(),
                reply: status(state, lesson),
                slide: None,
            })
        }
        Action::GenerateSlide { kind, content } => {
            let lesson = state.lesson(catalog).ok_or(ProgressError::NoActiveLesson)?;
            let slide = resolve_slide(kind, lesson, state.topic_index, content, emitted_at);
            let topic = lesson
                .topic(state.topic_index)
                .map(|t| t.name.as_str())
                .unwrap_or(lesson.title.as_str());
            Ok(Step {
                state: state.clone(),
                reply: format!("[Visual slide generated and displayed for: {topic}]"),
                slide: Some(slide),
            })
        }
    }
}

fn overview(catalog: &Catalog) -> String {
    let mut out = String::from("Welcome to HCV Training! Here's your complete lesson plan:\n\n");
    for (i, lesson) in catalog.lessons().iter().enumerate() {
        let topics = lesson.topic_names().collect::<Vec<_>>().join(", ");
        let _ = write!(
            out,
            "{}. {} ({})\n   {}\n   Topics: {}\n\n",
            i + 1,
            lesson.title,
            lesson.key,
            lesson.description,
            topics
        );
    }
    out.push_str("Which lesson would you like to start with? Just say the lesson name!");
    out
}

fn start_lesson(catalog: &Catalog, requested: &str, emitted_at: i64) -> Result<Step, ProgressError> {
    let key = requested.trim().to_lowercase();
    let lesson = catalog
        .get(&key)
        .ok_or_else(|| ProgressError::UnknownLesson {
            requested: requested.to_string(),
            available: catalog.keys().map(str::to_string).collect(),
        })?;

    let mut reply = format!(
        "Starting Lesson: {}\n\n{}\n\nWe'll cover these topics:\n",
        lesson.title, lesson.description
    );
    for (i, topic) in lesson.topic_names().enumerate() {
        let _ = writeln!(reply, "{}. {}", i + 1, topic);
    }
    if let Some(first) = lesson.topic(0) {
        let _ = write!(reply, "\nLet's begin with the first topic: {}", first.name);
    }

    Ok(Step {
        state: ProgressState {
            lesson_key: Some(lesson.key.clone()),
            topic_index: 0,
        },
        reply,
        slide: Some(resolve_slide(SlideKind::Title, lesson, 0, None, emitted_at)),
    })
}

fn next_topic(state: &ProgressState, lesson: &Lesson, emitted_at: i64) -> Step {
    let last = lesson.topics.len().saturating_sub(1);
    let next = state.topic_index + 1;

    if next > last {
        return Step {
            state: ProgressState {
                lesson_key: state.lesson_key.clone(),
                topic_index: last,
            },
            reply: format!(
                "We've completed all topics in the {} lesson! Would you like to start a new lesson or review any topics?",
                lesson.title
            ),
            slide: Some(completion_slide(lesson, emitted_at)),
        };
    }

    let topic = &lesson.topics[next].name;
    Step {
        state: ProgressState {
            lesson_key: state.lesson_key.clone(),
            topic_index: next,
        },
        reply: format!(
            "Moving to topic {}: {}\n\nLet me explain this topic in detail...",
            next + 1,
            topic
        ),
        slide: Some(resolve_slide(SlideKind::Content, lesson, next, None, emitted_at)),
    }
}

fn status(state: &ProgressState, lesson: &Lesson) -> String {
    let total = lesson.topics.len();
    let position = state.topic_index + 1;
    let topic = lesson
        .topic(state.topic_index)
        .map(|t| t.name.as_str())
        .unwrap_or_default();
    let percent = if total == 0 {
        0
    } else {
        (100.0 * position as f64 / total as f64).round() as u32
    };
    format!(
        "Current Lesson: {}\nTopic {} of {}: {}\n\nProgress: {}% complete",
        lesson.title, position, total, topic, percent
    )
}
