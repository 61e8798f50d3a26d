//! The scripted opening of a tutoring session.

use crate::{
    agent::TutorSession,
    catalog::WELCOME_LESSON,
    progress::Action,
    slide::SlideKind,
};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// A spoken line, mirrored to the room as an agent message.
    Say(String),
    /// Reset the session to the welcome lesson and show its title slide.
    StartWelcome,
    /// Show a slide of the given kind for the current topic.
    Slide(SlideKind),
}

/// A cue and how long to wait before performing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub delay: Duration,
    pub cue: Cue,
}

fn step(delay_ms: u64, cue: Cue) -> ScriptStep {
    ScriptStep {
        delay: Duration::from_millis(delay_ms),
        cue,
    }
}

pub fn welcome_script() -> Vec<ScriptStep> {
    vec![
        step(
            1000,
            Cue::Say(
                "Welcome to HCV Training! I'm your HCV learning assistant with visual slides. \
                 Let me start with our welcome lesson."
                    .into(),
            ),
        ),
        step(2000, Cue::StartWelcome),
        step(
            0,
            Cue::Say(
                "Let's begin with understanding what HCV is and why this program exists. HCV stands for \
                 Housing Choice Voucher, which is a federal program that helps low-income families afford \
                 decent, safe, and sanitary housing in the private market."
                    .into(),
            ),
        ),
        step(3000, Cue::Slide(SlideKind::Content)),
        step(
            0,
            Cue::Say(
                "The program was created to provide housing stability, reduce homelessness, and give families \
                 the freedom to choose where they want to live. As we go through each topic, I'll be showing \
                 you visual slides to help explain the concepts."
                    .into(),
            ),
        ),
    ]
}

/// Plays `script` against `session`, waiting out each step's delay first.
pub async fn run_script(session: TutorSession, script: Vec<ScriptStep>) {
    info!(room = %session.room(), steps = script.len(), "Starting scripted welcome");
    for ScriptStep { delay, cue } in script {
        if !delay.is_zero() {
            sleep(delay).await;
        }
        match cue {
            Cue::Say(line) => session.say(line),
            Cue::StartWelcome => {
                if let Err(e) = session
                    .apply(Action::StartLesson(Some(WELCOME_LESSON.to_string())))
                    .await
                {
                    warn!(error = %e, "Welcome lesson could not be started");
                }
            }
            Cue::Slide(kind) => {
                if let Err(e) = session
                    .apply(Action::GenerateSlide { kind, content: None })
                    .await
                {
                    warn!(error = %e, "Scripted slide skipped");
                }
            }
        }
    }
    info!(room = %session.room(), "Scripted welcome finished");
}
