//! Slide Content Resolver
//!
//! Turns a position in the curriculum into a renderable [`SlideEvent`]. All
//! functions here are pure: the emission timestamp is an input, and any topic
//! without dedicated content degrades to generic placeholder content.

use crate::catalog::Lesson;
use crate::topic::TopicCategory;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Title,
    Content,
    Chart,
    Process,
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlideKind::Title => write!(f, "title"),
            SlideKind::Content => write!(f, "content"),
            SlideKind::Chart => write!(f, "chart"),
            SlideKind::Process => write!(f, "process"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown slide type '{0}'. Expected one of: title, content, chart, process")]
pub struct UnknownSlideKind(pub String);

impl FromStr for SlideKind {
    type Err = UnknownSlideKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SlideKind::Title),
            "content" => Ok(SlideKind::Content),
            "chart" => Ok(SlideKind::Chart),
            "process" => Ok(SlideKind::Process),
            _ => Err(UnknownSlideKind(s.to_string())),
        }
    }
}

/// One labelled bar of a chart slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl ChartPoint {
    fn new(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// A structured, renderable description of one visual aid.
///
/// Field names on the wire match what the browser client renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideEvent {
    #[serde(rename = "type")]
    pub kind: SlideKind,
    pub title: String,
    pub content: Vec<String>,
    #[serde(rename = "chartData", default, skip_serializing_if = "Option::is_none")]
    pub chart_series: Option<Vec<ChartPoint>>,
    #[serde(rename = "processSteps", default, skip_serializing_if = "Option::is_none")]
    pub process_steps: Option<Vec<String>>,
    #[serde(rename = "timestamp")]
    pub emitted_at: i64,
}

/// Current wall-clock time in epoch milliseconds, used to stamp slides.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Builds the slide for `kind` at `topic_index` within `lesson`.
///
/// `override_content` replaces the body lines of content, chart and process
/// slides; title slides always describe the lesson position.
pub fn resolve_slide(
    kind: SlideKind,
    lesson: &Lesson,
    topic_index: usize,
    override_content: Option<Vec<String>>,
    emitted_at: i64,
) -> SlideEvent {
    let (topic, category) = match lesson.topic(topic_index) {
        Some(t) => (t.name.as_str(), t.category),
        None => (lesson.title.as_str(), TopicCategory::General),
    };

    match kind {
        SlideKind::Title => SlideEvent {
            kind,
            title: lesson.title.clone(),
            content: vec![
                lesson.description.clone(),
                format!("Topic {} of {}", topic_index + 1, lesson.topics.len()),
                topic.to_string(),
            ],
            chart_series: None,
            process_steps: None,
            emitted_at,
        },
        SlideKind::Content => SlideEvent {
            kind,
            title: topic.to_string(),
            content: override_content.unwrap_or_else(|| topic_content(topic)),
            chart_series: None,
            process_steps: None,
            emitted_at,
        },
        SlideKind::Chart => SlideEvent {
            kind,
            title: format!("{topic} - Data Visualization"),
            content: override_content
                .unwrap_or_else(|| vec![format!("Visual representation of {topic}")]),
            chart_series: Some(chart_series(category)),
            process_steps: None,
            emitted_at,
        },
        SlideKind::Process => SlideEvent {
            kind,
            title: format!("{topic} - Process Flow"),
            content: override_content
                .unwrap_or_else(|| vec![format!("Step-by-step process for {topic}")]),
            chart_series: None,
            process_steps: Some(process_steps(category)),
            emitted_at,
        },
    }
}

/// The content slide shown once a lesson's last topic has been passed.
pub fn completion_slide(lesson: &Lesson, emitted_at: i64) -> SlideEvent {
    SlideEvent {
        kind: SlideKind::Content,
        title: "Lesson Complete".to_string(),
        content: vec![
            format!(
                "Congratulations! You've completed the {} lesson.",
                lesson.title
            ),
            format!("Topics covered: {}", lesson.topics.len()),
            "Would you like to start a new lesson or review any topics?".to_string(),
        ],
        chart_series: None,
        process_steps: None,
        emitted_at,
    }
}

/// Body lines for a content slide. Matches topic names exactly.
fn topic_content(topic: &str) -> Vec<String> {
    let lines: &[&str] = match topic {
        "What is HCV and why it exists" => &[
            "Federal housing assistance program",
            "Helps low-income families afford housing",
            "Provides housing stability",
            "Reduces homelessness",
        ],
        "Income limits and calculations" => &[
            "Based on Area Median Income (AMI)",
            "Typically 80% of AMI for eligibility",
            "Varies by family size and location",
            "Updated annually by HUD",
        ],
        "Family composition requirements" => &[
            "At least one family member must be elderly, disabled, or have children",
            "All household members must be listed",
            "Income of all members counts toward eligibility",
            "Changes in family size affect assistance",
        ],
        "Application process" => &[
            "Contact local Public Housing Agency (PHA)",
            "Complete application with required documents",
            "Join waiting list if eligible",
            "Wait for voucher availability",
        ],
        _ => &[
            "Detailed information about this topic",
            "Key concepts and requirements",
            "Important considerations",
            "Next steps and actions",
        ],
    };
    lines.iter().map(|l| l.to_string()).collect()
}

fn chart_series(category: TopicCategory) -> Vec<ChartPoint> {
    match category {
        TopicCategory::Income => vec![
            ChartPoint::new("Family of 1", 35000.0),
            ChartPoint::new("Family of 2", 40000.0),
            ChartPoint::new("Family of 3", 45000.0),
            ChartPoint::new("Family of 4", 50000.0),
        ],
        TopicCategory::Rent => vec![
            ChartPoint::new("Tenant Portion", 30.0),
            ChartPoint::new("HCV Assistance", 70.0),
            ChartPoint::new("Total Rent", 100.0),
        ],
        TopicCategory::Application | TopicCategory::Voucher | TopicCategory::General => vec![
            ChartPoint::new("Category A", 40.0),
            ChartPoint::new("Category B", 35.0),
            ChartPoint::new("Category C", 25.0),
        ],
    }
}

fn process_steps(category: TopicCategory) -> Vec<String> {
    let steps: &[&str] = match category {
        TopicCategory::Application => &[
            "Contact PHA",
            "Submit Application",
            "Provide Documents",
            "Join Waiting List",
            "Receive Voucher",
        ],
        TopicCategory::Voucher => &[
            "Receive Voucher",
            "Find Housing",
            "Landlord Approval",
            "HQS Inspection",
            "Sign Lease",
        ],
        TopicCategory::Income | TopicCategory::Rent | TopicCategory::General => {
            &["Step 1", "Step 2", "Step 3", "Step 4"]
        }
    };
    steps.iter().map(|s| s.to_string()).collect()
}
