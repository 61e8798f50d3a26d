//! Lesson Catalog
//!
//! The catalog is the immutable curriculum: an ordered list of lessons, each
//! with an ordered list of topics. It is built once at process start (either
//! the built-in HCV curriculum or a JSON file) and shared by reference.

use crate::topic::{Topic, TopicCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Key of the lesson every session starts in.
pub const WELCOME_LESSON: &str = "welcome";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Catalog contains no lessons")]
    Empty,
    #[error("Duplicate lesson key: '{0}'")]
    DuplicateKey(String),
    #[error("Lesson '{0}' has no topics")]
    NoTopics(String),
    #[error("Catalog is missing the 'welcome' lesson")]
    MissingWelcome,
}

/// A named unit of curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub key: String,
    pub title: String,
    pub description: String,
    pub topics: Vec<Topic>,
}

impl Lesson {
    /// The lesson substituted for an unknown key: no topics, key echoed as title.
    pub fn fallback(key: &str) -> Self {
        Self {
            key: key.to_string(),
            title: key.to_string(),
            description: String::new(),
            topics: Vec::new(),
        }
    }

    pub fn topic(&self, index: usize) -> Option<&Topic> {
        self.topics.get(index)
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    lessons: Vec<Lesson>,
}

impl Catalog {
    /// Builds a catalog and checks it is usable by a tutoring session.
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, CatalogError> {
        let catalog = Self { lessons };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file of the form `{"lessons": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.lessons.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for lesson in &self.lessons {
            if !seen.insert(lesson.key.as_str()) {
                return Err(CatalogError::DuplicateKey(lesson.key.clone()));
            }
            if lesson.topics.is_empty() {
                return Err(CatalogError::NoTopics(lesson.key.clone()));
            }
        }
        if !seen.contains(WELCOME_LESSON) {
            return Err(CatalogError::MissingWelcome);
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.key == key)
    }

    /// Looks up a lesson, substituting [`Lesson::fallback`] for unknown keys.
    pub fn get_or_fallback(&self, key: &str) -> Lesson {
        self.get(key)
            .cloned()
            .unwrap_or_else(|| Lesson::fallback(key))
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lessons.iter().map(|l| l.key.as_str())
    }

    /// The Housing Choice Voucher curriculum shipped with the tutor.
    pub fn builtin() -> Self {
        use TopicCategory::*;

        let lesson = |key: &str, title: &str, description: &str, topics: &[(&str, TopicCategory)]| {
            Lesson {
                key: key.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                topics: topics
                    .iter()
                    .map(|(name, category)| Topic::new(*name, *category))
                    .collect(),
            }
        };

        Self {
            lessons: vec![
                lesson(
                    WELCOME_LESSON,
                    "Welcome to HCV Training",
                    "Introduction to Housing Choice Voucher program",
                    &[
                        ("What is HCV and why it exists", General),
                        ("Who administers the program", General),
                        ("Basic program overview", General),
                    ],
                ),
                lesson(
                    "eligibility",
                    "HCV Eligibility Requirements",
                    "Understanding who qualifies for HCV assistance",
                    &[
                        ("Income limits and calculations", Income),
                        ("Family composition requirements", General),
                        ("Citizenship and immigration status", General),
                        ("Background check requirements", General),
                    ],
                ),
                lesson(
                    "application",
                    "Application Process",
                    "How to apply for HCV assistance",
                    &[
                        ("Finding your local PHA", Application),
                        ("Required documents", Application),
                        ("Waiting list process", Application),
                        ("Application timeline", Application),
                    ],
                ),
                lesson(
                    "income",
                    "Income and Asset Calculations",
                    "Understanding HCV income calculations",
                    &[
                        ("Annual income definition", Income),
                        ("Asset calculations", Income),
                        ("Income exclusions", Income),
                        ("Reporting requirements", General),
                    ],
                ),
                lesson(
                    "payment",
                    "Payment Standards and Rent",
                    "How HCV rent calculations work",
                    &[
                        ("Payment standards", Rent),
                        ("Utility allowances", Rent),
                        ("Rent calculation methods", Rent),
                        ("Minimum rent requirements", Rent),
                    ],
                ),
                lesson(
                    "voucher",
                    "Voucher Process",
                    "Using your HCV voucher",
                    &[
                        ("Voucher issuance", Voucher),
                        ("Housing search process", Voucher),
                        ("HQS inspections", Voucher),
                        ("Lease requirements", Voucher),
                    ],
                ),
                lesson(
                    "rights",
                    "Tenant Rights and Responsibilities",
                    "Understanding your HCV obligations",
                    &[
                        ("Tenant responsibilities", General),
                        ("Landlord obligations", General),
                        ("Program violations", General),
                        ("Appeal processes", General),
                    ],
                ),
            ],
        }
    }
}
