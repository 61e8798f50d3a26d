use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tags a topic with the kind of visual aid it gets on chart and process slides.
///
/// Categories are assigned when the catalog is defined, so slide selection is
/// an exhaustive match instead of a search through topic prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    /// Income limits and income calculations.
    Income,
    /// Payment standards and rent share.
    Rent,
    /// Applying to a public housing agency.
    Application,
    /// Voucher issuance through lease signing.
    Voucher,
    #[default]
    General,
}

impl TopicCategory {
    /// Infers a category from a topic name using case-insensitive keywords.
    ///
    /// Only used when a catalog is loaded from a file that gives topics as
    /// bare strings; the built-in catalog tags every topic explicitly.
    pub fn infer(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("income") || name.contains("eligibility") {
            Self::Income
        } else if name.contains("payment") || name.contains("rent") {
            Self::Rent
        } else if name.contains("application") {
            Self::Application
        } else if name.contains("voucher") || name.contains("housing search") {
            Self::Voucher
        } else {
            Self::General
        }
    }
}

/// A single teachable point inside a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Topic {
    pub name: String,
    pub category: TopicCategory,
}

impl Topic {
    pub fn new(name: impl Into<String>, category: TopicCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicRepr {
    Name(String),
    Tagged {
        name: String,
        category: Option<TopicCategory>,
    },
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match TopicRepr::deserialize(deserializer)? {
            TopicRepr::Name(name) => {
                let category = TopicCategory::infer(&name);
                Topic { name, category }
            }
            TopicRepr::Tagged { name, category } => {
                let category = category.unwrap_or_else(|| TopicCategory::infer(&name));
                Topic { name, category }
            }
        })
    }
}
