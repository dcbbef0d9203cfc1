//! Notification payloads returned by the CRM notification endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Represents one notification row, including its raw category tag and the prospect it points at.
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(default)]
    pub related_entity: Option<RelatedEntity>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(from = "String")]
pub enum Priority {
    Critica,
    Alta,
    Media,
    #[default]
    Normal,
}

impl Priority {
    /// Parses the wire tag; anything unrecognized lands on `Normal`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "critica" => Priority::Critica,
            "alta" => Priority::Alta,
            "media" => Priority::Media,
            _ => Priority::Normal,
        }
    }

    /// True for the two levels that warrant a toast and the critical display band.
    pub fn is_high(&self) -> bool {
        matches!(self, Priority::Critica | Priority::Alta)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critica => "Crítica",
            Priority::Alta => "Alta",
            Priority::Media => "Media",
            Priority::Normal => "Normal",
        }
    }
}

impl From<String> for Priority {
    fn from(tag: String) -> Self {
        Priority::from_tag(&tag)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntity {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
}
