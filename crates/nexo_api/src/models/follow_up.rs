//! Follow-up records and the advisor dashboard payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Represents one scheduled follow-up against a prospect.
pub struct FollowUp {
    pub id: String,
    #[serde(default)]
    pub prospect_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "type", default)]
    pub channel: ContactChannel,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(from = "String")]
pub enum ContactChannel {
    Call,
    WhatsApp,
    Email,
    InPerson,
    Messenger,
    Facebook,
    TikTok,
    #[default]
    Other,
}

impl ContactChannel {
    /// Parses the wire tag; anything unrecognized lands on `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "llamada" => ContactChannel::Call,
            "whatsapp" => ContactChannel::WhatsApp,
            "email" | "correo" => ContactChannel::Email,
            "presencial" | "visita" => ContactChannel::InPerson,
            "messenger" => ContactChannel::Messenger,
            "facebook" => ContactChannel::Facebook,
            "tiktok" => ContactChannel::TikTok,
            _ => ContactChannel::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactChannel::Call => "Llamada",
            ContactChannel::WhatsApp => "WhatsApp",
            ContactChannel::Email => "Email",
            ContactChannel::InPerson => "Visita",
            ContactChannel::Messenger => "Messenger",
            ContactChannel::Facebook => "Facebook",
            ContactChannel::TikTok => "TikTok",
            ContactChannel::Other => "Otro",
        }
    }
}

impl From<String> for ContactChannel {
    fn from(tag: String) -> Self {
        ContactChannel::from_tag(&tag)
    }
}

/// Body of a follow-up mutation, either completion or postponement.
#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
pub enum FollowUpPatch {
    #[serde(rename_all = "camelCase")]
    Complete {
        completed: bool,
        completed_at: DateTime<Utc>,
        result: String,
    },
    #[serde(rename_all = "camelCase")]
    Postpone {
        new_scheduled_at: DateTime<Utc>,
        reason: String,
    },
}

impl FollowUpPatch {
    pub fn complete(result: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        FollowUpPatch::Complete {
            completed: true,
            completed_at,
            result: result.into(),
        }
    }

    pub fn postpone(new_scheduled_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        FollowUpPatch::Postpone {
            new_scheduled_at,
            reason: reason.into(),
        }
    }
}

/// Everything the advisor dashboard endpoint returns in one payload.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpDashboard {
    #[serde(default)]
    pub upcoming: Vec<FollowUp>,
    #[serde(default)]
    pub overdue: Vec<FollowUp>,
    #[serde(default)]
    pub today: Vec<FollowUp>,
    #[serde(default)]
    pub metrics: DashboardMetrics,
    #[serde(default)]
    pub counts: DashboardCounts,
    #[serde(default)]
    pub system_info: Option<SystemInfo>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[serde(default)]
    pub completed_today: u32,
    #[serde(default)]
    pub completed_week: u32,
    #[serde(default)]
    pub effectiveness: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    #[serde(default)]
    pub upcoming: u32,
    #[serde(default)]
    pub overdue: u32,
    #[serde(default)]
    pub today: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    #[serde(default)]
    pub server_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Result of the server-side sweep over due follow-ups.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOutcome {
    #[serde(default)]
    pub processed: u32,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProcessOutcome {
    /// True when the sweep found nothing to touch.
    pub fn is_noop(&self) -> bool {
        self.processed == 0
    }
}
