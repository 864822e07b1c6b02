use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Receiver id used by the admin broadcast action. A broadcast is stored
/// as a single row addressed to this sentinel and is not fanned out.
pub const BROADCAST_RECEIVER: &str = "all";

/// Message category, as tagged by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    UrgentHelp,
    MedicalEmergency,
    Evacuation,
    Resources,
    Infrastructure,
}

impl Category {
    /// Wire/storage name; must stay in sync with the serde rename above.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::UrgentHelp => "urgentHelp",
            Category::MedicalEmergency => "medicalEmergency",
            Category::Evacuation => "evacuation",
            Category::Resources => "resources",
            Category::Infrastructure => "infrastructure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "urgentHelp" => Some(Category::UrgentHelp),
            "medicalEmergency" => Some(Category::MedicalEmergency),
            "evacuation" => Some(Category::Evacuation),
            "resources" => Some(Category::Resources),
            "infrastructure" => Some(Category::Infrastructure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// A stored message as it appears on the wire.
///
/// `id` and `timestamp` are assigned by the store on insert and never
/// change afterwards; `is_read` only ever goes from false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}
