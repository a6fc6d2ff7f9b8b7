use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    Text,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderEntity {
    Customer,
    Service,
}

impl std::str::FromStr for ReminderEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("customer") {
            Ok(ReminderEntity::Customer)
        } else if s.eq_ignore_ascii_case("service") {
            Ok(ReminderEntity::Service)
        } else {
            Err(format!("unknown reminder entity type: {}", s))
        }
    }
}

/// A note scheduled against a customer or a service, stored inline on its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub date: DateTime<Utc>,
    pub entity_type: ReminderEntity,
    pub entity_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminderRequest {
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub message: Option<String>,
    pub audio_url: Option<String>,
    pub date: DateTime<Utc>,
}
