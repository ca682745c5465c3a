use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{not_blank, UnknownStatus};

pub const EVENT_SORTABLE: &[(&str, &str)] = &[
    ("name", "name"),
    ("location", "location"),
    ("startDatetime", "start_datetime"),
    ("endDatetime", "end_datetime"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Active,
    Deleted,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Active => "ACTIVE",
            EventStatus::Deleted => "DELETED",
        }
    }

    /// DRAFT -> ACTIVE is done by publishing, outside this service.
    pub fn can_transition_to(self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Draft, EventStatus::Active) | (EventStatus::Active, EventStatus::Deleted)
        )
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(EventStatus::Draft),
            "ACTIVE" => Ok(EventStatus::Active),
            "DELETED" => Ok(EventStatus::Deleted),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    /// User id of the owning organizer; never changes after creation.
    pub organizer_id: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub status: EventStatus,
    pub organizer_id: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventCreateRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdateRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub location: Option<String>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub end_datetime: Option<DateTime<Utc>>,
}

impl EventUpdateRequest {
    pub fn touches_schedule(&self) -> bool {
        self.start_datetime.is_some() || self.end_datetime.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub status: EventStatus,
    pub organizer_id: String,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_edges() {
        assert!(EventStatus::Draft.can_transition_to(EventStatus::Active));
        assert!(EventStatus::Active.can_transition_to(EventStatus::Deleted));
        assert!(!EventStatus::Draft.can_transition_to(EventStatus::Deleted));
        assert!(!EventStatus::Deleted.can_transition_to(EventStatus::Active));
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("draft".parse::<EventStatus>(), Ok(EventStatus::Draft));
        assert!("published".parse::<EventStatus>().is_err());
    }

    #[test]
    fn test_description_length_is_bounded() {
        let request = EventUpdateRequest {
            description: Some("x".repeat(1001)),
            ..Default::default()
        };
        assert!(request.validate().is_err());
        assert!(!request.touches_schedule());
    }
}
