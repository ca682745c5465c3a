use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{not_blank, UnknownStatus};

/// Wire property -> column for `?sort=`.
pub const ORGANIZER_SORTABLE: &[(&str, &str)] = &[
    ("organizationName", "organization_name"),
    ("contactEmail", "contact_email"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrganizerStatus {
    Active,
    Deleted,
}

impl OrganizerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizerStatus::Active => "ACTIVE",
            OrganizerStatus::Deleted => "DELETED",
        }
    }

    /// DELETED is terminal.
    pub fn can_transition_to(self, next: OrganizerStatus) -> bool {
        matches!(
            (self, next),
            (OrganizerStatus::Active, OrganizerStatus::Deleted)
        )
    }
}

impl fmt::Display for OrganizerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganizerStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(OrganizerStatus::Active),
            "DELETED" => Ok(OrganizerStatus::Deleted),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for OrganizerStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Organizer {
    pub id: Uuid,
    pub user_id: String,
    pub organization_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub document_number: String,
    #[sqlx(try_from = "String")]
    pub status: OrganizerStatus,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// Organizer ready for insertion; id, timestamps and version come from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganizer {
    pub user_id: String,
    pub organization_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub document_number: String,
    pub status: OrganizerStatus,
    pub created_by: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerCreateRequest {
    #[validate(custom(function = "not_blank"))]
    pub organization_name: String,
    #[validate(email(message = "must be a well-formed email address"))]
    pub contact_email: String,
    #[validate(custom(function = "not_blank"))]
    pub contact_phone: String,
    #[validate(custom(function = "not_blank"))]
    pub document_number: String,
}

/// Partial update: absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerUpdateRequest {
    #[validate(custom(function = "not_blank"))]
    pub organization_name: Option<String>,
    #[validate(email(message = "must be a well-formed email address"))]
    pub contact_email: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub contact_phone: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub document_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerView {
    pub id: Uuid,
    pub user_id: String,
    pub organization_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub document_number: String,
    pub status: OrganizerStatus,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
