//! # MindCheck — Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Field names are camelCase on the wire
//! - All validation is expressed via `validator` derive macros and runs in the
//!   transport layer only; the service accepts whatever it is handed

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::models::check_in::{CheckIn, DateRange};

// ============================================================================
// Common
// ============================================================================

/// Stable error envelope — every error response uses this shape
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Check-ins
// ============================================================================

/// POST /api/checkins
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckInRequest {
    #[validate(
        length(min = 1, max = 100, message = "UserId is required and must be 1-100 characters"),
        custom = "validate_not_blank"
    )]
    pub user_id: String,

    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood: i32,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,

    /// As-of date of the check-in. Default: now
    #[serde(default, deserialize_with = "deserialize_flexible_datetime")]
    pub date: Option<DateTime<Utc>>,
}

/// PUT /api/checkins/{id} — partial update, all fields optional.
///
/// `notes: ""` is a real update; an absent or `null` field leaves the stored
/// value alone.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckInRequest {
    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood: Option<i32>,

    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,

    #[serde(default, deserialize_with = "deserialize_flexible_datetime")]
    pub date: Option<DateTime<Utc>>,
}

/// GET /api/checkins and GET /api/checkins/user/{userId}
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInQuery {
    #[serde(default, deserialize_with = "deserialize_flexible_datetime")]
    pub from_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_flexible_datetime")]
    pub to_date: Option<DateTime<Utc>>,
}

impl From<CheckInQuery> for DateRange {
    fn from(query: CheckInQuery) -> Self {
        DateRange {
            from: query.from_date,
            to: query.to_date,
        }
    }
}

/// A check-in as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub id: i64,
    pub user_id: String,
    pub mood: i32,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CheckIn> for CheckInResponse {
    fn from(row: CheckIn) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            mood: row.mood,
            notes: row.notes,
            date: row.date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("UserId is required".into());
        return Err(err);
    }
    Ok(())
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC), or a bare
/// `YYYY-MM-DD` (midnight UTC). Empty or `null` means absent.
fn deserialize_flexible_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_flexible_datetime(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {value}"))),
    }
}

pub fn parse_flexible_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
