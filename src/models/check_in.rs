use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A persisted check-in row.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CheckIn {
    pub id: i64,
    pub user_id: String,
    pub mood: i32,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A row that has not been inserted yet; storage assigns the id.
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub user_id: String,
    pub mood: i32,
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Inclusive bounds on `date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl CheckIn {
    /// Overwrites every supplied field and stamps `updated_at`.
    pub fn apply(
        &mut self,
        mood: Option<i32>,
        notes: Option<String>,
        date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        if let Some(mood) = mood {
            self.mood = mood;
        }
        if let Some(notes) = notes {
            self.notes = Some(notes);
        }
        if let Some(date) = date {
            self.date = date;
        }
        self.updated_at = Some(now);
    }
}
