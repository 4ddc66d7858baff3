use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::dto::{CheckInResponse, CreateCheckInRequest, UpdateCheckInRequest};
use crate::models::check_in::{CheckIn, DateRange, NewCheckIn};

/// Business rules for check-ins on top of an injected pool.
///
/// Nothing here validates input ranges; callers outside HTTP get exactly what
/// they ask for.
#[derive(Clone)]
pub struct CheckInService {
    db: SqlitePool,
}

impl CheckInService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        input: CreateCheckInRequest,
    ) -> Result<CheckInResponse, sqlx::Error> {
        let now = Utc::now();
        let new = NewCheckIn {
            user_id: input.user_id,
            mood: input.mood,
            notes: input.notes,
            date: input.date.unwrap_or(now),
            created_at: now,
        };

        let row = sqlx::query_as::<_, CheckIn>(
            r#"
            INSERT INTO check_ins (user_id, mood, notes, date, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.user_id)
        .bind(new.mood)
        .bind(&new.notes)
        .bind(new.date)
        .bind(new.created_at)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(check_in_id = row.id, user_id = %row.user_id, "Check-in created");
        Ok(row.into())
    }

    pub async fn list_all(&self, range: DateRange) -> Result<Vec<CheckInResponse>, sqlx::Error> {
        self.list(None, range).await
    }

    pub async fn list_by_user(
        &self,
        user_id: &str,
        range: DateRange,
    ) -> Result<Vec<CheckInResponse>, sqlx::Error> {
        self.list(Some(user_id), range).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<CheckInResponse>, sqlx::Error> {
        Ok(self.find(id).await?.map(Into::into))
    }

    /// Merges the supplied fields into the stored row. `None` if the id is
    /// unknown, in which case nothing is written.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCheckInRequest,
    ) -> Result<Option<CheckInResponse>, sqlx::Error> {
        let Some(mut row) = self.find(id).await? else {
            return Ok(None);
        };

        row.apply(input.mood, input.notes, input.date, Utc::now());

        sqlx::query(
            r#"
            UPDATE check_ins SET
                mood = ?,
                notes = ?,
                date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(row.mood)
        .bind(&row.notes)
        .bind(row.date)
        .bind(row.updated_at)
        .bind(row.id)
        .execute(&self.db)
        .await?;

        tracing::info!(check_in_id = row.id, "Check-in updated");
        Ok(Some(row.into()))
    }

    /// `true` if a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM check_ins WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(check_in_id = id, "Check-in deleted");
        }
        Ok(deleted)
    }

    async fn find(&self, id: i64) -> Result<Option<CheckIn>, sqlx::Error> {
        sqlx::query_as::<_, CheckIn>("SELECT * FROM check_ins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await
    }

    async fn list(
        &self,
        user_id: Option<&str>,
        range: DateRange,
    ) -> Result<Vec<CheckInResponse>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM check_ins WHERE 1 = 1");

        if let Some(user_id) = user_id {
            qb.push(" AND user_id = ").push_bind(user_id.to_owned());
        }
        if let Some(from) = range.from {
            qb.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = range.to {
            qb.push(" AND date <= ").push_bind(to);
        }
        qb.push(" ORDER BY date DESC, id DESC");

        let rows = qb
            .build_query_as::<CheckIn>()
            .fetch_all(&self.db)
            .await?;

        tracing::debug!(count = rows.len(), ?user_id, "Listed check-ins");
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
