use super::{RepoError, map_db_err};
use crate::model::attendance::{Attendance, AttendanceStatus};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::{MySqlPool, QueryBuilder};
use utoipa::ToSchema;

/// Attendance row joined with the owning user's display fields, for the
/// admin-wide view.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceWithUser {
    pub attendance_id: u64,
    pub user_id: u64,
    pub fullname: String,
    pub email: String,
    pub department: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "07:52:10", value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find_for_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, RepoError>;
    /// One user's history, newest date first.
    async fn list_for_user(&self, user_id: u64) -> Result<Vec<Attendance>, RepoError>;
    /// Every row joined with user fields, newest date first.
    async fn list_all_with_users(&self) -> Result<Vec<AttendanceWithUser>, RepoError>;
    async fn any_for_date(&self, date: NaiveDate) -> Result<bool, RepoError>;
    /// Bulk-insert one `Pending` row per user id for the given date. The
    /// UNIQUE (user_id, date) key turns a duplicate run into
    /// `RepoError::Duplicate` instead of a double insert.
    async fn seed_for_date(&self, date: NaiveDate, user_ids: &[u64]) -> Result<u64, RepoError>;
    /// Conditional update that only fires while `time` is still NULL.
    /// Returns false when a concurrent check-in already claimed the row.
    async fn record_check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        status: AttendanceStatus,
    ) -> Result<bool, RepoError>;
}

pub struct MySqlAttendanceRepository {
    pool: MySqlPool,
}

impl MySqlAttendanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for MySqlAttendanceRepository {
    async fn find_for_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, RepoError> {
        sqlx::query_as::<_, Attendance>(
            r#"
            SELECT attendance_id, user_id, date, time, status
            FROM attendances
            WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn list_for_user(&self, user_id: u64) -> Result<Vec<Attendance>, RepoError> {
        sqlx::query_as::<_, Attendance>(
            r#"
            SELECT attendance_id, user_id, date, time, status
            FROM attendances
            WHERE user_id = ?
            ORDER BY date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn list_all_with_users(&self) -> Result<Vec<AttendanceWithUser>, RepoError> {
        sqlx::query_as::<_, AttendanceWithUser>(
            r#"
            SELECT a.attendance_id, a.user_id, u.fullname, u.email, u.department,
                   a.date, a.time, a.status
            FROM attendances a
            JOIN users u ON u.user_id = a.user_id
            ORDER BY a.date DESC, a.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn any_for_date(&self, date: NaiveDate) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attendances WHERE date = ? LIMIT 1)",
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn seed_for_date(&self, date: NaiveDate, user_ids: &[u64]) -> Result<u64, RepoError> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::new("INSERT INTO attendances (user_id, date, status) ");
        builder.push_values(user_ids, |mut row, user_id| {
            row.push_bind(user_id)
                .push_bind(date)
                .push_bind(AttendanceStatus::Pending);
        });

        let result = builder.build().execute(&self.pool).await.map_err(map_db_err)?;
        Ok(result.rows_affected())
    }

    async fn record_check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        status: AttendanceStatus,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE attendances
            SET time = ?, status = ?
            WHERE user_id = ? AND date = ? AND time IS NULL
            "#,
        )
        .bind(time)
        .bind(status)
        .bind(user_id)
        .bind(date)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
