pub mod attendance_repo;
pub mod user_repo;

pub use attendance_repo::{AttendanceRepository, AttendanceWithUser, MySqlAttendanceRepository};
pub use user_repo::{MySqlUserRepository, NewUser, UserRepository};

use crate::error::ApiError;
use thiserror::Error;
use tracing::error;

/// Storage-layer failure. `Duplicate` is the UNIQUE-key violation the
/// seeding job and user writes rely on to stay race-safe.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("duplicate key")]
    Duplicate,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Duplicate => ApiError::conflict("The record already exists."),
            RepoError::Db(e) => {
                error!(error = %e, "Database error");
                ApiError::internal()
            }
        }
    }
}

/// MySQL signals any unique/foreign key violation as SQLSTATE 23000.
pub(crate) fn map_db_err(e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some("23000") {
            return RepoError::Duplicate;
        }
    }
    RepoError::Db(e)
}
