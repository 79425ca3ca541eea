use crate::model::role::Role;
use crate::repo::{AttendanceRepository, RepoError, UserRepository};
use chrono::{Datelike, NaiveDate, Weekday};

/// What one seeding run did. `AlreadySeeded` covers both the existence
/// check and a duplicate-key loss against a concurrent run.
#[derive(Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Weekend,
    AlreadySeeded,
    NoUsers,
    Seeded(u64),
}

/// Seed one `Pending` attendance row per role-`User` user for `date`.
///
/// Idempotent: any row already existing for the date makes the run a no-op,
/// and the UNIQUE (user_id, date) key turns a concurrent duplicate run into
/// a safe failure instead of a double insert.
pub async fn seed_for_date(
    date: NaiveDate,
    users: &dyn UserRepository,
    attendance: &dyn AttendanceRepository,
) -> anyhow::Result<SeedOutcome> {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return Ok(SeedOutcome::Weekend);
    }

    if attendance.any_for_date(date).await? {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let users = users.list_by_role(Role::User).await?;
    if users.is_empty() {
        return Ok(SeedOutcome::NoUsers);
    }

    let user_ids: Vec<u64> = users.iter().map(|u| u.user_id).collect();
    match attendance.seed_for_date(date, &user_ids).await {
        Ok(count) => Ok(SeedOutcome::Seeded(count)),
        Err(RepoError::Duplicate) => Ok(SeedOutcome::AlreadySeeded),
        Err(e) => Err(e.into()),
    }
}
