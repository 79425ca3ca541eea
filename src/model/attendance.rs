use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a day's record: `Pending` until a successful check-in, then
/// either terminal state. There is no way back to `Pending`.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
pub enum AttendanceStatus {
    Pending,
    #[serde(rename = "On time")]
    #[sqlx(rename = "On time")]
    #[strum(serialize = "On time")]
    OnTime,
    Late,
}

/// One row per (user, date). `time` is set exactly when `status` is terminal
/// and never changes afterwards; the UNIQUE (user_id, date) key in the
/// schema is what makes concurrent check-ins and seeding runs safe.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    pub attendance_id: u64,
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "07:52:10", value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_display() {
        assert_eq!(AttendanceStatus::Pending.to_string(), "Pending");
        assert_eq!(AttendanceStatus::OnTime.to_string(), "On time");
        assert_eq!(AttendanceStatus::Late.to_string(), "Late");
        assert_eq!(
            "On time".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::OnTime
        );
    }

    #[test]
    fn status_serializes_with_stored_spelling() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::OnTime).unwrap(),
            "\"On time\""
        );
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Pending).unwrap(),
            "\"Pending\""
        );
    }
}
