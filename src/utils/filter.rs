use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::user::User;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

/// Optional date-part and status criteria for attendance rows. Omitted
/// criteria impose no constraint; supplied criteria compose with AND.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AttendanceCriteria {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Compared case-insensitively for exact equality ("late" matches
    /// `Late`, "On TIME" matches `On time`).
    pub status: Option<String>,
}

impl AttendanceCriteria {
    pub fn matches(&self, date: NaiveDate, status: AttendanceStatus) -> bool {
        if let Some(day) = self.day {
            if date.day() != day {
                return false;
            }
        }
        if let Some(month) = self.month {
            if date.month() != month {
                return false;
            }
        }
        if let Some(year) = self.year {
            if date.year() != year {
                return false;
            }
        }
        if let Some(wanted) = &self.status {
            if !status.to_string().eq_ignore_ascii_case(wanted) {
                return false;
            }
        }
        true
    }
}

/// Optional text criteria for users. Every supplied criterion is a
/// case-insensitive substring match, including role: `role=admin` matches
/// "admin" anywhere in the role string. That mirrors the original behavior
/// and is preserved deliberately.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UserCriteria {
    pub fullname: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl UserCriteria {
    pub fn matches(&self, fullname: &str, role: &str, email: &str, department: &str) -> bool {
        if let Some(wanted) = &self.fullname {
            if !contains_ci(fullname, wanted) {
                return false;
            }
        }
        if let Some(wanted) = &self.role {
            if !contains_ci(role, wanted) {
                return false;
            }
        }
        if let Some(wanted) = &self.email {
            if !contains_ci(email, wanted) {
                return false;
            }
        }
        if let Some(wanted) = &self.department {
            if !contains_ci(department, wanted) {
                return false;
            }
        }
        true
    }

    pub fn matches_user(&self, user: &User) -> bool {
        self.matches(
            &user.fullname,
            &user.role.to_string(),
            &user.email,
            &user.department,
        )
    }
}

pub fn filter_attendance(
    records: Vec<Attendance>,
    criteria: &AttendanceCriteria,
) -> Vec<Attendance> {
    records
        .into_iter()
        .filter(|att| criteria.matches(att.date, att.status))
        .collect()
}

pub fn filter_users(users: Vec<User>, criteria: &UserCriteria) -> Vec<User> {
    users
        .into_iter()
        .filter(|user| criteria.matches_user(user))
        .collect()
}
