use crate::api::admins::{UserAttendanceRow, UserDetail, UserSummary};
use crate::api::users::HistoryRow;
use crate::attendance::lifecycle::CheckInRecord;
use crate::auth::handlers::{LoginRequest, LoginResponse};
use crate::error::{ApiError, ErrorCode};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::role::Role;
use crate::repo::AttendanceWithUser;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Facecheck Attendance API",
        version = "1.0.0",
        description = r#"
## Face-verified attendance service

Authenticates users, records daily check-ins verified by face-image
comparison, and exposes administrative views over users and attendance
history.

### Key features
- **Authentication** — JWT bearer tokens issued at `/auth/login`
- **Daily attendance** — one `Pending` record per user, seeded each weekday
  at local midnight; a successful face-verified check-in marks it
  `On time` or `Late` (cutoff 08:00:00, inclusive)
- **Administration** — user CRUD with face reference images, filtered
  attendance views

### Security
All routes except `/auth/login` require **JWT Bearer authentication**.
Admin routes require the `Admin` role; user routes require `User`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::admins::list_users,
        crate::api::admins::create_user,
        crate::api::admins::update_user,
        crate::api::admins::delete_user,
        crate::api::admins::all_attendance,
        crate::api::admins::user_attendance,

        crate::api::users::my_profile,
        crate::api::users::record_attendance,
        crate::api::users::attendance_history
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            UserSummary,
            UserDetail,
            UserAttendanceRow,
            HistoryRow,
            CheckInRecord,
            Attendance,
            AttendanceStatus,
            AttendanceWithUser,
            Role,
            ApiError,
            ErrorCode
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and logout"),
        (name = "Admins", description = "User management and attendance oversight"),
        (name = "Users", description = "Profile and face-verified check-in"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
