use crate::{
    api::read_form,
    attendance::lifecycle::{self, CheckInRecord},
    auth::extractor::Authenticated,
    clients::{FaceVerifier, ImageStore},
    config::Config,
    error::{ApiError, ApiResult},
    model::role::Role,
    repo::AttendanceRepository,
    utils::filter::{AttendanceCriteria, filter_attendance},
};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HistoryRow {
    pub attendance_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: chrono::NaiveDate,
    #[schema(example = "07:52:10", value_type = Option<String>)]
    pub time: Option<chrono::NaiveTime>,
    pub status: crate::model::attendance::AttendanceStatus,
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Profile", body = Object, example = json!({
            "user_id": 7,
            "fullname": "Alice Nguyen",
            "email": "alice.nguyen@example.com",
            "department": "Engineering",
            "face_url": "https://images.example/faces/alice.jpg"
        })),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn my_profile(auth: Authenticated) -> ApiResult<HttpResponse> {
    let user = auth.require_role(Role::User)?;
    Ok(HttpResponse::Ok().json(json!({
        "user_id": user.user_id,
        "fullname": user.fullname,
        "email": user.email,
        "department": user.department,
        "face_url": user.face_url,
    })))
}

/// Check in with a face image. The image is compared against the caller's
/// stored reference; today's `Pending` record gets its time and status.
#[utoipa::path(
    post,
    path = "/users/attendance",
    request_body(content = Object, content_type = "multipart/form-data",
        description = "File part face_image"),
    responses(
        (status = 200, description = "Checked in", body = CheckInRecord),
        (status = 400, description = "Verification failure or already recorded", body = ApiError),
        (status = 404, description = "No attendance record for today", body = ApiError),
        (status = 409, description = "Lost a concurrent check-in race", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn record_attendance(
    auth: Authenticated,
    config: web::Data<Config>,
    attendance: web::Data<Arc<dyn AttendanceRepository>>,
    verifier: web::Data<Arc<dyn FaceVerifier>>,
    store: web::Data<Arc<dyn ImageStore>>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let user = auth.require_role(Role::User)?;

    let mut form = read_form(payload).await?;
    let file = form
        .face_image
        .take()
        .ok_or_else(|| ApiError::invalid_request("Missing form field: face_image"))?;

    let now = Utc::now().with_timezone(&config.timezone);
    let record: CheckInRecord = lifecycle::check_in(
        &user,
        file.bytes,
        &file.filename,
        now,
        config.checkin_cutoff,
        attendance.as_ref().as_ref(),
        verifier.as_ref().as_ref(),
        store.get_ref().clone(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// The caller's own attendance history, newest first.
#[utoipa::path(
    get,
    path = "/users/attendance",
    params(AttendanceCriteria),
    responses(
        (status = 200, description = "Filtered history", body = [HistoryRow]),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn attendance_history(
    auth: Authenticated,
    attendance: web::Data<Arc<dyn AttendanceRepository>>,
    query: web::Query<AttendanceCriteria>,
) -> ApiResult<HttpResponse> {
    let user = auth.require_role(Role::User)?;

    let history = attendance
        .list_for_user(user.user_id)
        .await
        .map_err(ApiError::from)?;
    let rows: Vec<HistoryRow> = filter_attendance(history, &query)
        .into_iter()
        .map(|att| HistoryRow {
            attendance_id: att.attendance_id,
            date: att.date,
            time: att.time,
            status: att.status,
        })
        .collect();

    Ok(HttpResponse::Ok().json(rows))
}
