use crate::{
    api::read_form,
    auth::{extractor::Authenticated, password::hash_password},
    clients::ImageStore,
    error::{ApiError, ApiResult},
    model::role::Role,
    repo::{AttendanceRepository, NewUser, UserRepository},
    utils::filter::{AttendanceCriteria, UserCriteria, filter_attendance, filter_users},
    utils::validate::validate_fields,
};
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct UserSummary {
    pub user_id: u64,
    pub fullname: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub face_url: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserDetail {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
    pub fullname: String,
    pub email: String,
    pub department: String,
    pub face_url: Option<String>,
}

impl From<crate::model::user::User> for UserDetail {
    fn from(user: crate::model::user::User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            role: user.role,
            fullname: user.fullname,
            email: user.email,
            department: user.department,
            face_url: user.face_url,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserAttendanceRow {
    pub attendance_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "07:52:10", value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    pub status: crate::model::attendance::AttendanceStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminAttendanceQuery {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

/// List users, optionally narrowed by substring filters.
#[utoipa::path(
    get,
    path = "/admins",
    params(UserCriteria),
    responses(
        (status = 200, description = "Filtered user list", body = [UserSummary]),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn list_users(
    auth: Authenticated,
    users: web::Data<Arc<dyn UserRepository>>,
    query: web::Query<UserCriteria>,
) -> ApiResult<HttpResponse> {
    auth.require_role(Role::Admin)?;

    let all = users.list_all().await.map_err(ApiError::from)?;
    let filtered = filter_users(all, &query);

    let response: Vec<UserSummary> = filtered
        .into_iter()
        .map(|user| UserSummary {
            user_id: user.user_id,
            fullname: user.fullname,
            email: user.email,
            department: user.department,
            role: user.role,
            face_url: user.face_url,
        })
        .collect();
    Ok(HttpResponse::Ok().json(response))
}

/// Create a user from a multipart form, with an optional face reference
/// image stored in the `faces` folder.
#[utoipa::path(
    post,
    path = "/admins",
    request_body(content = Object, content_type = "multipart/form-data",
        description = "Fields: username, password, role, fullname, email, department; \
        optional file part face_image"),
    responses(
        (status = 200, description = "Created user", body = UserDetail),
        (status = 400, description = "Validation failure", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn create_user(
    auth: Authenticated,
    users: web::Data<Arc<dyn UserRepository>>,
    store: web::Data<Arc<dyn ImageStore>>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    auth.require_role(Role::Admin)?;

    let mut form = read_form(payload).await?;
    let username = form.require("username")?;
    let password = form.require("password")?;
    let role = form.require("role")?;
    let fullname = form.require("fullname")?;
    let email = form.require("email")?;
    let department = form.require("department")?;

    validate_fields(
        users.as_ref().as_ref(),
        Some(&username),
        Some(&password),
        Some(&role),
        Some(&email),
    )
    .await?;

    let role: Role = role
        .parse()
        .map_err(|_| ApiError::invalid_request("Invalid role."))?;
    let password_hash = hash_password(&password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal()
    })?;

    let (face_url, face_handle) = match form.face_image {
        Some(file) => {
            let stored = store
                .upload(file.bytes, &file.filename, "faces")
                .await
                .map_err(|e| {
                    error!(error = %e, "Failed to store face image");
                    ApiError::internal()
                })?;
            (Some(stored.url), Some(stored.handle))
        }
        None => (None, None),
    };

    let user = users
        .insert(NewUser {
            username,
            password_hash,
            role,
            fullname,
            email,
            department,
            face_url,
            face_handle,
        })
        .await
        .map_err(ApiError::from)?;

    info!(user_id = user.user_id, "User created");
    Ok(HttpResponse::Ok().json(UserDetail::from(user)))
}

/// Partially update a user. Supplied fields are validated and applied;
/// replacing the face image deletes the superseded stored object.
#[utoipa::path(
    put,
    path = "/admins/{user_id}",
    params(("user_id" = u64, Path, description = "User id")),
    request_body(content = Object, content_type = "multipart/form-data",
        description = "Any of: username, password, role, fullname, email, department; \
        optional file part face_image"),
    responses(
        (status = 200, description = "Updated user", body = UserDetail),
        (status = 400, description = "Validation failure", body = ApiError),
        (status = 404, description = "No such user", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn update_user(
    auth: Authenticated,
    path: web::Path<u64>,
    users: web::Data<Arc<dyn UserRepository>>,
    store: web::Data<Arc<dyn ImageStore>>,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    auth.require_role(Role::Admin)?;

    let user_id = path.into_inner();
    let mut user = users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    let repo = users.as_ref().as_ref();
    let mut form = read_form(payload).await?;

    if let Some(username) = form.take("username") {
        if username != user.username {
            validate_fields(repo, Some(&username), None, None, None).await?;
            user.username = username;
        }
    }
    if let Some(password) = form.take("password") {
        validate_fields(repo, None, Some(&password), None, None).await?;
        user.password_hash = hash_password(&password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            ApiError::internal()
        })?;
    }
    if let Some(role) = form.take("role") {
        if role != user.role.to_string() {
            validate_fields(repo, None, None, Some(&role), None).await?;
            user.role = role
                .parse()
                .map_err(|_| ApiError::invalid_request("Invalid role."))?;
        }
    }
    if let Some(fullname) = form.take("fullname") {
        user.fullname = fullname;
    }
    if let Some(email) = form.take("email") {
        if email != user.email {
            validate_fields(repo, None, None, None, Some(&email)).await?;
            user.email = email;
        }
    }
    if let Some(department) = form.take("department") {
        user.department = department;
    }

    if let Some(file) = form.face_image.take() {
        let stored = store
            .upload(file.bytes, &file.filename, "faces")
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to store face image");
                ApiError::internal()
            })?;
        if let Some(old_handle) = user.face_handle.replace(stored.handle) {
            if let Err(e) = store.delete(&old_handle).await {
                warn!(error = %e, handle = %old_handle, "Failed to delete superseded face image");
            }
        }
        user.face_url = Some(stored.url);
    }

    users.update(&user).await.map_err(ApiError::from)?;
    info!(user_id, "User updated");
    Ok(HttpResponse::Ok().json(UserDetail::from(user)))
}

/// Delete a user. Attendance rows go with the user via the storage-level
/// cascade; the stored face image is deleted best-effort.
#[utoipa::path(
    delete,
    path = "/admins/{user_id}",
    params(("user_id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "User deleted successfully."
        })),
        (status = 404, description = "No such user", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn delete_user(
    auth: Authenticated,
    path: web::Path<u64>,
    users: web::Data<Arc<dyn UserRepository>>,
    store: web::Data<Arc<dyn ImageStore>>,
) -> ApiResult<HttpResponse> {
    auth.require_role(Role::Admin)?;

    let user_id = path.into_inner();
    let user = users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    users.delete(user_id).await.map_err(ApiError::from)?;

    if let Some(handle) = user.face_handle {
        if let Err(e) = store.delete(&handle).await {
            warn!(error = %e, handle = %handle, "Failed to delete stored face image");
        }
    }

    info!(user_id, "User deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully." })))
}

/// All attendance rows joined with user fields, filterable by date parts,
/// status, and user substrings.
#[utoipa::path(
    get,
    path = "/admins/attendance",
    params(AdminAttendanceQuery),
    responses(
        (status = 200, description = "Filtered attendance",
         body = [crate::repo::AttendanceWithUser]),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn all_attendance(
    auth: Authenticated,
    attendance: web::Data<Arc<dyn AttendanceRepository>>,
    query: web::Query<AdminAttendanceQuery>,
) -> ApiResult<HttpResponse> {
    auth.require_role(Role::Admin)?;

    let attendance_criteria = AttendanceCriteria {
        day: query.day,
        month: query.month,
        year: query.year,
        status: query.status.clone(),
    };
    let user_criteria = UserCriteria {
        fullname: query.fullname.clone(),
        email: query.email.clone(),
        department: query.department.clone(),
        role: None,
    };

    let mut rows = attendance
        .list_all_with_users()
        .await
        .map_err(ApiError::from)?;
    rows.retain(|row| {
        attendance_criteria.matches(row.date, row.status)
            && user_criteria.matches(&row.fullname, "", &row.email, &row.department)
    });

    Ok(HttpResponse::Ok().json(rows))
}

/// One user's attendance history, newest first.
#[utoipa::path(
    get,
    path = "/admins/attendance/{user_id}",
    params(("user_id" = u64, Path, description = "User id"), AttendanceCriteria),
    responses(
        (status = 200, description = "Filtered history", body = [UserAttendanceRow]),
        (status = 404, description = "No such user", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Admins"
)]
pub async fn user_attendance(
    auth: Authenticated,
    path: web::Path<u64>,
    users: web::Data<Arc<dyn UserRepository>>,
    attendance: web::Data<Arc<dyn AttendanceRepository>>,
    query: web::Query<AttendanceCriteria>,
) -> ApiResult<HttpResponse> {
    auth.require_role(Role::Admin)?;

    let user_id = path.into_inner();
    users
        .find_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found."))?;

    let history = attendance
        .list_for_user(user_id)
        .await
        .map_err(ApiError::from)?;
    let rows: Vec<UserAttendanceRow> = filter_attendance(history, &query)
        .into_iter()
        .map(|att| UserAttendanceRow {
            attendance_id: att.attendance_id,
            date: att.date,
            time: att.time,
            status: att.status,
        })
        .collect();

    Ok(HttpResponse::Ok().json(rows))
}
