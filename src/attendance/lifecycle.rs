use crate::clients::{FaceVerifier, FaceVerifyError, ImageStore, StoredImage};
use crate::error::{ApiError, ApiResult};
use crate::model::attendance::AttendanceStatus;
use crate::model::user::User;
use crate::repo::AttendanceRepository;
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument, warn};
use utoipa::ToSchema;

/// What a successful check-in hands back to the caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInRecord {
    pub attendance_id: u64,
    pub user_id: u64,
    pub username: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "07:52:10", value_type = String)]
    pub time: NaiveTime,
    pub status: AttendanceStatus,
}

/// The cutoff is inclusive: checking in at exactly 08:00:00 is `On time`.
pub fn status_for(time: NaiveTime, cutoff: NaiveTime) -> AttendanceStatus {
    if time <= cutoff {
        AttendanceStatus::OnTime
    } else {
        AttendanceStatus::Late
    }
}

/// Deletes the temp upload exactly once. The normal path awaits the delete
/// inline; if the request future is dropped first (client disconnect, request
/// timeout), `Drop` hands the delete to a spawned task so the image never
/// outlives the check-in.
struct TempUpload {
    store: Arc<dyn ImageStore>,
    handle: Option<String>,
}

impl TempUpload {
    fn new(store: Arc<dyn ImageStore>, handle: String) -> Self {
        Self {
            store,
            handle: Some(handle),
        }
    }

    async fn delete(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.store.delete(&handle).await {
                warn!(error = %e, handle = %handle, "Failed to delete temporary check-in image");
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let store = self.store.clone();
            tokio::spawn(async move {
                if let Err(e) = store.delete(&handle).await {
                    warn!(error = %e, handle = %handle, "Failed to delete temporary check-in image");
                }
            });
        }
    }
}

/// Run a check-in for `user` with the submitted proof-of-presence image.
///
/// `now` is civil time in the organizational zone, supplied by the caller.
/// The submitted image is uploaded to the `temp` folder for comparison and
/// deleted again on every exit path, success, failure or cancellation.
#[instrument(
    name = "attendance_check_in",
    skip_all,
    fields(user_id = user.user_id, username = %user.username)
)]
pub async fn check_in(
    user: &User,
    image: Vec<u8>,
    filename: &str,
    now: DateTime<Tz>,
    cutoff: NaiveTime,
    attendance: &dyn AttendanceRepository,
    verifier: &dyn FaceVerifier,
    store: Arc<dyn ImageStore>,
) -> ApiResult<CheckInRecord> {
    let reference_url = user
        .face_url
        .as_deref()
        .ok_or_else(|| ApiError::invalid_request("No reference image on file."))?;

    let StoredImage { url, handle } =
        store.upload(image, filename, "temp").await.map_err(|e| {
            error!(error = %e, "Failed to upload check-in image");
            ApiError::internal()
        })?;
    let temp = TempUpload::new(store, handle);

    let result =
        verify_and_record(user, reference_url, &url, now, cutoff, attendance, verifier).await;

    // The temp upload must not outlive the request, whatever the outcome.
    // A failed delete is logged and never masks the primary result.
    temp.delete().await;

    result
}

async fn verify_and_record(
    user: &User,
    reference_url: &str,
    temp_url: &str,
    now: DateTime<Tz>,
    cutoff: NaiveTime,
    attendance: &dyn AttendanceRepository,
    verifier: &dyn FaceVerifier,
) -> ApiResult<CheckInRecord> {
    match verifier.compare(temp_url, reference_url).await {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::invalid_request("Face verification failed.")),
        Err(e @ (FaceVerifyError::NoFaceInSubmitted | FaceVerifyError::NoFaceInReference)) => {
            return Err(ApiError::invalid_request(e.to_string()));
        }
        Err(FaceVerifyError::Service(detail)) => {
            error!(error = %detail, "Face comparison service failure");
            return Err(ApiError::internal());
        }
    }

    let today = now.date_naive();
    let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());

    let record = attendance
        .find_for_date(user.user_id, today)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Attendance record not found for today."))?;

    if record.time.is_some() {
        return Err(ApiError::invalid_request(
            "Attendance has already been recorded for today.",
        ));
    }

    let status = status_for(time, cutoff);

    // Conditional update: only one of two concurrent attempts can pass the
    // `time IS NULL` guard; the loser lands here with zero rows affected.
    let updated = attendance
        .record_check_in(user.user_id, today, time, status)
        .await
        .map_err(ApiError::from)?;
    if !updated {
        return Err(ApiError::conflict(
            "Attendance was already recorded by a concurrent check-in.",
        ));
    }

    Ok(CheckInRecord {
        attendance_id: record.attendance_id,
        user_id: user.user_id,
        username: user.username.clone(),
        date: today,
        time,
        status,
    })
}
