use crate::attendance::seed::seed_for_date;
use crate::repo::{AttendanceRepository, UserRepository};
use chrono::{NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Background task that runs the seeding job at each local midnight in the
/// organizational time zone. Errors inside a run are logged and swallowed;
/// the task itself never dies from a failed run. The job deliberately does
/// not run at startup, so a missed day stays visible as a gap.
pub struct DailySeeder {
    users: Arc<dyn UserRepository>,
    attendance: Arc<dyn AttendanceRepository>,
    timezone: Tz,
    stop: Arc<Notify>,
    handle: Option<JoinHandle<()>>,
}

impl DailySeeder {
    pub fn new(
        users: Arc<dyn UserRepository>,
        attendance: Arc<dyn AttendanceRepository>,
        timezone: Tz,
    ) -> Self {
        Self {
            users,
            attendance,
            timezone,
            stop: Arc::new(Notify::new()),
            handle: None,
        }
    }

    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let users = self.users.clone();
        let attendance = self.attendance.clone();
        let timezone = self.timezone;
        let stop = self.stop.clone();

        let handle = tokio::spawn(async move {
            info!(%timezone, "Daily attendance seeder started");
            loop {
                let wait = until_next_local_midnight(timezone);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        let today = Utc::now().with_timezone(&timezone).date_naive();
                        match seed_for_date(today, users.as_ref(), attendance.as_ref()).await {
                            Ok(outcome) => {
                                info!(date = %today, ?outcome, "Daily attendance seeding finished");
                            }
                            Err(e) => {
                                error!(date = %today, error = %e, "Daily attendance seeding failed");
                            }
                        }
                    }
                    _ = stop.notified() => break,
                }
            }
            info!("Daily attendance seeder stopped");
        });

        self.handle = Some(handle);
    }

    pub async fn stop(&mut self) {
        self.stop.notify_waiters();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

/// Sleep duration until the next local midnight. A midnight made ambiguous
/// or skipped by a DST transition falls back to 24 hours out.
fn until_next_local_midnight(timezone: Tz) -> Duration {
    let now = Utc::now().with_timezone(&timezone);
    let today = now.date_naive();
    let Some(tomorrow) = today.succ_opt() else {
        return Duration::from_secs(24 * 60 * 60);
    };

    let next_midnight = timezone
        .from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
        .earliest()
        .unwrap_or_else(|| now + chrono::Duration::hours(24));

    (next_midnight - now)
        .to_std()
        .unwrap_or(Duration::from_secs(60))
}
