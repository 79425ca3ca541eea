//! In-memory fakes shared by unit tests. Compiled only for tests.

use crate::clients::{FaceVerifier, FaceVerifyError, ImageStore, ImageStoreError, StoredImage};
use crate::config::Config;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::role::Role;
use crate::model::user::User;
use crate::repo::{AttendanceRepository, AttendanceWithUser, NewUser, RepoError, UserRepository};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        database_url: "mysql://unused".to_string(),
        jwt_secret: "test-secret".to_string(),
        access_token_ttl: 1800,
        face_api_url: "http://face.invalid".to_string(),
        image_store_url: "http://images.invalid".to_string(),
        timezone: chrono_tz::Asia::Ho_Chi_Minh,
        checkin_cutoff: "08:00:00".parse().unwrap(),
        rate_login_per_min: 60,
        rate_protected_per_min: 1000,
        api_prefix: "".to_string(),
    }
}

pub fn test_user(user_id: u64, username: &str, role: Role) -> User {
    User {
        user_id,
        username: username.to_string(),
        password_hash: "$argon2id$unused".to_string(),
        role,
        fullname: format!("Test {username}"),
        email: format!("{username}@example.com"),
        department: "Engineering".to_string(),
        face_url: None,
        face_handle: None,
    }
}

pub fn test_attendance(
    attendance_id: u64,
    user_id: u64,
    date: &str,
    time: Option<&str>,
    status: AttendanceStatus,
) -> Attendance {
    Attendance {
        attendance_id,
        user_id,
        date: date.parse().unwrap(),
        time: time.map(|t| t.parse().unwrap()),
        status,
    }
}

// ---------------------------------------------------------------- users

pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    pub fn all(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, user_id: u64) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == user_id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        let mut users = self.all();
        users.sort_by_key(|u| u.user_id);
        Ok(users)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, RepoError> {
        let mut users: Vec<User> = self.all().into_iter().filter(|u| u.role == role).collect();
        users.sort_by_key(|u| u.user_id);
        Ok(users)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(RepoError::Duplicate);
        }
        let user_id = users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1;
        let user = User {
            user_id,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            fullname: user.fullname,
            email: user.email,
            department: user.department,
            face_url: user.face_url,
            face_handle: user.face_handle,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<(), RepoError> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.user_id == user.user_id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, user_id: u64) -> Result<bool, RepoError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.user_id != user_id);
        Ok(users.len() != before)
    }
}

// ----------------------------------------------------------- attendance

pub struct InMemoryAttendance {
    rows: Mutex<Vec<Attendance>>,
    claim_on_update: AtomicBool,
    fail_seed: AtomicBool,
}

impl InMemoryAttendance {
    pub fn with_rows(rows: Vec<Attendance>) -> Self {
        Self {
            rows: Mutex::new(rows),
            claim_on_update: AtomicBool::new(false),
            fail_seed: AtomicBool::new(false),
        }
    }

    pub fn rows(&self) -> Vec<Attendance> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, attendance_id: u64) -> Option<Attendance> {
        self.rows()
            .into_iter()
            .find(|r| r.attendance_id == attendance_id)
    }

    /// Simulate a concurrent check-in claiming the row between the fresh
    /// read and the conditional update.
    pub fn claim_on_next_update(&self) {
        self.claim_on_update.store(true, Ordering::SeqCst);
    }

    /// Make the next bulk seed fail with the UNIQUE-key error.
    pub fn fail_next_seed_as_duplicate(&self) {
        self.fail_seed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendance {
    async fn find_for_date(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, RepoError> {
        Ok(self
            .rows()
            .into_iter()
            .find(|r| r.user_id == user_id && r.date == date))
    }

    async fn list_for_user(&self, user_id: u64) -> Result<Vec<Attendance>, RepoError> {
        let mut rows: Vec<Attendance> =
            self.rows().into_iter().filter(|r| r.user_id == user_id).collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn list_all_with_users(&self) -> Result<Vec<AttendanceWithUser>, RepoError> {
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows
            .into_iter()
            .map(|r| AttendanceWithUser {
                attendance_id: r.attendance_id,
                user_id: r.user_id,
                fullname: format!("User {}", r.user_id),
                email: format!("user{}@example.com", r.user_id),
                department: "Engineering".to_string(),
                date: r.date,
                time: r.time,
                status: r.status,
            })
            .collect())
    }

    async fn any_for_date(&self, date: NaiveDate) -> Result<bool, RepoError> {
        Ok(self.rows().iter().any(|r| r.date == date))
    }

    async fn seed_for_date(&self, date: NaiveDate, user_ids: &[u64]) -> Result<u64, RepoError> {
        if self.fail_seed.swap(false, Ordering::SeqCst) {
            return Err(RepoError::Duplicate);
        }

        let mut rows = self.rows.lock().unwrap();
        // Emulate the UNIQUE (user_id, date) key: all-or-nothing insert.
        if user_ids
            .iter()
            .any(|id| rows.iter().any(|r| r.user_id == *id && r.date == date))
        {
            return Err(RepoError::Duplicate);
        }

        let mut next_id = rows.iter().map(|r| r.attendance_id).max().unwrap_or(0) + 1;
        for user_id in user_ids {
            rows.push(Attendance {
                attendance_id: next_id,
                user_id: *user_id,
                date,
                time: None,
                status: AttendanceStatus::Pending,
            });
            next_id += 1;
        }
        Ok(user_ids.len() as u64)
    }

    async fn record_check_in(
        &self,
        user_id: u64,
        date: NaiveDate,
        time: NaiveTime,
        status: AttendanceStatus,
    ) -> Result<bool, RepoError> {
        let mut rows = self.rows.lock().unwrap();

        if self.claim_on_update.swap(false, Ordering::SeqCst) {
            if let Some(row) = rows
                .iter_mut()
                .find(|r| r.user_id == user_id && r.date == date)
            {
                row.time = Some("07:00:00".parse().unwrap());
                row.status = AttendanceStatus::OnTime;
            }
        }

        match rows
            .iter_mut()
            .find(|r| r.user_id == user_id && r.date == date && r.time.is_none())
        {
            Some(row) => {
                row.time = Some(time);
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// -------------------------------------------------------- collaborators

/// Face comparison stub with a fixed verdict.
pub struct StubVerifier {
    verdict: Result<bool, FaceVerifyError>,
    hang: bool,
}

impl StubVerifier {
    fn with_verdict(verdict: Result<bool, FaceVerifyError>) -> Self {
        Self {
            verdict,
            hang: false,
        }
    }

    pub fn matching() -> Self {
        Self::with_verdict(Ok(true))
    }

    pub fn mismatch() -> Self {
        Self::with_verdict(Ok(false))
    }

    pub fn no_face_in_submitted() -> Self {
        Self::with_verdict(Err(FaceVerifyError::NoFaceInSubmitted))
    }

    pub fn no_face_in_reference() -> Self {
        Self::with_verdict(Err(FaceVerifyError::NoFaceInReference))
    }

    /// A comparison that never resolves, for exercising dropped requests.
    pub fn hanging() -> Self {
        Self {
            verdict: Ok(true),
            hang: true,
        }
    }
}

#[async_trait]
impl FaceVerifier for StubVerifier {
    async fn compare(&self, _: &str, _: &str) -> Result<bool, FaceVerifyError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.verdict.clone()
    }
}

/// Image store stub that records every upload and delete.
pub struct RecordingStore {
    uploads: Mutex<Vec<StoredImage>>,
    deletes: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn uploads(&self) -> Vec<StoredImage> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_handles(&self) -> Vec<String> {
        self.uploads().into_iter().map(|s| s.handle).collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for RecordingStore {
    async fn upload(
        &self,
        _bytes: Vec<u8>,
        filename: &str,
        folder: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let stored = StoredImage {
            url: format!("https://images.invalid/{folder}/{n}/{filename}"),
            handle: format!("{folder}/{n}"),
        };
        self.uploads.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, handle: &str) -> Result<(), ImageStoreError> {
        self.deletes.lock().unwrap().push(handle.to_string());
        Ok(())
    }
}
