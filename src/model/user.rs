use super::role::Role;

/// Identity record. `face_url` and `face_handle` are either both set or both
/// absent: the URL is what the face service compares against, the handle is
/// what binary storage needs to delete the object again.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub fullname: String,
    pub email: String,
    pub department: String,
    pub face_url: Option<String>,
    pub face_handle: Option<String>,
}
