use super::{RepoError, map_db_err};
use crate::model::role::Role;
use crate::model::user::User;
use async_trait::async_trait;
use sqlx::MySqlPool;

/// Insert payload for a new user; the database assigns the id.
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub fullname: String,
    pub email: String,
    pub department: String,
    pub face_url: Option<String>,
    pub face_handle: Option<String>,
}

/// All SQL touching the `users` table lives behind this seam; handlers and
/// the seeding job only see the trait.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: u64) -> Result<Option<User>, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn list_all(&self) -> Result<Vec<User>, RepoError>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, RepoError>;
    async fn username_exists(&self, username: &str) -> Result<bool, RepoError>;
    async fn email_exists(&self, email: &str) -> Result<bool, RepoError>;
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;
    async fn update(&self, user: &User) -> Result<(), RepoError>;
    /// Returns false if no such user existed. Attendance rows go with the
    /// user via the ON DELETE CASCADE foreign key.
    async fn delete(&self, user_id: u64) -> Result<bool, RepoError>;
}

const SELECT_USER: &str = "SELECT user_id, username, password_hash, role, fullname, email, \
     department, face_url, face_handle FROM users";

pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, user_id: u64) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE user_id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} ORDER BY user_id"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, RepoError> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE role = ? ORDER BY user_id"))
            .bind(role)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)
    }

    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
            (username, password_hash, role, fullname, email, department, face_url, face_handle)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.department)
        .bind(&user.face_url)
        .bind(&user.face_handle)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(User {
            user_id: result.last_insert_id(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            fullname: user.fullname,
            email: user.email,
            department: user.department,
            face_url: user.face_url,
            face_handle: user.face_handle,
        })
    }

    async fn update(&self, user: &User) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, password_hash = ?, role = ?, fullname = ?,
                email = ?, department = ?, face_url = ?, face_handle = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.department)
        .bind(&user.face_url)
        .bind(&user.face_handle)
        .bind(user.user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, user_id: u64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }
}
