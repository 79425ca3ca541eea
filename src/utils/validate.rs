use crate::error::{ApiError, ApiResult};
use crate::model::role::Role;
use crate::repo::UserRepository;

/// Field-level checks applied before a user create/update. Each check runs
/// only when the field is supplied; the first failure is reported (no
/// aggregation). Uniqueness is checked against current storage; the UNIQUE
/// keys remain the authority under races.
pub async fn validate_fields(
    users: &dyn UserRepository,
    username: Option<&str>,
    password: Option<&str>,
    role: Option<&str>,
    email: Option<&str>,
) -> ApiResult<()> {
    if let Some(username) = username {
        if username.chars().count() < 8 {
            return Err(ApiError::invalid_request(
                "Username must be at least 8 characters long.",
            ));
        }
        if users.username_exists(username).await.map_err(ApiError::from)? {
            return Err(ApiError::invalid_request("Username already exists."));
        }
    }
    if let Some(password) = password {
        if password.chars().count() < 8 {
            return Err(ApiError::invalid_request(
                "Password must be at least 8 characters long.",
            ));
        }
    }
    if let Some(role) = role {
        if role.parse::<Role>().is_err() {
            return Err(ApiError::invalid_request("Invalid role."));
        }
    }
    if let Some(email) = email {
        if users.email_exists(email).await.map_err(ApiError::from)? {
            return Err(ApiError::invalid_request("Email already exists."));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{InMemoryUsers, test_user};

    fn existing_users() -> InMemoryUsers {
        let mut taken = test_user(1, "taken.username", Role::User);
        taken.email = "taken@example.com".to_string();
        InMemoryUsers::with_users(vec![taken])
    }

    #[tokio::test]
    async fn short_username_fails() {
        let users = existing_users();
        let err = validate_fields(&users, Some("seven77"), None, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
        assert_eq!(err.message, "Username must be at least 8 characters long.");
    }

    #[tokio::test]
    async fn duplicate_username_fails() {
        let users = existing_users();
        let err = validate_fields(&users, Some("taken.username"), None, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Username already exists.");
    }

    #[tokio::test]
    async fn short_password_fails() {
        let users = existing_users();
        let err = validate_fields(&users, None, Some("seven77"), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Password must be at least 8 characters long.");
    }

    #[tokio::test]
    async fn unknown_role_fails() {
        let users = existing_users();
        let err = validate_fields(&users, None, None, Some("SuperAdmin"), None)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid role.");
    }

    #[tokio::test]
    async fn duplicate_email_fails() {
        let users = existing_users();
        let err = validate_fields(&users, None, None, None, Some("taken@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Email already exists.");
    }

    #[tokio::test]
    async fn first_failing_check_wins() {
        let users = existing_users();
        // Both username and email are bad; the username check runs first.
        let err = validate_fields(
            &users,
            Some("short"),
            None,
            None,
            Some("taken@example.com"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.message, "Username must be at least 8 characters long.");
    }

    #[tokio::test]
    async fn omitted_fields_are_not_checked() {
        let users = existing_users();
        assert!(validate_fields(&users, None, None, None, None).await.is_ok());
    }

    #[tokio::test]
    async fn valid_fields_pass() {
        let users = existing_users();
        assert!(
            validate_fields(
                &users,
                Some("fresh.username"),
                Some("long-enough"),
                Some("User"),
                Some("fresh@example.com"),
            )
            .await
            .is_ok()
        );
    }
}
