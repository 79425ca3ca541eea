use crate::{
    auth::{
        extractor::Authenticated,
        jwt::generate_token,
        password::verify_password,
    },
    config::Config,
    error::{ApiError, ApiResult},
    model::role::Role,
    repo::UserRepository,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice.nguyen")]
    pub username: String,
    #[schema(example = "correct-horse-battery")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub role: Role,
}

/// Log in with username and password.
///
/// A missing user and a wrong password produce the same message, so the
/// response never reveals whether the username exists.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Bad credentials", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(users, config, body),
    fields(username = %body.username)
)]
pub async fn login(
    body: web::Json<LoginRequest>,
    users: web::Data<Arc<dyn UserRepository>>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    info!("Login request received");

    let bad_credentials = || ApiError::unauthorized("Username or password is incorrect.");

    debug!("Fetching user from database");
    let user = users
        .find_by_username(&body.username)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            info!("Invalid credentials: user not found");
            bad_credentials()
        })?;

    debug!("Verifying password");
    if !verify_password(&body.password, &user.password_hash) {
        info!("Invalid credentials: password mismatch");
        return Err(bad_credentials());
    }

    debug!("Generating access token");
    let access_token = generate_token(&user.username, &config.jwt_secret, config.access_token_ttl)
        .map_err(|e| {
            error!(error = %e, "Failed to sign access token");
            ApiError::internal()
        })?;

    info!("Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        role: user.role,
    }))
}

/// Log out. Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = Object, example = json!({
            "message": "Logout successful",
            "user": "alice.nguyen"
        })),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(auth: Authenticated) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Logout successful",
        "user": auth.0.username
    }))
}
