use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::model::role::Role;
use crate::model::user::User;
use crate::repo::UserRepository;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::error;

/// The caller behind a verified bearer token. The user is loaded fresh from
/// storage on every request so deleted users fail closed; invalid signature,
/// expiry, missing subject and unknown user all collapse to the same 401.
#[derive(Debug)]
pub struct Authenticated(pub User);

impl Authenticated {
    /// Single authorization gate for every protected handler.
    pub fn require_role(self, role: Role) -> ApiResult<User> {
        if self.0.role == role {
            Ok(self.0)
        } else {
            Err(ApiError::forbidden(match role {
                Role::Admin => "Only administrators are allowed to access this resource.",
                Role::User => "Only users are allowed to access this resource.",
            }))
        }
    }
}

impl FromRequest for Authenticated {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = ApiResult<Self>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

            let config = req.app_data::<Data<Config>>().ok_or_else(|| {
                error!("App config missing from request state");
                ApiError::internal()
            })?;
            let users = req
                .app_data::<Data<Arc<dyn UserRepository>>>()
                .ok_or_else(|| {
                    error!("User repository missing from request state");
                    ApiError::internal()
                })?;

            let claims = verify_token(token, &config.jwt_secret)
                .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

            let user = users
                .find_by_username(&claims.sub)
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| ApiError::unauthorized("User does not exist in the system"))?;

            Ok(Authenticated(user))
        })
    }
}
