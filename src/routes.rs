use crate::{
    api::{admins, users},
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes (logout still requires a valid token via the extractor)
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes; role checks happen in each handler's gate
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/admins")
                    // /admins
                    .service(
                        web::resource("")
                            .route(web::get().to(admins::list_users))
                            .route(web::post().to(admins::create_user)),
                    )
                    // /admins/attendance (registered before /{user_id})
                    .service(
                        web::resource("/attendance")
                            .route(web::get().to(admins::all_attendance)),
                    )
                    // /admins/attendance/{user_id}
                    .service(
                        web::resource("/attendance/{user_id}")
                            .route(web::get().to(admins::user_attendance)),
                    )
                    // /admins/{user_id}
                    .service(
                        web::resource("/{user_id}")
                            .route(web::put().to(admins::update_user))
                            .route(web::delete().to(admins::delete_user)),
                    ),
            )
            .service(
                web::scope("/users")
                    // /users
                    .service(web::resource("").route(web::get().to(users::my_profile)))
                    // /users/attendance
                    .service(
                        web::resource("/attendance")
                            .route(web::post().to(users::record_attendance))
                            .route(web::get().to(users::attendance_history)),
                    ),
            ),
    );
}
