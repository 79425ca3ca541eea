use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

mod api;
mod attendance;
mod auth;
mod clients;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod repo;
mod routes;
#[cfg(test)]
mod testing;
mod utils;

use attendance::scheduler::DailySeeder;
use clients::{FaceVerifier, HttpFaceVerifier, HttpImageStore, ImageStore};
use config::Config;
use db::init_db;
use repo::{
    AttendanceRepository, MySqlAttendanceRepository, MySqlUserRepository, UserRepository,
};

use crate::docs::ApiDoc;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Facecheck attendance service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let users: Arc<dyn UserRepository> = Arc::new(MySqlUserRepository::new(pool.clone()));
    let attendance: Arc<dyn AttendanceRepository> =
        Arc::new(MySqlAttendanceRepository::new(pool.clone()));
    let verifier: Arc<dyn FaceVerifier> = Arc::new(
        HttpFaceVerifier::new(&config.face_api_url).expect("Failed to build face service client"),
    );
    let store: Arc<dyn ImageStore> = Arc::new(
        HttpImageStore::new(&config.image_store_url).expect("Failed to build image store client"),
    );

    // Seeds one Pending attendance row per user at each local midnight.
    let mut seeder = DailySeeder::new(users.clone(), attendance.clone(), config.timezone);
    seeder.start();

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let result = HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(users.clone()))
            .app_data(Data::new(attendance.clone()))
            .app_data(Data::new(verifier.clone()))
            .app_data(Data::new(store.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await;

    seeder.stop().await;
    result
}
