use chrono::NaiveTime;
use chrono_tz::Tz;
use dotenvy::dotenv;
use std::env;

/// Runtime configuration, read once at startup. Required variables fail fast;
/// the rest fall back to sensible defaults.
#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    /// Face comparison service base URL.
    pub face_api_url: String,
    /// Binary image store base URL.
    pub image_store_url: String,

    /// Organizational time zone. All attendance dates and times are civil
    /// time in this zone, never UTC and never the caller's zone.
    pub timezone: Tz,
    /// Check-ins at or before this local time are `On time`.
    pub checkin_cutoff: NaiveTime,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "1800".to_string()) // default 30 min
                .parse()
                .expect("ACCESS_TOKEN_TTL must be a number of seconds"),

            face_api_url: env::var("FACE_API_URL").expect("FACE_API_URL must be set"),
            image_store_url: env::var("IMAGE_STORE_URL").expect("IMAGE_STORE_URL must be set"),

            timezone: env::var("TIMEZONE")
                .unwrap_or_else(|_| "Asia/Ho_Chi_Minh".to_string())
                .parse()
                .expect("TIMEZONE must be a valid IANA time zone name"),
            checkin_cutoff: env::var("CHECKIN_CUTOFF")
                .unwrap_or_else(|_| "08:00:00".to_string())
                .parse()
                .expect("CHECKIN_CUTOFF must be HH:MM:SS"),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("RATE_LOGIN_PER_MIN must be a number"),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("RATE_PROTECTED_PER_MIN must be a number"),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "".to_string()),
        }
    }
}
