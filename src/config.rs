use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,

    pub stats_api_base_url: String,
    pub stats_api_timeout_secs: u64,

    // Used when a request does not carry its own timezone.
    pub default_timezone: String,
    pub default_utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            stats_api_base_url: env::var("STATS_API_BASE_URL")
                .expect("STATS_API_BASE_URL must be set"),
            stats_api_timeout_secs: env::var("STATS_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),

            default_timezone: env::var("DEFAULT_TIMEZONE").unwrap_or_else(|_| "UTC".into()),
            default_utc_offset_minutes: env::var("DEFAULT_UTC_OFFSET_MINUTES")
                .unwrap_or_else(|_| "0".into())
                .parse()
                .expect("DEFAULT_UTC_OFFSET_MINUTES must be a number"),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
