use anyhow::Result;
use std::env;

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST")?,
            port: env::var("DATABASE_PORT")?.parse()?,
            username: env::var("DATABASE_USERNAME")?,
            password: env::var("DATABASE_PASSWORD")?,
            database: env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: env::var("REDIS_HOST")?,
            port: env::var("REDIS_PORT")?.parse()?,
        };
        let auth = AuthConfig {
            ttl: env::var("AUTH_TOKEN_TTL")
                .unwrap_or_else(|_| "86400".into())
                .parse()?,
        };
        let booking = BookingConfig {
            spaces: env::var("BOOKING_SPACES")
                .unwrap_or_else(|_| "10".into())
                .parse()?,
            minimum_price: env::var("BOOKING_MINIMUM_PRICE")
                .unwrap_or_else(|_| "9".into())
                .parse()?,
        };
        Ok(Self {
            database,
            redis,
            auth,
            booking,
        })
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    pub ttl: u64,
}

/// 予約まわりの設定値。
/// spaces は 1 日あたりの総スペース数、minimum_price は価格の下限。
pub struct BookingConfig {
    pub spaces: i64,
    pub minimum_price: i32,
}
