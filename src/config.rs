use std::env;

use axum::http::HeaderValue;
use chrono::FixedOffset;

use crate::engine::queue::QueueThresholds;
use crate::engine::rush::RushThresholds;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub event_buffer_size: usize,
    pub cors_origins: Vec<HeaderValue>,
    pub canteen_utc_offset_minutes: i32,
    pub queue: QueueThresholds,
    pub rush: RushThresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            event_buffer_size: 1024,
            cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
            canteen_utc_offset_minutes: 330,
            queue: QueueThresholds::default(),
            rush: RushThresholds::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let defaults = Config::default();
        let queue = QueueThresholds {
            urgent_minutes: parse_or_default("URGENT_MINUTES", defaults.queue.urgent_minutes)?,
            soon_minutes: parse_or_default("SOON_MINUTES", defaults.queue.soon_minutes)?,
        };
        if queue.urgent_minutes > queue.soon_minutes {
            return Err(AppError::Internal(
                "URGENT_MINUTES must not exceed SOON_MINUTES".to_string(),
            ));
        }

        let rush = RushThresholds {
            high_hour_orders: parse_or_default("RUSH_HIGH_HOUR_ORDERS", defaults.rush.high_hour_orders)?,
            high_pending: parse_or_default("RUSH_HIGH_PENDING", defaults.rush.high_pending)?,
            medium_hour_orders: parse_or_default(
                "RUSH_MEDIUM_HOUR_ORDERS",
                defaults.rush.medium_hour_orders,
            )?,
            medium_pending: parse_or_default("RUSH_MEDIUM_PENDING", defaults.rush.medium_pending)?,
            ..defaults.rush
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") | Err(_) => LogFormat::Compact,
            Ok(other) => {
                return Err(AppError::Internal(format!(
                    "invalid LOG_FORMAT: {other}, expected compact or json"
                )));
            }
        };

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            cors_origins: match env::var("CORS_ORIGINS") {
                Ok(raw) => parse_origins(&raw)?,
                Err(_) => defaults.cors_origins,
            },
            canteen_utc_offset_minutes: parse_or_default(
                "CANTEEN_UTC_OFFSET_MINUTES",
                defaults.canteen_utc_offset_minutes,
            )?,
            queue,
            rush,
        };
        config.canteen_offset()?;

        Ok(config)
    }

    /// Local zone of the canteen; rush-hour buckets are read in this offset.
    pub fn canteen_offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.canteen_utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Internal(format!(
                "invalid CANTEEN_UTC_OFFSET_MINUTES: {}",
                self.canteen_utc_offset_minutes
            ))
        })
    }
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|err| AppError::Internal(format!("invalid CORS origin {origin}: {err}")))
        })
        .collect()
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
