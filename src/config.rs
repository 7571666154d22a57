use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_LEARNING_RATE: f64 = 0.2;
const DEFAULT_REPEAT_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_path: PathBuf,
    pub maintenance_token: Option<String>,
    pub seed_content: bool,
    pub scoring: ScoringConfig,
}

/// Tuning for the default mastery blend and repeat prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub learning_rate: f64,
    pub repeat_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            repeat_threshold: DEFAULT_REPEAT_THRESHOLD,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> Self {
        let learning_rate = env_unit_interval("MASTERY_LEARNING_RATE")
            .filter(|rate| *rate > 0.0)
            .unwrap_or(DEFAULT_LEARNING_RATE);
        let repeat_threshold =
            env_unit_interval("REPEAT_PROMPT_THRESHOLD").unwrap_or(DEFAULT_REPEAT_THRESHOLD);

        Self {
            learning_rate,
            repeat_threshold,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let database_path = std::env::var("DATABASE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let maintenance_token = std::env::var("MAINTENANCE_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let seed_content = std::env::var("SEED_CONTENT")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Self {
            host,
            port,
            log_level,
            database_path,
            maintenance_token,
            seed_content,
            scoring: ScoringConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kotoba-review")
        .join("review.db")
}

fn env_unit_interval(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| (0.0..=1.0).contains(value))
}
