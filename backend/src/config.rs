use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

pub const DEFAULT_HEART_FEATURES: usize = 13;
pub const DEFAULT_STROKE_FEATURES: usize = 10;
pub const DEFAULT_DIABETES_FEATURES: usize = 8;

/// Server settings read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_dir: PathBuf,
    pub threshold: f32,
    pub rate_limit: u32,
    pub batch_rate_limit: u32,
    pub heart_features: usize,
    pub stroke_features: usize,
    pub diabetes_features: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: num_cpus::get(),
            model_dir: PathBuf::from("models"),
            threshold: 0.5,
            rate_limit: 100,
            batch_rate_limit: 20,
            heart_features: DEFAULT_HEART_FEATURES,
            stroke_features: DEFAULT_STROKE_FEATURES,
            diabetes_features: DEFAULT_DIABETES_FEATURES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT", defaults.port),
            workers: parsed(&lookup, "WORKERS", defaults.workers),
            model_dir: lookup("MODEL_DIR").map(PathBuf::from).unwrap_or(defaults.model_dir),
            threshold: parsed(&lookup, "RISK_THRESHOLD", defaults.threshold),
            rate_limit: parsed(&lookup, "RATE_LIMIT_PER_MINUTE", defaults.rate_limit),
            batch_rate_limit: parsed(&lookup, "BATCH_RATE_LIMIT_PER_MINUTE", defaults.batch_rate_limit),
            heart_features: parsed(&lookup, "HEART_FEATURES", defaults.heart_features),
            stroke_features: parsed(&lookup, "STROKE_FEATURES", defaults.stroke_features),
            diabetes_features: parsed(&lookup, "DIABETES_FEATURES", defaults.diabetes_features),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{}={:?} is not valid, using {}", key, raw, default);
            default
        }),
    }
}
