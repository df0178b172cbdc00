use std::env;
use std::str::FromStr;
use std::sync::Arc;

use crate::repositories::{CarRepository, PictureRepository};
use crate::services::car_service::CarService;
use crate::services::picture_service::PictureService;
use crate::services::s3_service::ObjectStorage;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: String,
    pub public_read: bool,
    pub presign_expires_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub run_migrations: bool,
    pub app_env: String,
    pub storage_backend: StorageBackend,
    /// Present when the backend is `s3`.
    pub s3: Option<S3Config>,
    pub presign_expires_secs: u64,
    pub storage_reset_on_start: bool,
}

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub car_service: Arc<CarService>,
    pub picture_service: Arc<PictureService>,
}

impl AppState {
    pub fn new(
        cars: Arc<dyn CarRepository>,
        pictures: Arc<dyn PictureRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let picture_service = Arc::new(PictureService::new(pictures, storage));
        let car_service = Arc::new(CarService::new(cars, picture_service.clone()));
        Self {
            car_service,
            picture_service,
        }
    }
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `init` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = parse(&lookup, "PORT", 3000u16)?;
        let database_url = required(&lookup, "DATABASE_URL")?;
        let run_migrations = flag(&lookup, "RUN_MIGRATIONS", false)?;
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            None => StorageBackend::S3,
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "STORAGE_BACKEND",
                value,
            })?,
        };
        let presign_expires_secs = parse(&lookup, "S3_PRESIGN_EXPIRES_SECS", 60u64)?;

        let s3 = match storage_backend {
            StorageBackend::S3 => Some(S3Config {
                endpoint: required(&lookup, "S3_ENDPOINT")?,
                region: required(&lookup, "S3_REGION")?,
                access_key: required(&lookup, "S3_ACCESS_KEY")?,
                secret_key: required(&lookup, "S3_SECRET_KEY")?,
                bucket_name: required(&lookup, "S3_BUCKET_NAME")?,
                public_read: flag(&lookup, "S3_PUBLIC_READ", true)?,
                presign_expires_secs,
            }),
            StorageBackend::Memory => None,
        };

        let storage_reset_on_start = flag(&lookup, "STORAGE_RESET_ON_START", false)?;

        Ok(Config {
            server_host,
            server_port,
            database_url,
            run_migrations,
            app_env,
            storage_backend,
            s3,
            presign_expires_secs,
            storage_reset_on_start,
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(key))
}

fn parse<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn memory_backend_needs_only_database_url() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("STORAGE_BACKEND", "memory"),
        ]))
        .unwrap();

        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert!(config.s3.is_none());
        assert!(!config.run_migrations);
        assert!(config.is_development());
        assert_eq!(config.presign_expires_secs, 60);
    }

    #[test]
    fn s3_backend_requires_credentials() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/cars")])).unwrap_err();
        assert_eq!(err.to_string(), "S3_ENDPOINT must be set");
    }

    #[test]
    fn s3_settings_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/cars"),
            ("S3_ENDPOINT", "http://localhost:4566"),
            ("S3_REGION", "eu-west-1"),
            ("S3_ACCESS_KEY", "test"),
            ("S3_SECRET_KEY", "test"),
            ("S3_BUCKET_NAME", "pictures"),
            ("S3_PUBLIC_READ", "false"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        let s3 = config.s3.unwrap();
        assert_eq!(s3.bucket_name, "pictures");
        assert!(!s3.public_read);
        assert_eq!(config.server_port, 8080);
    }

    #[test]
    fn bad_values_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("STORAGE_BACKEND", "memory"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "PORT has an invalid value: eighty");

        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "x"), ("STORAGE_BACKEND", "ftp")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }
}
