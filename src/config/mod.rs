//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `VERIFACE_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::EmbeddingModel;

/// Default acquired-file size cap, in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 1;

/// Default match threshold percent.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 50.0;

/// Default bounded fetch timeout, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `VERIFACE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Shared API-key secret. When unset, authentication fails closed and
    /// every request to the compare endpoint is rejected.
    pub api_key: Option<String>,

    /// Embedding-model selector. Default: Facenet512.
    pub model: EmbeddingModel,

    /// Path to the face-detector ONNX model. Absent means an empty detector
    /// chain: every image takes the no-face degradation path.
    pub detector_model_path: Option<PathBuf>,

    /// Path to the embedding ONNX model. Absent means the similarity engine
    /// runs in stub mode.
    pub embedding_model_path: Option<PathBuf>,

    /// Maximum acquired-file size in megabytes. Default: `1`.
    pub max_file_size_mb: u64,

    /// Match threshold percent in [0, 100]. Default: `50`.
    pub match_threshold: f64,

    /// Bounded timeout for remote image fetches, in seconds. Default: `10`.
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            api_key: None,
            model: EmbeddingModel::Facenet512,
            detector_model_path: None,
            embedding_model_path: None,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "VERIFACE_PORT";
    const ENV_BIND_ADDR: &'static str = "VERIFACE_BIND_ADDR";
    const ENV_API_KEY: &'static str = "VERIFACE_API_KEY";
    const ENV_MODEL: &'static str = "VERIFACE_MODEL";
    const ENV_DETECTOR_MODEL_PATH: &'static str = "VERIFACE_DETECTOR_MODEL_PATH";
    const ENV_EMBEDDING_MODEL_PATH: &'static str = "VERIFACE_EMBEDDING_MODEL_PATH";
    const ENV_MAX_FILE_SIZE_MB: &'static str = "VERIFACE_MAX_FILE_SIZE_MB";
    const ENV_MATCH_THRESHOLD: &'static str = "VERIFACE_MATCH_THRESHOLD";
    const ENV_FETCH_TIMEOUT_SECS: &'static str = "VERIFACE_FETCH_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let api_key = Self::parse_optional_string_from_env(Self::ENV_API_KEY);
        let model = Self::parse_model_from_env(defaults.model)?;
        let detector_model_path =
            Self::parse_optional_path_from_env(Self::ENV_DETECTOR_MODEL_PATH);
        let embedding_model_path =
            Self::parse_optional_path_from_env(Self::ENV_EMBEDDING_MODEL_PATH);
        let max_file_size_mb = Self::parse_file_size_from_env(defaults.max_file_size_mb)?;
        let match_threshold = Self::parse_threshold_from_env(defaults.match_threshold)?;
        let fetch_timeout_secs =
            Self::parse_u64_from_env(Self::ENV_FETCH_TIMEOUT_SECS, defaults.fetch_timeout_secs);

        Ok(Self {
            port,
            bind_addr,
            api_key,
            model,
            detector_model_path,
            embedding_model_path,
            max_file_size_mb,
            match_threshold,
            fetch_timeout_secs,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.detector_model_path, &self.embedding_model_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(ConfigError::InvalidThreshold {
                value: self.match_threshold.to_string(),
            });
        }

        if self.max_file_size_mb == 0 {
            return Err(ConfigError::InvalidFileSize {
                value: self.max_file_size_mb.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Size cap in bytes.
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_model_from_env(default: EmbeddingModel) -> Result<EmbeddingModel, ConfigError> {
        match env::var(Self::ENV_MODEL) {
            Ok(value) => Ok(value.trim().parse()?),
            Err(_) => Ok(default),
        }
    }

    fn parse_threshold_from_env(default: f64) -> Result<f64, ConfigError> {
        match env::var(Self::ENV_MATCH_THRESHOLD) {
            Ok(value) => {
                let threshold: f64 =
                    value
                        .parse()
                        .map_err(|e| ConfigError::ThresholdParseError {
                            value: value.clone(),
                            source: e,
                        })?;
                if !(0.0..=100.0).contains(&threshold) {
                    return Err(ConfigError::InvalidThreshold { value });
                }
                Ok(threshold)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_file_size_from_env(default: u64) -> Result<u64, ConfigError> {
        match env::var(Self::ENV_MAX_FILE_SIZE_MB) {
            Ok(value) => match value.parse::<u64>() {
                Ok(size) if size > 0 => Ok(size),
                _ => Err(ConfigError::InvalidFileSize { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
