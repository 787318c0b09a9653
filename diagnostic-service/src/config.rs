use serde::Deserialize;
use std::fs;

use crate::observability::LogFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl IngestConfig {
    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| anyhow::anyhow!("ingest.delimiter must be an ASCII character, got {:?}", self.delimiter))
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> char {
    ';'
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    /// Used when a registry record has no nominal voltage.
    pub nominal_voltage: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { nominal_voltage: 380.0 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("DIAGNOSTIC_CONFIG").unwrap_or_else(|_| "diagnostic-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.ingest.delimiter_byte()?;
        Ok(cfg)
    }
}
