use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub google: GoogleConfig,

    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/prospectr.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8720,
            cors_allowed_origins: vec![
                "http://localhost:8720".to_string(),
                "http://127.0.0.1:8720".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Google Maps Platform API key. The PROSPECTR_GOOGLE_API_KEY
    /// environment variable overrides this value.
    pub api_key: String,

    pub geocode_url: String,

    pub places_url: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,

    /// Whether to make a Place Details call per stored candidate to
    /// backfill phone/website/formatted address (one extra request per
    /// place that passes filtering).
    pub fetch_details: bool,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geocode_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            places_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            request_timeout_seconds: 30,
            fetch_details: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Country suffix appended to postcode-only searches.
    pub country: String,

    /// Anchor cities used to approximate country-wide coverage.
    pub anchor_cities: Vec<String>,

    /// Upstream hard ceiling; requested radii are capped to this.
    pub max_radius_meters: u32,

    /// Keep candidates rated at or below this.
    pub rating_ceiling: f32,

    /// Keep candidates with at least this many reviews.
    pub review_floor: i32,

    /// Fixed page size for list endpoints.
    pub page_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            country: "Australia".to_string(),
            anchor_cities: vec![
                "Sydney".to_string(),
                "Melbourne".to_string(),
                "Brisbane".to_string(),
                "Perth".to_string(),
                "Adelaide".to_string(),
                "Gold Coast".to_string(),
                "Canberra".to_string(),
                "Hobart".to_string(),
            ],
            max_radius_meters: 50_000,
            rating_ceiling: 4.0,
            review_floor: 10,
            page_size: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            google: GoogleConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        let mut loaded = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                loaded = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = loaded.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        if let Ok(key) = std::env::var("PROSPECTR_GOOGLE_API_KEY") {
            config.google.api_key = key;
        }

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("prospectr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".prospectr").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.google.api_key.is_empty() {
            anyhow::bail!("Google API key is not set (google.api_key or PROSPECTR_GOOGLE_API_KEY)");
        }

        if self.search.max_radius_meters == 0 {
            anyhow::bail!("search.max_radius_meters must be > 0");
        }

        if self.search.anchor_cities.is_empty() {
            anyhow::bail!("search.anchor_cities cannot be empty");
        }

        if self.search.page_size == 0 {
            anyhow::bail!("search.page_size must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.max_radius_meters, 50_000);
        assert_eq!(config.search.review_floor, 10);
        assert_eq!(config.search.anchor_cities.len(), 8);
        assert_eq!(config.search.country, "Australia");
        assert!(config.server.enabled);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[google]"));
        assert!(toml_str.contains("[search]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [search]
            rating_ceiling = 3.5
            review_floor = 25
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!((config.search.rating_ceiling - 3.5).abs() < f32::EPSILON);
        assert_eq!(config.search.review_floor, 25);

        assert_eq!(config.search.max_radius_meters, 50_000);
    }

    #[test]
    fn test_validate_rejects_missing_api_key() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.google.api_key = "test-key".to_string();
        assert!(config.validate().is_ok());
    }
}
