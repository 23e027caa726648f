use super::price::GRAMS_PER_TROY_OUNCE;
use anyhow::{Context, Result, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GoldProviderConfig {
    pub base_url: String,
}

impl Default for GoldProviderConfig {
    fn default() -> Self {
        GoldProviderConfig {
            base_url: "https://api.gold-api.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ExchangeProviderConfig {
    pub base_url: String,
}

impl Default for ExchangeProviderConfig {
    fn default() -> Self {
        ExchangeProviderConfig {
            base_url: "https://api.exchangerate-api.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gold: GoldProviderConfig,
    pub exchange: ExchangeProviderConfig,
    /// Per-request deadline. `null` disables it.
    pub timeout_secs: Option<u64>,
    /// Extra attempts after a failed request.
    pub retries: usize,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            gold: GoldProviderConfig::default(),
            exchange: ExchangeProviderConfig::default(),
            timeout_secs: Some(10),
            retries: 0,
        }
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PricingConfig {
    pub base_currency: String,
    pub target_currency: String,
    pub grams_per_ounce: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            base_currency: "USD".to_string(),
            target_currency: "EGP".to_string(),
            grams_per_ounce: GRAMS_PER_TROY_OUNCE,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RefreshConfig {
    /// Period of the background refresh while serving. Unset means manual only.
    pub interval_secs: Option<u64>,
    /// Fetch feed values once per batch instead of once per product.
    pub reuse_quotes: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: None,
            reuse_quotes: true,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub pricing: PricingConfig,
    pub refresh: RefreshConfig,
    /// Directory for the on-disk product store. Products are kept in memory when unset.
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "karat", "karat")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.pricing.grams_per_ounce.is_finite() && self.pricing.grams_per_ounce > 0.0,
            "pricing.grams_per_ounce must be positive"
        );
        ensure!(
            !self.pricing.base_currency.trim().is_empty(),
            "pricing.base_currency must not be empty"
        );
        ensure!(
            !self.pricing.target_currency.trim().is_empty(),
            "pricing.target_currency must not be empty"
        );
        Ok(())
    }

    pub fn data_path(&self) -> Option<PathBuf> {
        self.data_path.as_ref().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_document() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.providers.gold.base_url, "https://api.gold-api.com");
        assert_eq!(
            config.providers.exchange.base_url,
            "https://api.exchangerate-api.com"
        );
        assert_eq!(config.providers.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.providers.retries, 0);
        assert_eq!(config.pricing.base_currency, "USD");
        assert_eq!(config.pricing.target_currency, "EGP");
        assert_eq!(config.pricing.grams_per_ounce, 31.1035);
        assert!(config.refresh.reuse_quotes);
        assert!(config.refresh.interval().is_none());
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  port: 9000
providers:
  gold:
    base_url: "http://example.com/gold"
  exchange:
    base_url: "http://example.com/fx"
  timeout_secs: null
  retries: 2
pricing:
  target_currency: "AED"
refresh:
  interval_secs: 3600
  reuse_quotes: false
data_path: "/tmp/karat"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.providers.gold.base_url, "http://example.com/gold");
        assert_eq!(config.providers.exchange.base_url, "http://example.com/fx");
        assert!(config.providers.timeout().is_none());
        assert_eq!(config.providers.retries, 2);
        assert_eq!(config.pricing.base_currency, "USD");
        assert_eq!(config.pricing.target_currency, "AED");
        assert_eq!(config.refresh.interval(), Some(Duration::from_secs(3600)));
        assert!(!config.refresh.reuse_quotes);
        assert_eq!(config.data_path(), Some(PathBuf::from("/tmp/karat")));
    }

    #[test]
    fn test_empty_provider_sections_use_defaults() {
        let yaml_str = "providers:\n  gold: {}\n  exchange: {}\n";

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.providers.gold.base_url, "https://api.gold-api.com");
        assert_eq!(
            config.providers.exchange.base_url,
            "https://api.exchangerate-api.com"
        );
        assert_eq!(config.providers.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_load_rejects_invalid_ounce_ratio() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "pricing:\n  grams_per_ounce: 0\n").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("grams_per_ounce"));
    }
}
