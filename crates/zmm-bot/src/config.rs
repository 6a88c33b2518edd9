//! Application configuration.
//!
//! Loaded from TOML, then overridden from the command line, then validated
//! and frozen. The quoting parameters end up in an immutable `QuoteConfig`.

use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zmm_core::{Asset, Network};
use zmm_mm::QuoteConfig;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: Network,

    /// RPC endpoint override. Defaults to the network's public endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default = "default_asset")]
    pub asset: String,

    #[serde(default)]
    pub quote: QuoteConfig,

    #[serde(default)]
    pub supervisor: SupervisorSection,

    #[serde(default)]
    pub replay: ReplaySection,

    #[serde(default)]
    pub paper: PaperSection,
}

fn default_asset() -> String {
    "SOL".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: None,
            asset: default_asset(),
            quote: QuoteConfig::default(),
            supervisor: SupervisorSection::default(),
            replay: ReplaySection::default(),
            paper: PaperSection::default(),
        }
    }
}

/// Run loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_housekeeping_interval_secs")]
    pub housekeeping_interval_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_housekeeping_interval_secs() -> u64 {
    600 // 10 minutes
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            housekeeping_interval_secs: default_housekeeping_interval_secs(),
        }
    }
}

/// Book update replay source for the bundled binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySection {
    /// JSON-lines file of book updates.
    #[serde(default)]
    pub path: Option<String>,
    /// Delay between replayed updates.
    #[serde(default)]
    pub interval_ms: u64,
}

/// In-memory paper exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperSection {
    #[serde(default = "default_paper_balance")]
    pub starting_balance: Decimal,
}

fn default_paper_balance() -> Decimal {
    Decimal::new(1_000, 0)
}

impl Default for PaperSection {
    fn default() -> Self {
        Self {
            starting_balance: default_paper_balance(),
        }
    }
}

/// Run loop timing as used by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    pub poll_interval: Duration,
    pub housekeeping_interval: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        (&SupervisorSection::default()).into()
    }
}

impl From<&SupervisorSection> for SupervisorConfig {
    fn from(section: &SupervisorSection) -> Self {
        Self {
            poll_interval: Duration::from_millis(section.poll_interval_ms),
            housekeeping_interval: Duration::from_secs(section.housekeeping_interval_secs),
        }
    }
}

/// Command-line overrides. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub network: Option<Network>,
    pub url: Option<String>,
    pub asset: Option<String>,
    pub size: Option<Decimal>,
    pub edge_bps: Option<Decimal>,
    pub offset_bps: Option<Decimal>,
    pub replay: Option<String>,
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is missing.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn apply_overrides(&mut self, cli: &CliOverrides) {
        if let Some(network) = cli.network {
            self.network = network;
        }
        if let Some(url) = &cli.url {
            self.rpc_url = Some(url.clone());
        }
        if let Some(asset) = &cli.asset {
            self.asset = asset.clone();
        }
        if let Some(size) = cli.size {
            self.quote.quote_size = size;
        }
        if let Some(edge) = cli.edge_bps {
            self.quote.edge_bps = edge;
        }
        if let Some(offset) = cli.offset_bps {
            self.quote.offset_bps = offset;
        }
        if let Some(replay) = &cli.replay {
            self.replay.path = Some(replay.clone());
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.asset.trim().is_empty() {
            return Err(AppError::Config("asset must not be empty".to_string()));
        }
        if self.supervisor.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "supervisor.poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.supervisor.housekeeping_interval_secs == 0 {
            return Err(AppError::Config(
                "supervisor.housekeeping_interval_secs must be positive".to_string(),
            ));
        }
        self.quote
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Endpoint actually used: the override, else the network default.
    pub fn endpoint(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_endpoint())
    }

    pub fn asset(&self) -> Asset {
        Asset::new(&self.asset)
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        (&self.supervisor).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.asset().symbol(), "SOL");
        assert_eq!(config.endpoint(), Network::Mainnet.default_endpoint());
        assert_eq!(
            config.supervisor_config().housekeeping_interval,
            Duration::from_secs(600)
        );
        assert_eq!(
            config.supervisor_config().poll_interval,
            Duration::from_secs(1)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
network = "devnet"
asset = "btc"

[quote]
edge_bps = 30
quote_size = 0.5

[replay]
path = "demos/sol_book.jsonl"
interval_ms = 250
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.network, Network::Devnet);
        assert_eq!(config.asset().symbol(), "BTC");
        assert_eq!(config.quote.edge_bps, dec!(30));
        assert_eq!(config.quote.quote_size, dec!(0.5));
        assert_eq!(config.quote.time_in_force_secs, 120);
        assert_eq!(config.replay.path.as_deref(), Some("demos/sol_book.jsonl"));
        assert_eq!(config.supervisor.poll_interval_ms, 1_000);
    }

    #[test]
    fn test_bundled_default_toml() {
        let config: AppConfig =
            toml::from_str(include_str!("../../../config/default.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.quote.client_order_id, 1337);
        assert_eq!(config.supervisor.housekeeping_interval_secs, 600);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = AppConfig::default();
        config.apply_overrides(&CliOverrides {
            network: Some(Network::Localnet),
            url: Some("http://127.0.0.1:8899".to_string()),
            size: Some(dec!(2)),
            edge_bps: Some(dec!(15)),
            offset_bps: Some(dec!(5)),
            ..Default::default()
        });

        assert_eq!(config.network, Network::Localnet);
        assert_eq!(config.endpoint(), "http://127.0.0.1:8899");
        assert_eq!(config.quote.quote_size, dec!(2));
        assert_eq!(config.quote.edge_bps, dec!(15));
        assert_eq!(config.quote.offset_bps, dec!(5));
        assert_eq!(config.asset, "SOL");
    }

    #[test]
    fn test_validate_rejects_bad_quote() {
        let mut config = AppConfig::default();
        config.apply_overrides(&CliOverrides {
            size: Some(dec!(0)),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AppConfig::default();
        config.quote.edge_bps = dec!(-1);
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/zmm.toml").unwrap();
        assert_eq!(config.asset, "SOL");
    }

    #[test]
    fn test_from_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "network = 42").unwrap();

        let err = AppConfig::from_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
