//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The resulting [`Config`] value is passed explicitly into the services that
//! need it (wallet context, RPC connection) rather than stored in a global.
//!
//! ```rust,no_run
//! use lib_core::config::Config;
//!
//! let config = Config::from_env().expect("invalid configuration");
//! let cluster = config.cluster.name();
//! ```

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Solana cluster selection.
///
/// Determines which Solana cluster wallet authorizations are requested for and
/// which public RPC endpoint is used when no custom endpoint is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    /// Solana mainnet-beta (production network)
    MainnetBeta,
    /// Solana devnet (test network)
    Devnet,
    /// Solana testnet
    Testnet,
}

impl Cluster {
    /// Canonical cluster name as presented to a wallet during authorization.
    pub fn name(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
        }
    }

    /// Default public RPC endpoint for the cluster.
    ///
    /// Public endpoints are rate limited (~10 req/sec); production deployments
    /// should configure `RPC_ENDPOINT` with a dedicated provider URL.
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "mainnet-beta" => Ok(Cluster::MainnetBeta),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            other => Err(AppError::Config(format!(
                "SOLANA_NETWORK must be one of mainnet-beta, devnet, testnet (got '{}')",
                other
            ))),
        }
    }
}

/// Build variant of the application.
///
/// Mirrors the release channels the app ships under; feature flags are derived
/// from the variant via [`Features::for_variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppVariant {
    Development,
    Preview,
    Production,
    /// Solana dApp Store release
    #[serde(rename = "dapp")]
    DappStore,
}

impl AppVariant {
    fn parse(value: &str) -> Self {
        // Unknown variants fall back to development, matching startup behavior
        // where a missing/garbled variant must never brick the app.
        match value {
            "production" => AppVariant::Production,
            "preview" => AppVariant::Preview,
            "dapp" => AppVariant::DappStore,
            _ => AppVariant::Development,
        }
    }
}

/// Feature switches derived from the build variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub enable_analytics: bool,
    pub enable_crash_reporting: bool,
    pub enable_debug_menu: bool,
    /// Allow the in-process mock wallet connector (development builds only).
    pub enable_mock_wallet: bool,
}

impl Features {
    pub fn for_variant(variant: AppVariant) -> Self {
        let is_release = matches!(variant, AppVariant::Production | AppVariant::DappStore);
        let is_dev = variant == AppVariant::Development;
        Self {
            enable_analytics: is_release,
            enable_crash_reporting: is_release,
            enable_debug_menu: is_dev,
            enable_mock_wallet: is_dev,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Application display name, shown by wallets in the authorization prompt
    pub app_name: String,

    /// Application origin URI presented to wallets as the dapp identity
    pub app_uri: String,

    /// Icon URL presented to wallets alongside the identity
    pub app_icon: String,

    /// Build variant (development / preview / production / dapp store)
    pub app_variant: AppVariant,

    /// Target Solana cluster for authorization and RPC
    pub cluster: Cluster,

    /// Custom RPC endpoint URL; falls back to the cluster's public endpoint
    pub rpc_endpoint: Option<String>,

    /// Application version string
    pub version: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every field has a default, so an empty environment yields a working
    /// mainnet configuration with the stock app identity.
    pub fn from_env() -> Result<Self> {
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "ASDF Ecosystem".to_string());

        let app_uri =
            env::var("APP_URI").unwrap_or_else(|_| "https://asdf-web.onrender.com".to_string());

        let app_icon = env::var("APP_ICON")
            .unwrap_or_else(|_| "https://asdf-web.onrender.com/icons/icon-512x512.png".to_string());

        let app_variant = AppVariant::parse(
            &env::var("APP_VARIANT").unwrap_or_else(|_| "development".to_string()),
        );

        let cluster = Cluster::parse(
            &env::var("SOLANA_NETWORK").unwrap_or_else(|_| "mainnet-beta".to_string()),
        )?;

        let rpc_endpoint = env::var("RPC_ENDPOINT").ok().filter(|v| !v.is_empty());

        Ok(Self {
            app_name,
            app_uri,
            app_icon,
            app_variant,
            cluster,
            rpc_endpoint,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Validate configuration values against identity and endpoint rules.
    pub fn validate(&self) -> Result<()> {
        if self.app_name.trim().is_empty() {
            return Err(AppError::Config("APP_NAME must not be empty".to_string()));
        }

        if !self.app_uri.starts_with("https://") {
            return Err(AppError::Config(
                "APP_URI must be an https:// URL".to_string(),
            ));
        }

        if !self.app_icon.starts_with("https://") {
            return Err(AppError::Config(
                "APP_ICON must be an https:// URL".to_string(),
            ));
        }

        if let Some(endpoint) = &self.rpc_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "RPC_ENDPOINT must be an http(s) URL (got '{}')",
                    endpoint
                )));
            }
        }

        Ok(())
    }

    /// Feature switches for this configuration's build variant.
    pub fn features(&self) -> Features {
        Features::for_variant(self.app_variant)
    }

    /// Effective RPC endpoint: the configured override, or the cluster default.
    pub fn rpc_url(&self) -> String {
        self.rpc_endpoint
            .clone()
            .unwrap_or_else(|| self.cluster.default_rpc_url().to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "ASDF Ecosystem".to_string(),
            app_uri: "https://asdf-web.onrender.com".to_string(),
            app_icon: "https://asdf-web.onrender.com/icons/icon-512x512.png".to_string(),
            app_variant: AppVariant::Development,
            cluster: Cluster::MainnetBeta,
            rpc_endpoint: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cluster, Cluster::MainnetBeta);
        assert_eq!(config.rpc_url(), "https://api.mainnet-beta.solana.com");
    }

    #[test]
    fn test_cluster_parse() {
        assert_eq!(Cluster::parse("devnet").unwrap(), Cluster::Devnet);
        assert_eq!(Cluster::parse("testnet").unwrap(), Cluster::Testnet);
        assert!(Cluster::parse("localnet").is_err());
    }

    #[test]
    fn test_cluster_names_round_trip() {
        for cluster in [Cluster::MainnetBeta, Cluster::Devnet, Cluster::Testnet] {
            assert_eq!(Cluster::parse(cluster.name()).unwrap(), cluster);
        }
    }

    #[test]
    fn test_unknown_variant_falls_back_to_development() {
        assert_eq!(AppVariant::parse("canary"), AppVariant::Development);
        assert_eq!(AppVariant::parse("dapp"), AppVariant::DappStore);
    }

    #[test]
    fn test_rpc_endpoint_override() {
        let config = Config {
            rpc_endpoint: Some("https://rpc.example.com".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.rpc_url(), "https://rpc.example.com");
    }

    #[test]
    fn test_validate_rejects_non_https_identity() {
        let config = Config {
            app_uri: "ftp://asdf-web.onrender.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_feature_flags_by_variant() {
        let dev = Features::for_variant(AppVariant::Development);
        assert!(dev.enable_mock_wallet);
        assert!(dev.enable_debug_menu);
        assert!(!dev.enable_analytics);

        let prod = Features::for_variant(AppVariant::Production);
        assert!(!prod.enable_mock_wallet);
        assert!(!prod.enable_debug_menu);
        assert!(prod.enable_analytics);
        assert!(prod.enable_crash_reporting);

        let preview = Features::for_variant(AppVariant::Preview);
        assert!(!preview.enable_analytics);
        assert!(!preview.enable_mock_wallet);
    }
}
