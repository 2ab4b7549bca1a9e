// common/src/config.rs
use config::{Config as ConfigFile, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Central configuration for the API service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub api_server_addr: String,

    /// Root directory for per-key durable actor storage
    pub data_dir: String,

    // Wallet network / login handshake configuration
    pub auth: AuthConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Wallet network identifier (e.g. "testnet")
    pub network_id: String,
    /// JSON-RPC endpoint used to resolve signing keys for an account
    pub rpc_url: String,
    /// Symmetric freshness window for login tokens, in milliseconds.
    /// Tokens older than this, or issued further than this into the
    /// future, are rejected.
    pub token_expiry_ms: i64,
    /// Compare authorized keys byte-exact instead of by canonical string
    pub exact_key_compare: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_server_addr: "127.0.0.1:8080".to_string(),
            data_dir: "./data".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            network_id: "testnet".to_string(),
            rpc_url: "https://rpc.testnet.near.org".to_string(),
            token_expiry_ms: 10_000,
            exact_key_compare: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        // Build configuration
        let config = ConfigFile::builder()
            // Start with defaults
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add environment specific config
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Add a local config file for local overrides
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables with prefix "APP"
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Build and deserialize
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from environment variables directly (backward compatibility)
    pub fn from_env() -> Self {
        // Try to load from file first
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let api_server_addr = env::var("API_SERVER_ADDR")
                    .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

                let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

                let network_id =
                    env::var("WALLET_NETWORK_ID").unwrap_or_else(|_| "testnet".to_string());

                let rpc_url = env::var("WALLET_RPC_URL")
                    .unwrap_or_else(|_| "https://rpc.testnet.near.org".to_string());

                let token_expiry_ms = env::var("TOKEN_EXPIRY_MS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(10_000);

                let exact_key_compare = env::var("EXACT_KEY_COMPARE")
                    .map(|v| v.to_lowercase() == "true")
                    .unwrap_or(false);

                Self {
                    api_server_addr,
                    data_dir,
                    auth: AuthConfig {
                        network_id,
                        rpc_url,
                        token_expiry_ms,
                        exact_key_compare,
                    },
                }
            }
        }
    }
}
