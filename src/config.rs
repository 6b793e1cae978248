//! Project configuration for the command-line tool
//!
//! A project keeps a `Solstage.toml` at its root:
//!
//! ```toml
//! [project]
//! name = "escrow"
//! space = 80000
//! out_dir = "target"
//! provider = "local"
//!
//! [providers.local]
//! cluster = "localnet"
//! wallet = "~/.config/solana/id.json"
//! loader_id = "7dVc2Js9eWqh4KrXp5mTzBNfQaU3RyGbE6MuHtnLoSkD"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "Solstage.toml";

/// A project's full configuration
#[derive(Debug, Deserialize)]
pub struct StageConfig {
    /// The project being staged
    pub project: Project,
    /// Named provider endpoints; `project.provider` selects one
    pub providers: HashMap<String, Provider>,
}

/// The staged program itself
#[derive(Debug, Deserialize)]
pub struct Project {
    /// Program name; doubles as the bytecode account handle
    pub name: String,
    /// Allocation size of the bytecode account, in bytes
    pub space: u64,
    /// Upload chunk size override
    #[serde(default)]
    pub chunk_size: Option<usize>,
    /// Where compiled bytecode and interface descriptions land
    pub out_dir: PathBuf,
    /// Key of the provider to use
    pub provider: String,
}

/// One ledger endpoint and the identity used against it
#[derive(Debug, Deserialize)]
pub struct Provider {
    /// Cluster name (`localnet`, `devnet`, `testnet`, `mainnet-beta`) or a
    /// raw RPC URL
    pub cluster: String,
    /// Path to the authority keypair file
    pub wallet: String,
    /// Address of the loader program on this cluster
    pub loader_id: String,
}

impl StageConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> anyhow::Result<StageConfig> {
        Ok(toml::from_str(text)?)
    }

    /// Read the config file from a project directory
    pub fn read(dir: &Path) -> anyhow::Result<StageConfig> {
        let path = dir.join(CONFIG_FILE);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        StageConfig::from_toml(&text)
    }

    /// The provider the project selects
    pub fn provider(&self) -> anyhow::Result<&Provider> {
        self.providers.get(&self.project.provider).ok_or_else(|| {
            anyhow::anyhow!(
                "no provider config with key {:?}",
                self.project.provider
            )
        })
    }
}

impl Provider {
    /// RPC URL for this provider's cluster
    pub fn url(&self) -> String {
        match self.cluster.as_str() {
            "localnet" => "http://127.0.0.1:8899".to_string(),
            "devnet" => "https://api.devnet.solana.com".to_string(),
            "testnet" => "https://api.testnet.solana.com".to_string(),
            "mainnet-beta" => "https://api.mainnet-beta.solana.com".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [project]
        name = "escrow"
        space = 80000
        out_dir = "target"
        provider = "local"

        [providers.local]
        cluster = "localnet"
        wallet = "~/.config/solana/id.json"
        loader_id = "7dVc2Js9eWqh4KrXp5mTzBNfQaU3RyGbE6MuHtnLoSkD"
    "#;

    #[test]
    fn test_parse_and_select_provider() {
        let config = StageConfig::from_toml(EXAMPLE).unwrap();
        assert_eq!(config.project.name, "escrow");
        assert_eq!(config.project.space, 80000);
        assert_eq!(config.project.chunk_size, None);

        let provider = config.provider().unwrap();
        assert_eq!(provider.url(), "http://127.0.0.1:8899");
    }

    #[test]
    fn test_unknown_provider_key() {
        let text = EXAMPLE.replace("provider = \"local\"", "provider = \"devnet\"");
        let config = StageConfig::from_toml(&text).unwrap();
        assert!(config.provider().is_err());
    }

    #[test]
    fn test_raw_url_cluster_passthrough() {
        let provider = Provider {
            cluster: "http://10.0.0.7:8899".to_string(),
            wallet: String::new(),
            loader_id: String::new(),
        };
        assert_eq!(provider.url(), "http://10.0.0.7:8899");
    }
}
