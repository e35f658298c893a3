// src/config/network.rs
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

const MAINNET_ENDPOINTS: &[&str] = &[
    "https://hyperion.wax.eosdetroit.io",
    "https://wax.eosusa.io",
    "https://api.wax.alohaeos.com",
    "https://hyperion-wax-mainnet.wecan.dev",
];

const TESTNET_ENDPOINTS: &[&str] = &[
    "https://hyperion-wax-testnet.wecan.dev",
    "https://hyperion.testnet.wax.detroitledger.tech",
    "https://testnet.waxsweden.org",
    "https://api.waxtest.alohaeos.com",
    "https://waxtest.api.eosnation.io",
];

/// Which WAX chain is watched. Picks the provider list and the explorer host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn default_endpoints(self) -> Vec<String> {
        let list = match self {
            Network::Mainnet => MAINNET_ENDPOINTS,
            Network::Testnet => TESTNET_ENDPOINTS,
        };
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Public block explorer host used for transaction links.
    pub fn explorer_host(self) -> &'static str {
        match self {
            Network::Mainnet => "wax.bloks.io",
            Network::Testnet => "wax-test.bloks.io",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
