//! Public cluster endpoints.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cluster {
    MainnetBeta,
    Testnet,
    #[default]
    Devnet,
    /// A local test validator.
    Localnet,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet-beta" | "mainnet" => Ok(Self::MainnetBeta),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" | "localhost" => Ok(Self::Localnet),
            other => Err(format!("unknown cluster {other:?}")),
        }
    }
}

/// JSON-RPC URL of `cluster`. `tls` picks https over http; the local
/// validator is always plain http.
pub fn cluster_api_url(cluster: Cluster, tls: bool) -> String {
    let scheme = if tls { "https" } else { "http" };
    match cluster {
        Cluster::MainnetBeta => format!("{scheme}://api.mainnet-beta.solana.com"),
        Cluster::Testnet => format!("{scheme}://api.testnet.solana.com"),
        Cluster::Devnet => format!("{scheme}://api.devnet.solana.com"),
        Cluster::Localnet => "http://127.0.0.1:8899".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        assert_eq!(cluster_api_url(Cluster::Devnet, true), "https://api.devnet.solana.com");
        assert_eq!(cluster_api_url(Cluster::Testnet, false), "http://api.testnet.solana.com");
        assert_eq!(
            cluster_api_url(Cluster::MainnetBeta, true),
            "https://api.mainnet-beta.solana.com"
        );
        assert_eq!(cluster_api_url(Cluster::Localnet, true), "http://127.0.0.1:8899");
        assert_eq!(cluster_api_url(Cluster::default(), true), "https://api.devnet.solana.com");
    }

    #[test]
    fn parse_names() {
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::MainnetBeta);
        assert_eq!(Cluster::Testnet.to_string().parse::<Cluster>().unwrap(), Cluster::Testnet);
        assert!("moonnet".parse::<Cluster>().is_err());
    }
}
