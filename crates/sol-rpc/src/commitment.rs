//! Commitment levels: how settled a block must be before it is reported.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// Ordered by rank, so `Processed < Confirmed < Finalized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentLevel {
    /// The node's most recent block. May be skipped by the cluster.
    #[serde(alias = "recent")]
    Processed,
    /// Voted on by a supermajority of the cluster.
    #[serde(alias = "singleGossip")]
    Confirmed,
    /// Rooted by a supermajority of the cluster.
    #[default]
    #[serde(alias = "max", alias = "root")]
    Finalized,
}

impl CommitmentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CommitmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitmentLevel {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" | "recent" => Ok(Self::Processed),
            "confirmed" | "singleGossip" => Ok(Self::Confirmed),
            "finalized" | "max" | "root" => Ok(Self::Finalized),
            other => Err(RpcError::InvalidParams(format!(
                "unknown commitment level {other:?}"
            ))),
        }
    }
}
