//! Network quality hint and the concurrency it maps to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Effective connection type reported by the client, or `Unknown` when unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NetworkQuality {
    #[serde(rename = "4g")]
    Fast4g,
    #[serde(rename = "3g")]
    Medium3g,
    #[serde(rename = "2g")]
    Slow2g,
    #[serde(rename = "slow-2g")]
    VerySlow2g,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl NetworkQuality {
    /// Fetch concurrency for this connection class.
    pub fn concurrency_limit(self) -> usize {
        match self {
            NetworkQuality::Fast4g => 5,
            NetworkQuality::Medium3g => 2,
            NetworkQuality::Slow2g | NetworkQuality::VerySlow2g => 1,
            NetworkQuality::Unknown => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkQuality::Fast4g => "4g",
            NetworkQuality::Medium3g => "3g",
            NetworkQuality::Slow2g => "2g",
            NetworkQuality::VerySlow2g => "slow-2g",
            NetworkQuality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NetworkQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4g" => Ok(NetworkQuality::Fast4g),
            "3g" => Ok(NetworkQuality::Medium3g),
            "2g" => Ok(NetworkQuality::Slow2g),
            "slow-2g" => Ok(NetworkQuality::VerySlow2g),
            "unknown" | "" => Ok(NetworkQuality::Unknown),
            other => Err(format!(
                "unknown network quality '{}' (expected 4g, 3g, 2g, slow-2g or unknown)",
                other
            )),
        }
    }
}

/// Source of the network quality hint.
pub trait NetworkQualityProvider: Send + Sync {
    fn network_quality(&self) -> NetworkQuality;
}

/// Provider returning a fixed value (from config or a CLI flag).
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNetworkQuality(pub NetworkQuality);

impl NetworkQualityProvider for StaticNetworkQuality {
    fn network_quality(&self) -> NetworkQuality {
        self.0
    }
}

/// Absent provider means `Unknown`.
pub fn concurrency_from(provider: Option<&dyn NetworkQualityProvider>) -> usize {
    provider
        .map(|p| p.network_quality())
        .unwrap_or_default()
        .concurrency_limit()
}
