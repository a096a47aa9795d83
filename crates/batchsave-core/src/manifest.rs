//! JSON job manifests: what to transfer and how to name the result.
//!
//! ```json
//! {
//!   "job_name": "Trip 2024",
//!   "base_url": "https://cdn.example.com/media/",
//!   "units": [{ "source_key": "k1", "display_name": "a.jpg" }]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::job::{TransferJob, TransferUnit};
use crate::network::NetworkQualityProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub job_name: String,
    /// Source keys are joined onto this URL; absent means the keys are full URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub units: Vec<TransferUnit>,
}

impl Manifest {
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("parse manifest {}", path.display()))
    }

    /// Builds the job, sizing concurrency from the network quality provider.
    pub fn into_job(self, network: Option<&dyn NetworkQualityProvider>) -> TransferJob {
        TransferJob::for_network(self.units, self.job_name, network)
    }
}
