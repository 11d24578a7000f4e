use std::path::Path;

use anyhow::{Context, Result};
use common::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};

use super::Parameters;

/// An immutable, versioned snapshot of the network's parameters. Bundles are exchanged
/// whole and never patched in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightBundle {
    #[serde(default)]
    pub version: u64,
    #[serde(flatten)]
    pub parameters: Parameters,
}

impl WeightBundle {
    pub fn new(parameters: Parameters, version: u64) -> Self {
        Self {
            version,
            parameters,
        }
    }

    /// Reads and validates a bundle. Nothing is returned unless every array parsed and has a
    /// consistent shape.
    pub fn read(path: &Path) -> Result<Self> {
        let bundle: Self = read_json(path)?;
        bundle
            .validate()
            .with_context(|| format!("Invalid weight bundle at {:?}", path))?;

        Ok(bundle)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self)
            .with_context(|| format!("Failed to write weight bundle to {:?}", path))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bundle: Self = serde_json::from_slice(bytes).context("Failed to parse weight bundle")?;
        bundle.validate()?;

        Ok(bundle)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()
    }

    pub fn matches_dimensions(&self, input_size: usize, policy_size: usize) -> bool {
        self.parameters.input_size() == input_size && self.parameters.policy_size() == policy_size
    }
}
