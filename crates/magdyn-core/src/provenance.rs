//! Provenance descriptors attached to serialized reports.

use serde::{Deserialize, Serialize};

use crate::config::CorrelationConfig;
use crate::errors::MagdynError;
use crate::serde::stable_hash_string;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance information attached to every momentum report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Schema of the report payload.
    pub schema_version: SchemaVersion,
    /// Hash of the configuration used to produce the data.
    pub config_hash: String,
    /// Version of the producing crate.
    pub tool_version: String,
}

impl RunProvenance {
    /// Builds provenance for a configuration.
    pub fn for_config(
        config: &CorrelationConfig,
        tool_version: &str,
    ) -> Result<Self, MagdynError> {
        Ok(Self {
            schema_version: SchemaVersion::default(),
            config_hash: stable_hash_string(config)?,
            tool_version: tool_version.to_string(),
        })
    }
}
