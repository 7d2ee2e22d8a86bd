//! TOML configuration for the index.
//!
//! ```toml
//! # rawdatafile.toml
//! reverse_geo_index = true
//! strict_record_names = false
//! ```

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::IndexError;

/// Configuration for a [`RawDataFile`](super::RawDataFile)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Build a geometric id → source id map alongside each record cache entry.
    /// When disabled, reverse lookups scan the record's forward map.
    pub reverse_geo_index: bool,

    /// Fail on root children that carry the record prefix but do not parse
    /// as a record number, instead of skipping them.
    pub strict_record_names: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            reverse_geo_index: true,
            strict_record_names: false,
        }
    }
}

impl IndexConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| IndexError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        content.parse()
    }
}

impl FromStr for IndexConfig {
    type Err = IndexError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}
