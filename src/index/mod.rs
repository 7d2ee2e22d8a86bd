//! # Raw Data File Index
//!
//! [`RawDataFile`] turns the group/dataset hierarchy of one raw data file into
//! typed, queryable records: trigger records or time slices, their fragments,
//! and the source ids and geometric ids that describe where each fragment
//! came from.
//!
//! ## Caching
//!
//! - The file layout and the file-level geometric id map are read once, at
//!   construction.
//! - The set of record ids is scanned on first use and kept.
//! - Everything known about one record is resolved together, the first time
//!   any of it is needed, into a single [`RecordCacheEntry`]. Entries are never
//!   evicted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rawdatafile::index::RawDataFile;
//! use rawdatafile::ids::Subsystem;
//!
//! let mut file = RawDataFile::open("run012345_0000.json")?;
//!
//! for rid in file.get_all_record_ids()? {
//!     let readout = file.get_source_ids_for_subsystem(rid, Subsystem::DetectorReadout)?;
//!     println!("Record {}: {} readout fragments", rid, readout.len());
//! }
//! # Ok::<(), rawdatafile::index::IndexError>(())
//! ```

mod cache;
mod config;
mod error;
mod objects;
mod open;
mod paths;
mod queries;
mod records;
mod summary;

#[cfg(test)]
mod tests;

pub use cache::RecordCacheEntry;
pub use config::IndexConfig;
pub use error::IndexError;
pub use summary::FileSummary;

use std::collections::BTreeMap;

use crate::ids::RecordId;
use crate::layout::{FileLayout, LAST_LEGACY_VERSION};
use crate::payload::OpaquePayloads;
use crate::resolver::SourceIdGeoIdMap;

/// Root attribute: recorded file size in bytes (optional)
pub const RECORDED_SIZE: &str = "recorded_size";
/// Root attribute: JSON-encoded [`FileLayoutParams`](crate::layout::FileLayoutParams)
pub const FILELAYOUT_PARAMS: &str = "filelayout_params";
/// Root attribute: schema version
pub const FILELAYOUT_VERSION: &str = "filelayout_version";
/// Root attribute: record type tag (`TriggerRecord` or `TimeSlice`)
pub const RECORD_TYPE: &str = "record_type";

/// How dataset paths are derived, fixed by the schema version at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaEra {
    /// Version ≤ 2: paths follow the layout's naming convention and are
    /// found by walking record groups
    LegacyPaths,
    /// Version > 2: paths come from the per-record source id index
    SourceIdIndexed,
}

impl SchemaEra {
    /// Era used by files of the given schema version
    pub fn for_version(version: u32) -> Self {
        if version <= LAST_LEGACY_VERSION {
            SchemaEra::LegacyPaths
        } else {
            SchemaEra::SourceIdIndexed
        }
    }
}

/// Index over one raw data file.
///
/// The index exclusively owns its container. Queries take `&mut self`
/// because they may populate caches; already-populated entries can be read
/// through [`cached_entry`](RawDataFile::cached_entry) with a shared borrow.
pub struct RawDataFile<C, P = OpaquePayloads> {
    container: C,
    parser: P,
    config: IndexConfig,
    layout: FileLayout,
    era: SchemaEra,
    recorded_size: u64,
    record_type: String,
    file_level_geo_ids: SourceIdGeoIdMap,
    /// Record id → record group name, filled by the first enumeration
    record_groups: Option<BTreeMap<RecordId, String>>,
    record_cache: BTreeMap<RecordId, RecordCacheEntry>,
}

impl<C, P> RawDataFile<C, P> {
    /// Recorded file size, 0 when the file does not carry one
    pub fn recorded_size(&self) -> u64 {
        self.recorded_size
    }

    /// Schema version
    pub fn version(&self) -> u32 {
        self.layout.version()
    }

    /// Declared record type, or the layout's prefix when undeclared
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// File layout descriptor
    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    /// Path-derivation era
    pub fn era(&self) -> SchemaEra {
        self.era
    }

    /// Index configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// File-level source id → geometric id map
    pub fn file_level_geo_ids(&self) -> &SourceIdGeoIdMap {
        &self.file_level_geo_ids
    }

    /// Payload parser
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Cache entry of a record that has already been resolved
    pub fn cached_entry(&self, rid: RecordId) -> Option<&RecordCacheEntry> {
        self.record_cache.get(&rid)
    }

    /// Number of records resolved so far
    pub fn cached_record_count(&self) -> usize {
        self.record_cache.len()
    }

    /// Give up the index and return the container
    pub fn into_container(self) -> C {
        self.container
    }
}
