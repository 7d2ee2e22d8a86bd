//! # rawdatafile - Raw Detector Data File Index
//!
//! `rawdatafile` indexes files written by a detector data-acquisition
//! system. A file is a hierarchy of groups and datasets: one group per
//! logical record (a trigger record or a time slice), and inside it one
//! header dataset plus one dataset per detector fragment.
//!
//! ## Key Features
//!
//! - **Two schema eras**: files up to layout version 2 are navigated through
//!   path naming conventions; newer files carry JSON source-id metadata on
//!   the root, record groups and datasets.
//!
//! - **Lazy per-record caches**: nothing about a record is read until it is
//!   queried, and then everything is resolved in one pass.
//!
//! - **Typed identifiers**: records, sources, geometric ids, fragment types
//!   and subdetectors all have their own types.
//!
//! - **Pluggable payloads**: fragment and header bytes are handed to a
//!   [`payload::PayloadParser`]; the default keeps them as raw [`bytes::Bytes`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rawdatafile::prelude::*;
//!
//! let mut file = RawDataFile::open("run012345_0000.json")?;
//! println!("{}", file.summary()?);
//!
//! for rid in file.get_all_trigger_record_ids()? {
//!     let record = file.get_trigger_record(rid)?;
//!     println!("{}: {} fragments", rid, record.fragments.len());
//!
//!     for geo_id in file.get_geo_ids_for_subdetector(rid, Subdetector::HD_TPC)? {
//!         let owner = file.get_source_id_for_geo_id(rid, geo_id)?;
//!         println!("  geo id {:#x} read out by {}", geo_id, owner);
//!     }
//! }
//! # Ok::<(), rawdatafile::index::IndexError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ids`]: record, source, geometric and classification identifiers
//! - [`container`]: hierarchical storage access and the in-memory/JSON container
//! - [`layout`]: naming conventions and schema version of a file
//! - [`resolver`]: source-id metadata extraction from a record group
//! - [`payload`]: payload parser seam and record aggregates
//! - [`index`]: the [`index::RawDataFile`] index and its query surface
//!
//! ## Root Attributes
//!
//! | Attribute | Type | Description |
//! |-----------|------|-------------|
//! | `filelayout_params` | JSON string | [`layout::FileLayoutParams`] |
//! | `filelayout_version` | integer | Schema version, 0 when absent |
//! | `record_type` | string | `TriggerRecord` or `TimeSlice` |
//! | `recorded_size` | integer | File size in bytes (optional) |
//! | `source_id_geo_id_map` | JSON string | File-level geometric ids (version > 2) |

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod container;
pub mod ids;
pub mod index;
pub mod layout;
pub mod payload;
pub mod resolver;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::container::{Container, ContainerError, MemoryContainer};
    pub use crate::ids::{
        FragmentType, GeoId, RecordId, RecordKind, SourceId, Subdetector, Subsystem,
    };
    pub use crate::index::{FileSummary, IndexConfig, IndexError, RawDataFile, SchemaEra};
    pub use crate::layout::{FileLayout, FileLayoutParams};
    pub use crate::payload::{OpaquePayloads, PayloadParser, TimeSlice, TriggerRecord};
}
