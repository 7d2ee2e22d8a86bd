//! Identifier types shared by every layer of the index.
//!
//! - [`RecordId`]: (record number, sequence number) of a trigger record or time slice
//! - [`SourceId`]: (subsystem, id) origin of a fragment or record header
//! - [`GeoId`]: opaque geometric location, low 16 bits hold the [`Subdetector`]
//! - [`FragmentType`] / [`Subdetector`]: open numeric classification tags

mod record_id;
mod source_id;
mod tags;


pub use record_id::RecordId;
pub use source_id::{SourceId, Subsystem, UnknownSubsystem};
pub use tags::{geo_id_subdetector, FragmentType, GeoId, RecordKind, Subdetector};
