//! # Layout Descriptor
//!
//! Decodes a file's schema-version-specific naming conventions: how record
//! numbers map to group paths, what the record header dataset is called and
//! how legacy layouts name each subsystem's fragment groups.
//!
//! Construction never fails. Files that predate the layout metadata get
//! version 0 with [`FileLayoutParams::default`].

mod params;


pub use params::{FileLayoutParams, PathParams};

use crate::container::{join_path, path_elements};
use crate::ids::{RecordId, SourceId, Subsystem};

/// Largest schema version the index accepts
pub const MAX_FILELAYOUT_VERSION: u32 = u32::MAX;

/// Oldest schema version that declares its record type and supports
/// lookups by source id
pub const MIN_SOURCE_ID_VERSION: u32 = 2;

/// Newest schema version that uses path-derived (legacy) lookups
pub const LAST_LEGACY_VERSION: u32 = 2;

/// Immutable naming conventions of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLayout {
    params: FileLayoutParams,
    version: u32,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self::new(FileLayoutParams::default(), 0)
    }
}

impl FileLayout {
    /// Build a descriptor from a parameter set and schema version
    pub fn new(params: FileLayoutParams, version: u32) -> Self {
        Self { params, version }
    }

    /// Schema version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Parameter set
    pub fn params(&self) -> &FileLayoutParams {
        &self.params
    }

    /// Record-type tag expected for this layout
    pub fn record_name_prefix(&self) -> &str {
        &self.params.record_name_prefix
    }

    /// Name of the record header dataset
    pub fn record_header_dataset_name(&self) -> &str {
        &self.params.record_header_dataset_name
    }

    /// Name of the record group, relative to the root
    pub fn record_number_string(&self, record_number: u64, sequence_number: u32) -> String {
        let mut name = format!(
            "{}{:0width$}",
            self.params.record_name_prefix,
            record_number,
            width = self.params.digits_for_record_number
        );
        if self.params.digits_for_sequence_number > 0 {
            name.push_str(&format!(
                ".{:0width$}",
                sequence_number,
                width = self.params.digits_for_sequence_number
            ));
        }
        name
    }

    /// Absolute path of a record's group
    pub fn record_group_path(&self, rid: RecordId) -> String {
        format!(
            "/{}",
            self.record_number_string(rid.record_number, rid.sequence_number)
        )
    }

    /// Path of the record header dataset, relative to the root
    pub fn record_header_path(&self, record_number: u64, sequence_number: u32) -> String {
        format!(
            "{}/{}",
            self.record_number_string(record_number, sequence_number),
            self.params.record_header_dataset_name
        )
    }

    /// Naming entry for a subsystem
    pub fn path_params(&self, subsystem: Subsystem) -> Option<&PathParams> {
        self.params
            .path_param_list
            .iter()
            .find(|p| p.subsystem() == Some(subsystem))
    }

    /// Group holding one subsystem's fragments in a legacy record, relative
    /// to the root
    pub fn fragment_type_path(
        &self,
        record_number: u64,
        sequence_number: u32,
        subsystem: Subsystem,
    ) -> String {
        self.fragment_type_path_in(
            &self.record_number_string(record_number, sequence_number),
            subsystem,
        )
    }

    /// Group holding one subsystem's fragments below an existing record
    /// group path. Subsystems without path params use their own name.
    pub fn fragment_type_path_in(&self, record_group: &str, subsystem: Subsystem) -> String {
        let group = self
            .path_params(subsystem)
            .map(|p| p.detector_group_name.as_str())
            .unwrap_or_else(|| subsystem.name());
        join_path(record_group, group)
    }

    /// Dataset path of one fragment in a legacy record, relative to the root
    pub fn fragment_path(
        &self,
        record_number: u64,
        sequence_number: u32,
        source_id: SourceId,
    ) -> String {
        let type_path = self.fragment_type_path(record_number, sequence_number, source_id.subsystem);
        match self.path_params(source_id.subsystem) {
            Some(p) => format!(
                "{}/{}{:0width$}",
                type_path,
                p.element_name_prefix,
                source_id.id,
                width = p.digits_for_element_number
            ),
            None => format!("{}/{}", type_path, source_id.id),
        }
    }

    /// Recover the source id a legacy dataset path encodes.
    ///
    /// The record header dataset maps to `(TR_Builder, 0)`. Returns `None`
    /// for paths that do not follow the layout.
    pub fn source_id_from_path_elements(&self, elements: &[&str]) -> Option<SourceId> {
        let (&last, parents) = elements.split_last()?;
        if last == self.params.record_header_dataset_name {
            return Some(Self::legacy_header_source_id());
        }

        let &group = parents.last()?;
        let params = self
            .params
            .path_param_list
            .iter()
            .find(|p| p.detector_group_name == group)?;
        let subsystem = params.subsystem()?;
        let digits = last.strip_prefix(params.element_name_prefix.as_str())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(SourceId::new(subsystem, digits.parse().ok()?))
    }

    /// Same as [`source_id_from_path_elements`](Self::source_id_from_path_elements)
    /// for a `/`-separated path
    pub fn source_id_from_path(&self, path: &str) -> Option<SourceId> {
        self.source_id_from_path_elements(&path_elements(path))
    }

    /// Source id given to record headers in legacy layouts
    pub fn legacy_header_source_id() -> SourceId {
        SourceId::new(Subsystem::TrBuilder, 0)
    }

    /// True when lookups derive from path conventions rather than the
    /// per-record source id index
    pub fn is_legacy(&self) -> bool {
        self.version <= LAST_LEGACY_VERSION
    }
}
