//! JSON shapes of the source-id metadata attributes written by indexed
//! (version > 2) files.

use serde::{Deserialize, Serialize};

use crate::ids::{FragmentType, GeoId, SourceId, Subdetector, Subsystem};

/// Attribute on the root and on record groups: source id → geometric ids
pub const SOURCE_ID_GEO_ID_MAP: &str = "source_id_geo_id_map";
/// Attribute on a record group: source id of the record header
pub const RECORD_HEADER_SOURCE_ID: &str = "record_header_source_id";
/// Attribute on a record group: fragment type → source ids
pub const FRAGMENT_TYPE_SOURCE_ID_MAP: &str = "fragment_type_source_id_map";
/// Attribute on a record group: subdetector → source ids
pub const SUBDETECTOR_SOURCE_ID_MAP: &str = "subdetector_source_id_map";
/// Attribute on a fragment or header dataset: its source id
pub const DATASET_SOURCE_ID: &str = "source_id";

/// One entry of a `source_id_geo_id_map` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoIdEntry {
    /// Subsystem of the owning source id
    pub subsys: Subsystem,
    /// Id of the owning source id
    pub id: u32,
    /// Geometric ids served by this source
    #[serde(default)]
    pub geoids: Vec<GeoId>,
}

impl GeoIdEntry {
    /// Owning source id
    pub fn source_id(&self) -> SourceId {
        SourceId::new(self.subsys, self.id)
    }
}

/// One entry of a `fragment_type_source_id_map` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentTypeEntry {
    /// Fragment type tag
    pub fragment_type: FragmentType,
    /// Sources producing fragments of this type
    #[serde(default)]
    pub sourceids: Vec<SourceId>,
}

/// One entry of a `subdetector_source_id_map` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdetectorEntry {
    /// Subdetector tag
    pub subdetector: Subdetector,
    /// Sources belonging to this subdetector
    #[serde(default)]
    pub sourceids: Vec<SourceId>,
}
