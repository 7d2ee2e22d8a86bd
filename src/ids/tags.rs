use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque detector-geometry location
pub type GeoId = u64;

/// Extract the subdetector tag carried in the low 16 bits of a geometric id
#[inline]
pub fn geo_id_subdetector(geo_id: GeoId) -> Subdetector {
    Subdetector((geo_id & 0xffff) as u16)
}

/// Subdetector classification tag.
///
/// Kept as an open numeric tag: files may carry values this crate does not
/// name, and those still group and compare correctly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Subdetector(pub u16);

#[allow(missing_docs)]
impl Subdetector {
    pub const UNKNOWN: Subdetector = Subdetector(0);
    pub const DAQ: Subdetector = Subdetector(1);
    pub const HD_PDS: Subdetector = Subdetector(2);
    pub const HD_TPC: Subdetector = Subdetector(3);
    pub const HD_CRT: Subdetector = Subdetector(4);
    pub const VD_CATHODE_PDS: Subdetector = Subdetector(8);
    pub const VD_MEMBRANE_PDS: Subdetector = Subdetector(9);
    pub const VD_BOTTOM_TPC: Subdetector = Subdetector(10);
    pub const VD_TOP_TPC: Subdetector = Subdetector(11);
    pub const ND_LAR: Subdetector = Subdetector(32);
    pub const ND_GAR: Subdetector = Subdetector(33);
}

impl fmt::Display for Subdetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subdetector {}", self.0)
    }
}

/// Fragment payload type tag
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FragmentType(pub u32);

#[allow(missing_docs)]
impl FragmentType {
    pub const UNKNOWN: FragmentType = FragmentType(0);
    pub const PROTO_WIB: FragmentType = FragmentType(1);
    pub const WIB: FragmentType = FragmentType(2);
    pub const DAPHNE: FragmentType = FragmentType(3);
    pub const TDE_AMC: FragmentType = FragmentType(4);
    pub const FW_TRIGGER_PRIMITIVE: FragmentType = FragmentType(5);
    pub const TRIGGER_PRIMITIVE: FragmentType = FragmentType(6);
    pub const TRIGGER_ACTIVITY: FragmentType = FragmentType(7);
    pub const TRIGGER_CANDIDATE: FragmentType = FragmentType(8);
    pub const HARDWARE_SIGNAL: FragmentType = FragmentType(9);
    pub const WIB_ETH: FragmentType = FragmentType(12);
}

impl fmt::Display for FragmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fragment type {}", self.0)
    }
}

/// Kind of record a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Triggered readout windows
    TriggerRecord,
    /// Continuous time slices
    TimeSlice,
}

impl RecordKind {
    /// Record-name prefix used for files of this kind
    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::TriggerRecord => "TriggerRecord",
            RecordKind::TimeSlice => "TimeSlice",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
