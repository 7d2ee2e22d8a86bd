use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hardware/software subsystem that produced a fragment or header
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum Subsystem {
    /// Unknown or unset subsystem
    Unknown,
    /// Detector readout electronics
    DetectorReadout,
    /// Hardware signals interface
    HwSignalsInterface,
    /// Data selection / trigger
    Trigger,
    /// Trigger record builder (owner of record headers)
    TrBuilder,
}

impl Subsystem {
    /// Every concrete (non-`Unknown`) subsystem, in tag order
    pub const ALL: [Subsystem; 4] = [
        Subsystem::DetectorReadout,
        Subsystem::HwSignalsInterface,
        Subsystem::Trigger,
        Subsystem::TrBuilder,
    ];

    /// Numeric tag as stored on disk
    pub fn as_u32(self) -> u32 {
        match self {
            Subsystem::Unknown => 0,
            Subsystem::DetectorReadout => 1,
            Subsystem::HwSignalsInterface => 2,
            Subsystem::Trigger => 3,
            Subsystem::TrBuilder => 4,
        }
    }

    /// Decode a numeric tag; unrecognised values map to `Unknown`
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Subsystem::DetectorReadout,
            2 => Subsystem::HwSignalsInterface,
            3 => Subsystem::Trigger,
            4 => Subsystem::TrBuilder,
            _ => Subsystem::Unknown,
        }
    }

    /// Canonical name used in group paths and dataset names
    pub fn name(self) -> &'static str {
        match self {
            Subsystem::Unknown => "Unknown",
            Subsystem::DetectorReadout => "Detector_Readout",
            Subsystem::HwSignalsInterface => "HW_Signals_Interface",
            Subsystem::Trigger => "Trigger",
            Subsystem::TrBuilder => "TR_Builder",
        }
    }
}

impl From<Subsystem> for u32 {
    fn from(value: Subsystem) -> Self {
        value.as_u32()
    }
}

impl From<u32> for Subsystem {
    fn from(value: u32) -> Self {
        Subsystem::from_u32(value)
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a subsystem name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subsystem name: {0}")]
pub struct UnknownSubsystem(pub String);

impl FromStr for Subsystem {
    type Err = UnknownSubsystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(Subsystem::Unknown),
            "Detector_Readout" => Ok(Subsystem::DetectorReadout),
            "HW_Signals_Interface" => Ok(Subsystem::HwSignalsInterface),
            "Trigger" => Ok(Subsystem::Trigger),
            "TR_Builder" => Ok(Subsystem::TrBuilder),
            other => Err(UnknownSubsystem(other.to_string())),
        }
    }
}

/// Origin of one fragment or header within a record.
///
/// The default value is the "empty" source identifier: `Unknown` subsystem
/// with the invalid id. It is returned by lookups that find no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId {
    /// Subsystem tag
    #[serde(rename = "subsys")]
    pub subsystem: Subsystem,
    /// Identifier within the subsystem
    pub id: u32,
}

impl SourceId {
    /// Id carried by the empty source identifier
    pub const INVALID_ID: u32 = u32::MAX;

    /// Create a source identifier
    pub const fn new(subsystem: Subsystem, id: u32) -> Self {
        Self { subsystem, id }
    }

    /// The empty source identifier
    pub const fn empty() -> Self {
        Self::new(Subsystem::Unknown, Self::INVALID_ID)
    }

    /// True for the empty source identifier
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Decode a dataset name of the form `<SubsystemName>_0x<hex id>[_suffix]`.
    pub fn from_dataset_name(name: &str) -> Option<Self> {
        let (subsystem_name, rest) = name.split_once("_0x")?;
        let subsystem = subsystem_name.parse().ok()?;
        let hex = rest.split('_').next()?;
        let id = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::new(subsystem, id))
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_0x{:08x}", self.subsystem, self.id)
    }
}
