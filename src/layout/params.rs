use serde::{Deserialize, Serialize};

use crate::ids::Subsystem;

/// Naming convention for the fragments of one subsystem (legacy layouts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParams {
    /// Subsystem name, e.g. `Detector_Readout`
    pub detector_group_type: String,
    /// Group holding this subsystem's fragments, e.g. `TPC`
    pub detector_group_name: String,
    /// Dataset name prefix, e.g. `Link`
    pub element_name_prefix: String,
    /// Zero padding applied to the element number
    #[serde(default = "default_digits_for_element_number")]
    pub digits_for_element_number: usize,
}

impl PathParams {
    fn new(subsystem: Subsystem, group: &str, prefix: &str) -> Self {
        Self {
            detector_group_type: subsystem.name().to_string(),
            detector_group_name: group.to_string(),
            element_name_prefix: prefix.to_string(),
            digits_for_element_number: default_digits_for_element_number(),
        }
    }

    /// Subsystem this entry describes, if its type name is recognised
    pub fn subsystem(&self) -> Option<Subsystem> {
        self.detector_group_type.parse().ok()
    }
}

/// Schema-version parameter set stored in the `filelayout_params` attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLayoutParams {
    /// Prefix of record group names (`TriggerRecord` or `TimeSlice`)
    pub record_name_prefix: String,
    /// Zero padding for record numbers in group names
    pub digits_for_record_number: usize,
    /// Zero padding for sequence numbers; 0 omits the `.seq` suffix
    pub digits_for_sequence_number: usize,
    /// Name of the record header dataset inside a record group
    pub record_header_dataset_name: String,
    /// Group holding raw fragment datasets in indexed layouts
    pub raw_data_group_name: String,
    /// Group holding derived views
    pub view_group_name: String,
    /// Per-subsystem naming for legacy layouts
    pub path_param_list: Vec<PathParams>,
}

impl Default for FileLayoutParams {
    fn default() -> Self {
        Self {
            record_name_prefix: "TriggerRecord".to_string(),
            digits_for_record_number: 6,
            digits_for_sequence_number: 0,
            record_header_dataset_name: "TriggerRecordHeader".to_string(),
            raw_data_group_name: "RawData".to_string(),
            view_group_name: "Views".to_string(),
            path_param_list: vec![
                PathParams::new(Subsystem::DetectorReadout, "TPC", "Link"),
                PathParams::new(Subsystem::HwSignalsInterface, "HSI", "Element"),
                PathParams::new(Subsystem::Trigger, "Trigger", "Element"),
            ],
        }
    }
}

impl FileLayoutParams {
    /// Parse the JSON blob stored in the `filelayout_params` attribute
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

fn default_digits_for_element_number() -> usize {
    5
}
