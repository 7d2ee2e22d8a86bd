use std::fmt;

use crate::container::Container;
use crate::payload::PayloadParser;

use super::{IndexError, RawDataFile, SchemaEra};

/// Summary of a raw data file
#[derive(Debug, Clone)]
pub struct FileSummary {
    /// Name of the file
    pub file_name: String,
    /// Schema version
    pub version: u32,
    /// Record type
    pub record_type: String,
    /// Recorded size in bytes, 0 when unknown
    pub recorded_size: u64,
    /// Number of records
    pub num_records: usize,
    /// Number of distinct geometric ids at file scope
    pub num_file_level_geo_ids: usize,
    /// Records resolved into the cache so far
    pub num_cached_records: usize,
    /// Path-derivation era
    pub era: SchemaEra,
}

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// Get summary information about the file
    pub fn summary(&mut self) -> Result<FileSummary, IndexError> {
        let num_records = self.get_all_record_ids()?.len();

        Ok(FileSummary {
            file_name: self.container.file_name().to_string(),
            version: self.layout.version(),
            record_type: self.record_type.clone(),
            recorded_size: self.recorded_size,
            num_records,
            num_file_level_geo_ids: self.get_all_geo_ids().len(),
            num_cached_records: self.record_cache.len(),
            era: self.era,
        })
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Raw Data File Summary")?;
        writeln!(f, "=====================")?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Layout version: {} ({:?})", self.version, self.era)?;
        writeln!(f, "Record type: {}", self.record_type)?;
        if self.recorded_size > 0 {
            writeln!(f, "Recorded size: {} bytes", self.recorded_size)?;
        }
        writeln!(f, "Records: {}", self.num_records)?;
        writeln!(f, "  cached: {}", self.num_cached_records)?;
        writeln!(f, "File-level geo ids: {}", self.num_file_level_geo_ids)?;
        Ok(())
    }
}
