use bytes::Bytes;

use crate::container::Container;
use crate::ids::{GeoId, RecordId, RecordKind, SourceId, Subsystem};
use crate::payload::{PayloadError, PayloadParser, TimeSlice, TriggerRecord};

use super::{IndexError, RawDataFile};

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// Read the full contents of a dataset
    pub fn get_dataset_raw_data(&self, dataset_path: &str) -> Result<Bytes, IndexError> {
        if !self.container.is_dataset(dataset_path) {
            return Err(IndexError::InvalidDataset {
                path: dataset_path.to_string(),
                file: self.container.file_name().to_string(),
            });
        }
        Ok(self.container.read_dataset(dataset_path)?)
    }

    /// Parse the fragment stored at `dataset_path`
    pub fn get_frag_ptr(&self, dataset_path: &str) -> Result<P::Fragment, IndexError> {
        let bytes = self.get_dataset_raw_data(dataset_path)?;
        self.parser
            .parse_fragment(bytes)
            .map_err(|source| payload_error(dataset_path, source))
    }

    /// Parse the fragment a source id produced in one record
    pub fn get_frag_ptr_for_source_id(
        &mut self,
        rid: RecordId,
        source_id: SourceId,
    ) -> Result<P::Fragment, IndexError> {
        self.check_source_id_version()?;
        let path = self.source_id_path(rid, source_id)?;
        self.get_frag_ptr(&path)
    }

    /// Parse the fragment of `(subsystem, id)` in one record
    pub fn get_frag_ptr_for_subsystem_id(
        &mut self,
        rid: RecordId,
        subsystem: Subsystem,
        id: u32,
    ) -> Result<P::Fragment, IndexError> {
        self.get_frag_ptr_for_source_id(rid, SourceId::new(subsystem, id))
    }

    /// Parse the fragment of the source id that owns `geo_id` in one record
    pub fn get_frag_ptr_for_geo_id(
        &mut self,
        rid: RecordId,
        geo_id: GeoId,
    ) -> Result<P::Fragment, IndexError> {
        self.check_source_id_version()?;
        let source_id = self.get_source_id_for_geo_id(rid, geo_id)?;
        self.get_frag_ptr_for_source_id(rid, source_id)
    }

    /// Parse the trigger record header stored at `dataset_path`
    pub fn get_trh_ptr(&self, dataset_path: &str) -> Result<P::RecordHeader, IndexError> {
        let bytes = self.get_dataset_raw_data(dataset_path)?;
        self.parser
            .parse_record_header(bytes)
            .map_err(|source| payload_error(dataset_path, source))
    }

    /// Parse the trigger record header of one record
    pub fn get_trh_ptr_for_record(&mut self, rid: RecordId) -> Result<P::RecordHeader, IndexError> {
        self.check_record_type(RecordKind::TriggerRecord)?;
        self.check_source_id_version()?;
        let path = self.get_record_header_dataset_path(rid)?;
        self.get_trh_ptr(&path)
    }

    /// Parse the time slice header stored at `dataset_path`
    pub fn get_tsh_ptr(&self, dataset_path: &str) -> Result<P::TimeSliceHeader, IndexError> {
        let bytes = self.get_dataset_raw_data(dataset_path)?;
        self.parser
            .parse_timeslice_header(bytes)
            .map_err(|source| payload_error(dataset_path, source))
    }

    /// Parse the time slice header of one record
    pub fn get_tsh_ptr_for_record(
        &mut self,
        rid: RecordId,
    ) -> Result<P::TimeSliceHeader, IndexError> {
        self.check_record_type(RecordKind::TimeSlice)?;
        self.check_source_id_version()?;
        let path = self.get_record_header_dataset_path(rid)?;
        self.get_tsh_ptr(&path)
    }

    /// Header plus every fragment of one trigger record
    pub fn get_trigger_record(
        &mut self,
        rid: RecordId,
    ) -> Result<TriggerRecord<P::RecordHeader, P::Fragment>, IndexError> {
        let mut record = TriggerRecord::new(self.get_trh_ptr_for_record(rid)?);
        for path in self.get_fragment_dataset_paths(rid)? {
            record.add_fragment(self.get_frag_ptr(&path)?);
        }
        Ok(record)
    }

    /// Header plus every fragment of one time slice
    pub fn get_timeslice(
        &mut self,
        rid: RecordId,
    ) -> Result<TimeSlice<P::TimeSliceHeader, P::Fragment>, IndexError> {
        let mut slice = TimeSlice::new(self.get_tsh_ptr_for_record(rid)?);
        for path in self.get_fragment_dataset_paths(rid)? {
            slice.add_fragment(self.get_frag_ptr(&path)?);
        }
        Ok(slice)
    }

    fn source_id_path(&mut self, rid: RecordId, source_id: SourceId) -> Result<String, IndexError> {
        self.record_entry(rid)?
            .path_for(source_id)
            .map(str::to_string)
            .ok_or(IndexError::SourceIdNotFound {
                record: rid,
                source_id,
            })
    }
}

fn payload_error(path: &str, source: PayloadError) -> IndexError {
    IndexError::Payload {
        path: path.to_string(),
        source,
    }
}
