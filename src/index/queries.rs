use std::collections::BTreeSet;

use crate::container::Container;
use crate::ids::{geo_id_subdetector, FragmentType, GeoId, RecordId, SourceId, Subdetector, Subsystem};
use crate::payload::PayloadParser;

use super::{IndexError, RawDataFile};

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// Every source id with a dataset in the record
    pub fn get_source_ids(&mut self, rid: RecordId) -> Result<BTreeSet<SourceId>, IndexError> {
        Ok(self.record_entry(rid)?.source_ids.clone())
    }

    /// Source id of the record header
    pub fn get_record_header_source_id(&mut self, rid: RecordId) -> Result<SourceId, IndexError> {
        Ok(self.record_entry(rid)?.record_header_source_id)
    }

    /// Source ids of the record's fragments (everything but the header)
    pub fn get_fragment_source_ids(
        &mut self,
        rid: RecordId,
    ) -> Result<BTreeSet<SourceId>, IndexError> {
        Ok(self.record_entry(rid)?.fragment_source_ids.clone())
    }

    /// Source ids of one subsystem; empty when the record has none
    pub fn get_source_ids_for_subsystem(
        &mut self,
        rid: RecordId,
        subsystem: Subsystem,
    ) -> Result<BTreeSet<SourceId>, IndexError> {
        let entry = self.record_entry(rid)?;
        Ok(entry.by_subsystem.get(&subsystem).cloned().unwrap_or_default())
    }

    /// Source ids producing one fragment type
    pub fn get_source_ids_for_fragment_type(
        &mut self,
        rid: RecordId,
        fragment_type: FragmentType,
    ) -> Result<BTreeSet<SourceId>, IndexError> {
        let entry = self.record_entry(rid)?;
        Ok(entry
            .by_fragment_type
            .get(&fragment_type)
            .cloned()
            .unwrap_or_default())
    }

    /// Source ids belonging to one subdetector
    pub fn get_source_ids_for_subdetector(
        &mut self,
        rid: RecordId,
        subdetector: Subdetector,
    ) -> Result<BTreeSet<SourceId>, IndexError> {
        let entry = self.record_entry(rid)?;
        Ok(entry
            .by_subdetector
            .get(&subdetector)
            .cloned()
            .unwrap_or_default())
    }

    /// Geometric ids known at file scope.
    ///
    /// Record-level additions are not included; use [`get_geo_ids`](Self::get_geo_ids)
    /// for a complete per-record answer.
    pub fn get_all_geo_ids(&self) -> BTreeSet<GeoId> {
        self.file_level_geo_ids
            .values()
            .flat_map(|ids| ids.iter().copied())
            .collect()
    }

    /// Geometric ids of one record
    pub fn get_geo_ids(&mut self, rid: RecordId) -> Result<BTreeSet<GeoId>, IndexError> {
        let entry = self.record_entry(rid)?;
        Ok(entry
            .geo_ids
            .values()
            .flat_map(|ids| ids.iter().copied())
            .collect())
    }

    /// Geometric ids of one record whose low 16 bits name `subdetector`
    pub fn get_geo_ids_for_subdetector(
        &mut self,
        rid: RecordId,
        subdetector: Subdetector,
    ) -> Result<BTreeSet<GeoId>, IndexError> {
        let entry = self.record_entry(rid)?;
        Ok(entry
            .geo_ids
            .values()
            .flat_map(|ids| ids.iter().copied())
            .filter(|geo_id| geo_id_subdetector(*geo_id) == subdetector)
            .collect())
    }

    /// Geometric ids served by one source id
    pub fn get_geo_ids_for_source_id(
        &mut self,
        rid: RecordId,
        source_id: SourceId,
    ) -> Result<BTreeSet<GeoId>, IndexError> {
        let entry = self.record_entry(rid)?;
        Ok(entry.geo_ids.get(&source_id).cloned().unwrap_or_default())
    }

    /// Source id owning a geometric id, or the empty source id when no
    /// source in the record lists it
    pub fn get_source_id_for_geo_id(
        &mut self,
        rid: RecordId,
        geo_id: GeoId,
    ) -> Result<SourceId, IndexError> {
        Ok(self.record_entry(rid)?.source_id_for_geo_id(geo_id))
    }
}
