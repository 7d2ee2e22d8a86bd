use crate::container::{collect_dataset_paths, join_path, path_elements, Container};
use crate::ids::{FragmentType, RecordId, RecordKind, SourceId, Subdetector, Subsystem};
use crate::payload::PayloadParser;

use super::{IndexError, RawDataFile, SchemaEra};

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// Paths of every dataset below `top_level_group` (the root when `None`)
    pub fn get_dataset_paths(&self, top_level_group: Option<&str>) -> Result<Vec<String>, IndexError> {
        let group = top_level_group.unwrap_or("/");
        if !self.container.is_group(group) {
            return Err(IndexError::InvalidGroup(group.to_string()));
        }

        let mut paths = Vec::new();
        collect_dataset_paths(&self.container, group, &mut paths)?;
        Ok(paths)
    }

    /// Record header dataset path of every record
    pub fn get_record_header_dataset_paths(&mut self) -> Result<Vec<String>, IndexError> {
        match self.era {
            SchemaEra::LegacyPaths => Ok(self
                .get_dataset_paths(None)?
                .into_iter()
                .filter(|path| self.is_record_header_path(path))
                .collect()),
            SchemaEra::SourceIdIndexed => {
                let mut paths = Vec::new();
                for rid in self.get_all_record_ids()? {
                    paths.push(self.get_record_header_dataset_path(rid)?);
                }
                Ok(paths)
            }
        }
    }

    /// Record header dataset paths of a trigger-record file
    pub fn get_trigger_record_header_dataset_paths(&mut self) -> Result<Vec<String>, IndexError> {
        self.check_record_type(RecordKind::TriggerRecord)?;
        self.get_record_header_dataset_paths()
    }

    /// Header dataset paths of a time-slice file
    pub fn get_timeslice_header_dataset_paths(&mut self) -> Result<Vec<String>, IndexError> {
        self.check_record_type(RecordKind::TimeSlice)?;
        self.get_record_header_dataset_paths()
    }

    /// Record header dataset path of one record
    pub fn get_record_header_dataset_path(&mut self, rid: RecordId) -> Result<String, IndexError> {
        self.check_record_id(rid)?;

        match self.era {
            SchemaEra::LegacyPaths => {
                let group = self.record_group_path(rid)?;
                Ok(join_path(&group, self.layout.record_header_dataset_name()))
            }
            SchemaEra::SourceIdIndexed => {
                let entry = self.record_entry(rid)?;
                let source_id = entry.record_header_source_id;
                entry
                    .path_for(source_id)
                    .map(str::to_string)
                    .ok_or(IndexError::SourceIdNotFound {
                        record: rid,
                        source_id,
                    })
            }
        }
    }

    /// Trigger record header dataset path of one record
    pub fn get_trigger_record_header_dataset_path(
        &mut self,
        rid: RecordId,
    ) -> Result<String, IndexError> {
        self.check_record_type(RecordKind::TriggerRecord)?;
        self.get_record_header_dataset_path(rid)
    }

    /// Time slice header dataset path of one record
    pub fn get_timeslice_header_dataset_path(
        &mut self,
        rid: RecordId,
    ) -> Result<String, IndexError> {
        self.check_record_type(RecordKind::TimeSlice)?;
        self.get_record_header_dataset_path(rid)
    }

    /// Fragment dataset paths of every record, record by record
    pub fn get_all_fragment_dataset_paths(&mut self) -> Result<Vec<String>, IndexError> {
        let mut paths = Vec::new();
        for rid in self.get_all_record_ids()? {
            paths.extend(self.get_fragment_dataset_paths(rid)?);
        }
        Ok(paths)
    }

    /// Fragment dataset paths of one record.
    ///
    /// Legacy files list every dataset below the record group except the
    /// header, in path order. Indexed files list fragment source ids in
    /// ascending order.
    pub fn get_fragment_dataset_paths(&mut self, rid: RecordId) -> Result<Vec<String>, IndexError> {
        self.check_record_id(rid)?;

        match self.era {
            SchemaEra::LegacyPaths => {
                let group = self.record_group_path(rid)?;
                let mut paths: Vec<String> = self
                    .get_dataset_paths(Some(&group))?
                    .into_iter()
                    .filter(|path| !self.is_record_header_path(path))
                    .collect();
                paths.sort();
                Ok(paths)
            }
            SchemaEra::SourceIdIndexed => {
                let entry = self.record_entry(rid)?;
                Ok(indexed_paths(entry, |sid| entry.fragment_source_ids.contains(sid)))
            }
        }
    }

    /// Fragment dataset paths of one subsystem across every record
    pub fn get_fragment_dataset_paths_for_subsystem(
        &mut self,
        subsystem: Subsystem,
    ) -> Result<Vec<String>, IndexError> {
        let mut paths = Vec::new();
        for rid in self.get_all_record_ids()? {
            paths.extend(self.get_record_fragment_dataset_paths_for_subsystem(rid, subsystem)?);
        }
        Ok(paths)
    }

    /// Fragment dataset paths of one subsystem in one record; empty when the
    /// record holds nothing from that subsystem
    pub fn get_record_fragment_dataset_paths_for_subsystem(
        &mut self,
        rid: RecordId,
        subsystem: Subsystem,
    ) -> Result<Vec<String>, IndexError> {
        self.check_record_id(rid)?;

        match self.era {
            SchemaEra::LegacyPaths => {
                let group = self.record_group_path(rid)?;
                let type_group = self.layout.fragment_type_path_in(&group, subsystem);
                if !self.container.is_group(&type_group) {
                    return Ok(Vec::new());
                }
                let mut paths = self.get_dataset_paths(Some(&type_group))?;
                paths.sort();
                Ok(paths)
            }
            SchemaEra::SourceIdIndexed => {
                let entry = self.record_entry(rid)?;
                Ok(indexed_paths(entry, |sid| {
                    sid.subsystem == subsystem && entry.fragment_source_ids.contains(sid)
                }))
            }
        }
    }

    /// [`get_fragment_dataset_paths_for_subsystem`](Self::get_fragment_dataset_paths_for_subsystem)
    /// with the subsystem given by name, e.g. `"Detector_Readout"`
    pub fn get_fragment_dataset_paths_for_subsystem_name(
        &mut self,
        subsystem: &str,
    ) -> Result<Vec<String>, IndexError> {
        self.get_fragment_dataset_paths_for_subsystem(subsystem.parse::<Subsystem>()?)
    }

    /// Per-record variant of
    /// [`get_fragment_dataset_paths_for_subsystem_name`](Self::get_fragment_dataset_paths_for_subsystem_name)
    pub fn get_record_fragment_dataset_paths_for_subsystem_name(
        &mut self,
        rid: RecordId,
        subsystem: &str,
    ) -> Result<Vec<String>, IndexError> {
        self.get_record_fragment_dataset_paths_for_subsystem(rid, subsystem.parse::<Subsystem>()?)
    }

    /// Fragment dataset paths of one fragment type in one record
    pub fn get_record_fragment_dataset_paths_for_fragment_type(
        &mut self,
        rid: RecordId,
        fragment_type: FragmentType,
    ) -> Result<Vec<String>, IndexError> {
        let entry = self.record_entry(rid)?;
        let Some(members) = entry.by_fragment_type.get(&fragment_type) else {
            return Ok(Vec::new());
        };
        Ok(indexed_paths(entry, |sid| {
            members.contains(sid) && entry.fragment_source_ids.contains(sid)
        }))
    }

    /// Fragment dataset paths of one subdetector in one record
    pub fn get_record_fragment_dataset_paths_for_subdetector(
        &mut self,
        rid: RecordId,
        subdetector: Subdetector,
    ) -> Result<Vec<String>, IndexError> {
        let entry = self.record_entry(rid)?;
        let Some(members) = entry.by_subdetector.get(&subdetector) else {
            return Ok(Vec::new());
        };
        Ok(indexed_paths(entry, |sid| {
            members.contains(sid) && entry.fragment_source_ids.contains(sid)
        }))
    }

    fn is_record_header_path(&self, path: &str) -> bool {
        path_elements(path).last().copied() == Some(self.layout.record_header_dataset_name())
    }
}

/// Paths of the source ids accepted by `keep`, in source id order
fn indexed_paths(
    entry: &super::RecordCacheEntry,
    keep: impl Fn(&SourceId) -> bool,
) -> Vec<String> {
    entry
        .paths
        .iter()
        .filter(|(sid, _)| keep(sid))
        .map(|(_, path)| path.clone())
        .collect()
}
