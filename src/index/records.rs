use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::container::Container;
use crate::ids::{RecordId, RecordKind};
use crate::layout::{MAX_FILELAYOUT_VERSION, MIN_SOURCE_ID_VERSION};
use crate::payload::PayloadParser;

use super::{IndexError, RawDataFile};

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// All record ids in the file, in (record number, sequence number) order.
    ///
    /// Root children are matched against the layout's record prefix; the
    /// remainder must be `<record_number>` or `<record_number>.<sequence>`.
    /// Anything else under the root is skipped. The scan runs once.
    pub fn get_all_record_ids(&mut self) -> Result<BTreeSet<RecordId>, IndexError> {
        Ok(self.record_groups()?.keys().copied().collect())
    }

    /// Record numbers only, dropping sequence numbers
    #[deprecated(note = "use get_all_record_ids, which keeps sequence numbers")]
    pub fn get_all_record_numbers(&mut self) -> Result<BTreeSet<u64>, IndexError> {
        warn!("Deprecated usage, get_all_record_numbers(). Use get_all_record_ids().");
        self.record_numbers()
    }

    /// All record ids of a trigger-record file
    pub fn get_all_trigger_record_ids(&mut self) -> Result<BTreeSet<RecordId>, IndexError> {
        self.check_record_type(RecordKind::TriggerRecord)?;
        self.get_all_record_ids()
    }

    /// Trigger numbers only, dropping sequence numbers
    #[deprecated(note = "use get_all_trigger_record_ids, which keeps sequence numbers")]
    pub fn get_all_trigger_record_numbers(&mut self) -> Result<BTreeSet<u64>, IndexError> {
        warn!(
            "Deprecated usage, get_all_trigger_record_numbers(). Use get_all_trigger_record_ids()."
        );
        self.check_record_type(RecordKind::TriggerRecord)?;
        self.record_numbers()
    }

    /// All record ids of a time-slice file
    pub fn get_all_timeslice_ids(&mut self) -> Result<BTreeSet<RecordId>, IndexError> {
        self.check_record_type(RecordKind::TimeSlice)?;
        self.get_all_record_ids()
    }

    /// Time slice numbers only
    pub fn get_all_timeslice_numbers(&mut self) -> Result<BTreeSet<u64>, IndexError> {
        self.check_record_type(RecordKind::TimeSlice)?;
        self.record_numbers()
    }

    /// Fail unless the file holds records of `kind`. Files older than
    /// version 2 declare no record type and always pass.
    pub fn check_record_type(&self, kind: RecordKind) -> Result<(), IndexError> {
        if self.layout.version() < MIN_SOURCE_ID_VERSION {
            return Ok(());
        }

        if self.layout.record_name_prefix() != kind.prefix() {
            return Err(IndexError::WrongRecordTypeRequested {
                requested: kind,
                actual: self.layout.record_name_prefix().to_string(),
            });
        }
        Ok(())
    }

    /// Fail unless the file is new enough for lookups by source id
    pub(super) fn check_source_id_version(&self) -> Result<(), IndexError> {
        let version = self.layout.version();
        if version < MIN_SOURCE_ID_VERSION {
            return Err(IndexError::IncompatibleVersion {
                version,
                min: MIN_SOURCE_ID_VERSION,
                max: MAX_FILELAYOUT_VERSION,
            });
        }
        Ok(())
    }

    /// Fail with `RecordNotFound` unless `rid` is one of the file's records
    pub(super) fn check_record_id(&mut self, rid: RecordId) -> Result<(), IndexError> {
        if self.record_groups()?.contains_key(&rid) {
            Ok(())
        } else {
            Err(IndexError::RecordNotFound(rid))
        }
    }

    /// Absolute path of a record's group, as found during enumeration
    pub(super) fn record_group_path(&mut self, rid: RecordId) -> Result<String, IndexError> {
        self.record_groups()?
            .get(&rid)
            .map(|name| format!("/{}", name))
            .ok_or(IndexError::RecordNotFound(rid))
    }

    fn record_numbers(&mut self) -> Result<BTreeSet<u64>, IndexError> {
        Ok(self
            .record_groups()?
            .keys()
            .map(|rid| rid.record_number)
            .collect())
    }

    fn record_groups(&mut self) -> Result<&BTreeMap<RecordId, String>, IndexError> {
        let groups = match self.record_groups.take() {
            Some(groups) => groups,
            None => self.scan_record_groups()?,
        };
        Ok(self.record_groups.insert(groups))
    }

    fn scan_record_groups(&self) -> Result<BTreeMap<RecordId, String>, IndexError> {
        let prefix = self.layout.record_name_prefix();
        let mut groups = BTreeMap::new();

        for name in self.container.list_children("/")? {
            let Some(suffix) = name.strip_prefix(prefix) else {
                continue;
            };
            match RecordId::parse_suffix(suffix) {
                Some(rid) => {
                    groups.entry(rid).or_insert(name);
                }
                None if self.config.strict_record_names => {
                    return Err(IndexError::InvalidRecordName(name));
                }
                None => debug!("Skipping root child {}: not a record name", name),
            }
        }

        debug!(
            "Found {} {} records in {}",
            groups.len(),
            prefix,
            self.container.file_name()
        );
        Ok(groups)
    }
}
