use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::container::Container;
use crate::ids::{GeoId, RecordId, SourceId};
use crate::payload::PayloadParser;
use crate::resolver::{
    FragmentTypeSourceIdMap, SourceIdGeoIdMap, SourceIdPathMap, SourceIdResolver,
    SubdetectorSourceIdMap, SubsystemSourceIdMap,
};

use super::{IndexError, RawDataFile};

/// Everything the index knows about one record.
///
/// Built in a single pass and stored as one value, so a record is either
/// fully resolved or not resolved at all. Maps may be empty; lookups of
/// absent keys answer with empty sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordCacheEntry {
    /// Every source id with a dataset in the record
    pub source_ids: BTreeSet<SourceId>,
    /// Source id of the record header (empty when undeclared)
    pub record_header_source_id: SourceId,
    /// `source_ids` without the record header
    pub fragment_source_ids: BTreeSet<SourceId>,
    /// Source id → geometric ids, file-level map plus record additions
    pub geo_ids: SourceIdGeoIdMap,
    /// Source id → dataset path
    pub paths: SourceIdPathMap,
    /// Subsystem → source ids
    pub by_subsystem: SubsystemSourceIdMap,
    /// Fragment type → source ids
    pub by_fragment_type: FragmentTypeSourceIdMap,
    /// Subdetector → source ids
    pub by_subdetector: SubdetectorSourceIdMap,
    geo_owners: Option<BTreeMap<GeoId, SourceId>>,
}

impl RecordCacheEntry {
    /// Resolve one record group.
    ///
    /// `file_level_geo_ids` is only read; the record's own map starts as a
    /// copy of it.
    pub fn build<C: Container + ?Sized>(
        resolver: &SourceIdResolver<'_>,
        container: &C,
        record_group: &str,
        file_level_geo_ids: &SourceIdGeoIdMap,
        reverse_geo_index: bool,
    ) -> Self {
        let mut geo_ids = file_level_geo_ids.clone();
        resolver.fetch_record_level_geo_id_info(container, record_group, &mut geo_ids);

        let mut paths = SourceIdPathMap::new();
        resolver.fetch_source_id_path_info(container, record_group, &mut paths);

        let mut by_fragment_type = FragmentTypeSourceIdMap::new();
        resolver.fetch_fragment_type_source_id_info(container, record_group, &mut by_fragment_type);

        let mut by_subdetector = SubdetectorSourceIdMap::new();
        resolver.fetch_subdetector_source_id_info(container, record_group, &mut by_subdetector);

        let record_header_source_id = resolver.fetch_record_header_source_id(container, record_group);

        let source_ids: BTreeSet<SourceId> = paths.keys().copied().collect();
        let fragment_source_ids = source_ids
            .iter()
            .copied()
            .filter(|sid| *sid != record_header_source_id)
            .collect();
        let by_subsystem = SourceIdResolver::group_by_subsystem(paths.keys());

        let geo_owners = reverse_geo_index.then(|| reverse_geo_map(&geo_ids));

        Self {
            source_ids,
            record_header_source_id,
            fragment_source_ids,
            geo_ids,
            paths,
            by_subsystem,
            by_fragment_type,
            by_subdetector,
            geo_owners,
        }
    }

    /// Source id owning a geometric id, or the empty source id.
    ///
    /// When several source ids list the same geometric id, the lowest wins.
    pub fn source_id_for_geo_id(&self, geo_id: GeoId) -> SourceId {
        if let Some(owners) = &self.geo_owners {
            return owners.get(&geo_id).copied().unwrap_or_default();
        }

        self.geo_ids
            .iter()
            .find(|(_, geo_ids)| geo_ids.contains(&geo_id))
            .map(|(sid, _)| *sid)
            .unwrap_or_default()
    }

    /// Dataset path of a source id
    pub fn path_for(&self, source_id: SourceId) -> Option<&str> {
        self.paths.get(&source_id).map(String::as_str)
    }
}

fn reverse_geo_map(geo_ids: &SourceIdGeoIdMap) -> BTreeMap<GeoId, SourceId> {
    let mut owners = BTreeMap::new();
    for (sid, ids) in geo_ids {
        for geo_id in ids {
            owners.entry(*geo_id).or_insert(*sid);
        }
    }
    owners
}

impl<C: Container, P: PayloadParser> RawDataFile<C, P> {
    /// Resolve and cache everything about `rid` unless that already happened.
    ///
    /// Fails with `RecordNotFound` for ids the file does not hold and with
    /// `InvalidGroup` when the record's group is not a group; the cache is
    /// left untouched in both cases.
    pub fn add_record_level_info_to_caches_if_needed(
        &mut self,
        rid: RecordId,
    ) -> Result<(), IndexError> {
        self.check_record_id(rid)?;
        if self.record_cache.contains_key(&rid) {
            return Ok(());
        }

        let group = self.record_group_path(rid)?;
        if !self.container.is_group(&group) {
            return Err(IndexError::InvalidGroup(group));
        }

        let entry = RecordCacheEntry::build(
            &SourceIdResolver::new(&self.layout),
            &self.container,
            &group,
            &self.file_level_geo_ids,
            self.config.reverse_geo_index,
        );
        debug!(
            "Cached record {} from {}: {} source ids, {} with geo ids",
            rid,
            group,
            entry.source_ids.len(),
            entry.geo_ids.len()
        );

        self.record_cache.insert(rid, entry);
        Ok(())
    }

    /// Validate `rid`, resolve it if needed and return its cache entry
    pub(super) fn record_entry(&mut self, rid: RecordId) -> Result<&RecordCacheEntry, IndexError> {
        self.add_record_level_info_to_caches_if_needed(rid)?;
        self.record_cache
            .get(&rid)
            .ok_or(IndexError::RecordNotFound(rid))
    }
}
