//! # Source-Identifier Resolver
//!
//! Extracts source-id metadata from one container group (the root or a
//! single record group): dataset paths, geometric ids, fragment types,
//! subdetectors and the record header source id.
//!
//! Every `fetch_*` call is tolerant. Missing or malformed metadata leaves the
//! output map as it was, so the record cache never has to special-case a
//! resolver that found nothing.
//!
//! Two schema eras are handled:
//!
//! | Version | Source of truth |
//! |---------|-----------------|
//! | ≤ 2 | dataset paths decoded through the [`FileLayout`] naming convention |
//! | > 2 | JSON attributes on the root, record groups and datasets ([`wire`]) |

pub mod wire;


use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::container::{collect_dataset_paths, join_path, path_elements, string_attribute, Container};
use crate::ids::{FragmentType, GeoId, SourceId, Subdetector, Subsystem};
use crate::layout::FileLayout;

use wire::{FragmentTypeEntry, GeoIdEntry, SubdetectorEntry};

/// Source id → geometric ids
pub type SourceIdGeoIdMap = BTreeMap<SourceId, BTreeSet<GeoId>>;
/// Source id → dataset path
pub type SourceIdPathMap = BTreeMap<SourceId, String>;
/// Subsystem → source ids
pub type SubsystemSourceIdMap = BTreeMap<Subsystem, BTreeSet<SourceId>>;
/// Fragment type → source ids
pub type FragmentTypeSourceIdMap = BTreeMap<FragmentType, BTreeSet<SourceId>>;
/// Subdetector → source ids
pub type SubdetectorSourceIdMap = BTreeMap<Subdetector, BTreeSet<SourceId>>;

/// Stateless resolver, parameterised by the file's layout (and through it,
/// the schema version)
#[derive(Debug, Clone, Copy)]
pub struct SourceIdResolver<'a> {
    layout: &'a FileLayout,
}

impl<'a> SourceIdResolver<'a> {
    /// Create a resolver for files with the given layout
    pub fn new(layout: &'a FileLayout) -> Self {
        Self { layout }
    }

    /// Schema version this resolver decodes
    pub fn version(&self) -> u32 {
        self.layout.version()
    }

    fn is_indexed(&self) -> bool {
        !self.layout.is_legacy()
    }

    /// Merge file-scoped geometric-id metadata into `map`
    pub fn fetch_file_level_geo_id_info<C: Container + ?Sized>(
        &self,
        container: &C,
        map: &mut SourceIdGeoIdMap,
    ) {
        if self.is_indexed() {
            merge_geo_ids(container, "/", map);
        }
    }

    /// Merge record-scoped geometric-id additions into `map`, which normally
    /// starts as a copy of the file-level map
    pub fn fetch_record_level_geo_id_info<C: Container + ?Sized>(
        &self,
        container: &C,
        record_group: &str,
        map: &mut SourceIdGeoIdMap,
    ) {
        if self.is_indexed() {
            merge_geo_ids(container, record_group, map);
        }
    }

    /// Map every fragment and header dataset of the record to its source id.
    ///
    /// The header dataset is visited first so it keeps its source id; any
    /// other clash keeps the first dataset listed and logs the rest.
    pub fn fetch_source_id_path_info<C: Container + ?Sized>(
        &self,
        container: &C,
        record_group: &str,
        map: &mut SourceIdPathMap,
    ) {
        let mut paths = Vec::new();
        if let Err(e) = collect_dataset_paths(container, record_group, &mut paths) {
            warn!("Cannot list datasets under {}: {}", record_group, e);
            return;
        }

        let header_name = self.layout.record_header_dataset_name();
        paths.sort_by_key(|path| path_elements(path).last().copied() != Some(header_name));
        let header_source_id = if self.is_indexed() {
            self.fetch_record_header_source_id(container, record_group)
        } else {
            SourceId::empty()
        };

        for path in paths {
            let source_id = if self.is_indexed() {
                let by_attribute: Option<SourceId> =
                    json_attribute(container, &path, wire::DATASET_SOURCE_ID);
                let name = path_elements(&path).last().copied().unwrap_or_default();
                by_attribute
                    .or_else(|| SourceId::from_dataset_name(name))
                    .or_else(|| {
                        (name == header_name && !header_source_id.is_empty())
                            .then_some(header_source_id)
                    })
            } else {
                self.layout.source_id_from_path(&path)
            };

            let Some(source_id) = source_id else {
                debug!("No source id decodable for dataset {}", path);
                continue;
            };
            match map.entry(source_id) {
                Entry::Vacant(slot) => {
                    slot.insert(path);
                }
                Entry::Occupied(slot) => warn!(
                    "Source id {} already mapped to {}, ignoring {}",
                    source_id,
                    slot.get(),
                    path
                ),
            }
        }
    }

    /// Merge the record's fragment-type grouping into `map`
    pub fn fetch_fragment_type_source_id_info<C: Container + ?Sized>(
        &self,
        container: &C,
        record_group: &str,
        map: &mut FragmentTypeSourceIdMap,
    ) {
        if !self.is_indexed() {
            return;
        }
        let entries: Option<Vec<FragmentTypeEntry>> =
            json_attribute(container, record_group, wire::FRAGMENT_TYPE_SOURCE_ID_MAP);
        for entry in entries.unwrap_or_default() {
            map.entry(entry.fragment_type)
                .or_default()
                .extend(entry.sourceids);
        }
    }

    /// Merge the record's subdetector grouping into `map`
    pub fn fetch_subdetector_source_id_info<C: Container + ?Sized>(
        &self,
        container: &C,
        record_group: &str,
        map: &mut SubdetectorSourceIdMap,
    ) {
        if !self.is_indexed() {
            return;
        }
        let entries: Option<Vec<SubdetectorEntry>> =
            json_attribute(container, record_group, wire::SUBDETECTOR_SOURCE_ID_MAP);
        for entry in entries.unwrap_or_default() {
            map.entry(entry.subdetector)
                .or_default()
                .extend(entry.sourceids);
        }
    }

    /// Source id of the record header, or the empty source id when the
    /// record does not declare one
    pub fn fetch_record_header_source_id<C: Container + ?Sized>(
        &self,
        container: &C,
        record_group: &str,
    ) -> SourceId {
        if self.is_indexed() {
            return json_attribute(container, record_group, wire::RECORD_HEADER_SOURCE_ID)
                .unwrap_or_default();
        }

        let header_path = join_path(record_group, self.layout.record_header_dataset_name());
        if container.is_dataset(&header_path) {
            FileLayout::legacy_header_source_id()
        } else {
            SourceId::empty()
        }
    }

    /// Group source ids by their subsystem tag
    pub fn group_by_subsystem<'s>(
        source_ids: impl IntoIterator<Item = &'s SourceId>,
    ) -> SubsystemSourceIdMap {
        let mut map = SubsystemSourceIdMap::new();
        for source_id in source_ids {
            map.entry(source_id.subsystem)
                .or_default()
                .insert(*source_id);
        }
        map
    }
}

fn merge_geo_ids<C: Container + ?Sized>(container: &C, path: &str, map: &mut SourceIdGeoIdMap) {
    let entries: Option<Vec<GeoIdEntry>> =
        json_attribute(container, path, wire::SOURCE_ID_GEO_ID_MAP);
    for entry in entries.unwrap_or_default() {
        map.entry(entry.source_id())
            .or_default()
            .extend(entry.geoids);
    }
}

/// Decode an optional JSON string attribute; problems are logged and
/// reported as absent.
fn json_attribute<C, T>(container: &C, path: &str, name: &str) -> Option<T>
where
    C: Container + ?Sized,
    T: DeserializeOwned,
{
    let text = match string_attribute(container, path, name) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            warn!("Ignoring attribute {} on {}: {}", name, path, e);
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Malformed {} on {}: {}", name, path, e);
            None
        }
    }
}
