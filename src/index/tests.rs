use std::collections::BTreeSet;

use super::*;
use crate::container::{ContainerError, MemoryContainer};
use crate::ids::{FragmentType, RecordKind, SourceId, Subdetector, Subsystem};
use crate::layout::FileLayoutParams;
use crate::resolver::wire;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const DR_100: SourceId = SourceId::new(Subsystem::DetectorReadout, 100);
const DR_101: SourceId = SourceId::new(Subsystem::DetectorReadout, 101);
const TRIGGER_2: SourceId = SourceId::new(Subsystem::Trigger, 2);
const HEADER: SourceId = SourceId::new(Subsystem::TrBuilder, 0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn layout_params(kind: RecordKind, digits_for_sequence_number: usize) -> FileLayoutParams {
    let header = match kind {
        RecordKind::TriggerRecord => "TriggerRecordHeader",
        RecordKind::TimeSlice => "TimeSliceHeader",
    };
    FileLayoutParams {
        record_name_prefix: kind.prefix().to_string(),
        digits_for_sequence_number,
        record_header_dataset_name: header.to_string(),
        ..FileLayoutParams::default()
    }
}

fn write_layout(
    c: &mut MemoryContainer,
    params: &FileLayoutParams,
    version: u32,
) -> Result<(), ContainerError> {
    c.set_attribute("/", FILELAYOUT_PARAMS, serde_json::to_string(params)?)?;
    c.set_attribute("/", FILELAYOUT_VERSION, version)?;
    c.set_attribute("/", RECORD_TYPE, params.record_name_prefix.as_str())
}

/// Source-id indexed file: every record holds one header and three
/// fragments (two detector readout links and one trigger candidate).
fn indexed_file(
    kind: RecordKind,
    version: u32,
    records: &[(u64, u32)],
) -> Result<MemoryContainer, ContainerError> {
    let params = layout_params(kind, 4);
    let layout = FileLayout::new(params.clone(), version);
    let mut c = MemoryContainer::new("indexed.hdf5");
    write_layout(&mut c, &params, version)?;
    c.set_attribute("/", RECORDED_SIZE, 4096u64)?;
    c.set_attribute(
        "/",
        wire::SOURCE_ID_GEO_ID_MAP,
        r#"[{"subsys":1,"id":100,"geoids":[65539,262146]},{"subsys":1,"id":101,"geoids":[131075]}]"#,
    )?;

    for &(record_number, sequence_number) in records {
        let group = layout.record_group_path(RecordId::new(record_number, sequence_number));
        let tag = record_number as u8;

        c.add_dataset(
            &format!("{}/{}", group, params.record_header_dataset_name),
            vec![0xAA, tag],
        )?;
        c.add_dataset(
            &format!("{}/RawData/Detector_Readout_0x00000064_WIBEth", group),
            vec![1, tag],
        )?;
        c.add_dataset(
            &format!("{}/RawData/Detector_Readout_0x00000065_WIBEth", group),
            vec![2, tag],
        )?;
        c.add_dataset(&format!("{}/RawData/Trigger_0x00000002_TC", group), vec![3, tag])?;

        c.set_attribute(&group, wire::RECORD_HEADER_SOURCE_ID, r#"{"subsys":4,"id":0}"#)?;
        c.set_attribute(
            &group,
            wire::SOURCE_ID_GEO_ID_MAP,
            r#"[{"subsys":1,"id":101,"geoids":[196611]}]"#,
        )?;
        c.set_attribute(
            &group,
            wire::FRAGMENT_TYPE_SOURCE_ID_MAP,
            r#"[{"fragment_type":12,"sourceids":[{"subsys":1,"id":100},{"subsys":1,"id":101}]},
                {"fragment_type":8,"sourceids":[{"subsys":3,"id":2}]}]"#,
        )?;
        c.set_attribute(
            &group,
            wire::SUBDETECTOR_SOURCE_ID_MAP,
            r#"[{"subdetector":3,"sourceids":[{"subsys":1,"id":100},{"subsys":1,"id":101}]}]"#,
        )?;
    }
    Ok(c)
}

/// Path-convention file: fragments live under `TPC/LinkNNNNN` and
/// `Trigger/ElementNNNNN`.
fn legacy_file(version: u32, records: &[u64]) -> Result<MemoryContainer, ContainerError> {
    let params = FileLayoutParams::default();
    let layout = FileLayout::new(params.clone(), version);
    let mut c = MemoryContainer::new("legacy.hdf5");
    write_layout(&mut c, &params, version)?;

    for &record_number in records {
        let tag = record_number as u8;
        c.add_dataset(&format!("/{}", layout.record_header_path(record_number, 0)), vec![0xAA, tag])?;
        for (source_id, byte) in [
            (SourceId::new(Subsystem::DetectorReadout, 5), 1),
            (SourceId::new(Subsystem::DetectorReadout, 7), 2),
            (SourceId::new(Subsystem::Trigger, 1), 3),
        ] {
            let path = layout.fragment_path(record_number, 0, source_id);
            c.add_dataset(&format!("/{}", path), vec![byte, tag])?;
        }
    }
    Ok(c)
}

fn three_records() -> Result<RawDataFile<MemoryContainer>, Box<dyn std::error::Error>> {
    let c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0), (2, 0), (2, 1)])?;
    Ok(RawDataFile::new(c)?)
}

#[test]
fn test_file_without_layout_metadata() -> TestResult {
    init_logging();
    let mut file = RawDataFile::new(MemoryContainer::new("bare.hdf5"))?;

    assert_eq!(file.version(), 0);
    assert_eq!(file.record_type(), "TriggerRecord");
    assert_eq!(file.recorded_size(), 0);
    assert_eq!(file.era(), SchemaEra::LegacyPaths);
    assert_eq!(file.layout().params(), &FileLayoutParams::default());
    assert!(file.get_all_record_ids()?.is_empty());
    assert!(file.get_all_geo_ids().is_empty());
    Ok(())
}

#[test]
fn test_construction_reads_root_attributes() -> TestResult {
    let file = three_records()?;

    assert_eq!(file.version(), 4);
    assert_eq!(file.record_type(), "TriggerRecord");
    assert_eq!(file.recorded_size(), 4096);
    assert_eq!(file.era(), SchemaEra::SourceIdIndexed);
    assert_eq!(file.file_name(), "indexed.hdf5");
    assert_eq!(file.file_level_geo_ids().len(), 2);
    assert_eq!(file.cached_record_count(), 0);
    Ok(())
}

#[test]
fn test_record_type_disagreeing_with_layout() -> TestResult {
    let mut c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0)])?;
    c.set_attribute("/", RECORD_TYPE, "TimeSlice")?;

    let err = RawDataFile::new(c).err().ok_or("expected a schema mismatch")?;
    assert!(matches!(err, IndexError::SchemaMismatch { .. }));
    Ok(())
}

#[test]
fn test_record_type_ignored_before_version_2() -> TestResult {
    let mut c = legacy_file(1, &[1])?;
    c.set_attribute("/", RECORD_TYPE, "TimeSlice")?;

    let mut file = RawDataFile::new(c)?;
    assert_eq!(file.get_all_timeslice_ids()?.len(), 1);
    Ok(())
}

#[test]
fn test_open_missing_file() {
    let err = RawDataFile::open("/nonexistent/run000001.json").err();
    assert!(matches!(err, Some(IndexError::OpenFailure { .. })));
}

#[test]
fn test_enumerate_records_skipping_foreign_children() -> TestResult {
    let mut c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0), (2, 0), (2, 1)])?;
    c.add_group("/Metadata")?;
    c.add_group("/TriggerRecordSummary")?;
    let mut file = RawDataFile::new(c)?;

    let ids: Vec<RecordId> = file.get_all_record_ids()?.into_iter().collect();
    assert_eq!(
        ids,
        vec![RecordId::new(1, 0), RecordId::new(2, 0), RecordId::new(2, 1)]
    );
    assert_eq!(file.get_all_trigger_record_ids()?.len(), 3);

    #[allow(deprecated)]
    let numbers = file.get_all_record_numbers()?;
    assert_eq!(numbers, BTreeSet::from([1, 2]));

    #[allow(deprecated)]
    let trigger_numbers = file.get_all_trigger_record_numbers()?;
    assert_eq!(trigger_numbers, numbers);
    Ok(())
}

#[test]
fn test_strict_record_names() -> TestResult {
    let mut c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0)])?;
    c.add_group("/TriggerRecordSummary")?;

    let config = IndexConfig {
        strict_record_names: true,
        ..IndexConfig::default()
    };
    let mut file = RawDataFile::with_config(c, config)?;

    match file.get_all_record_ids() {
        Err(IndexError::InvalidRecordName(name)) => assert_eq!(name, "TriggerRecordSummary"),
        other => panic!("expected InvalidRecordName, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_unknown_record_id() -> TestResult {
    let mut file = three_records()?;

    let err = file.get_source_ids(RecordId::new(99, 0)).err();
    match err {
        Some(e @ IndexError::RecordNotFound(_)) => {
            assert_eq!(e.to_string(), "Record ID not found: (99, 0)");
        }
        other => panic!("expected RecordNotFound, got {:?}", other),
    }
    match file.get_fragment_dataset_paths(RecordId::new(99, 0)) {
        Err(IndexError::RecordNotFound(rid)) => assert_eq!(rid, RecordId::new(99, 0)),
        other => panic!("expected RecordNotFound, got {:?}", other),
    }
    assert_eq!(file.cached_record_count(), 0);
    Ok(())
}

#[test]
fn test_unknown_record_id_is_not_cached() -> TestResult {
    init_logging();
    let mut file = RawDataFile::new(legacy_file(2, &[2])?)?;
    let rid = RecordId::new(2, 1);

    match file.add_record_level_info_to_caches_if_needed(rid) {
        Err(IndexError::RecordNotFound(missing)) => assert_eq!(missing, rid),
        other => panic!("expected RecordNotFound, got {:?}", other),
    }
    assert!(file.cached_entry(rid).is_none());
    assert_eq!(file.cached_record_count(), 0);

    file.add_record_level_info_to_caches_if_needed(RecordId::new(2, 0))?;
    assert_eq!(file.cached_record_count(), 1);
    Ok(())
}

#[test]
fn test_enumerate_mixed_padding_and_sequences() -> TestResult {
    let mut c = MemoryContainer::new("mixed.hdf5");
    c.add_group("/TriggerRecord00001")?;
    c.add_group("/TriggerRecord00002.0")?;
    c.add_group("/TriggerRecord00002.1")?;
    c.add_group("/Metadata")?;
    let mut file = RawDataFile::new(c)?;

    let ids: Vec<RecordId> = file.get_all_record_ids()?.into_iter().collect();
    assert_eq!(
        ids,
        vec![RecordId::new(1, 0), RecordId::new(2, 0), RecordId::new(2, 1)]
    );
    assert_eq!(
        file.get_record_header_dataset_path(RecordId::new(2, 1))?,
        "/TriggerRecord00002.1/TriggerRecordHeader"
    );
    Ok(())
}

#[test]
fn test_legacy_builder_dataset_does_not_shadow_header() -> TestResult {
    init_logging();
    let params = FileLayoutParams::default();
    let mut c = MemoryContainer::new("legacy.hdf5");
    write_layout(&mut c, &params, 2)?;
    c.add_dataset("/TriggerRecord000001/TriggerRecordHeader", vec![0xAA])?;
    c.add_dataset("/TriggerRecord000001/TRBuilder/Element00000", vec![0xBB])?;
    c.add_dataset("/TriggerRecord000001/TPC/Link00001", vec![1])?;
    let mut file = RawDataFile::new(c)?;
    let rid = RecordId::new(1, 0);

    assert_eq!(file.get_record_header_source_id(rid)?, HEADER);
    assert_eq!(
        file.get_fragment_source_ids(rid)?,
        BTreeSet::from([SourceId::new(Subsystem::DetectorReadout, 1)])
    );
    assert_eq!(
        file.get_record_header_dataset_path(rid)?,
        "/TriggerRecord000001/TriggerRecordHeader"
    );
    let header = file.get_dataset_raw_data("/TriggerRecord000001/TriggerRecordHeader")?;
    assert_eq!(header.as_ref(), &[0xAA]);
    Ok(())
}

#[test]
fn test_header_and_fragment_source_ids() -> TestResult {
    init_logging();
    let mut file = three_records()?;
    let rid = RecordId::new(1, 0);

    assert_eq!(file.get_source_ids(rid)?.len(), 4);
    assert_eq!(file.get_record_header_source_id(rid)?, HEADER);
    assert_eq!(
        file.get_fragment_source_ids(rid)?,
        BTreeSet::from([DR_100, DR_101, TRIGGER_2])
    );
    assert_eq!(
        file.get_source_ids_for_subsystem(rid, Subsystem::DetectorReadout)?,
        BTreeSet::from([DR_100, DR_101])
    );
    assert!(file
        .get_source_ids_for_subsystem(rid, Subsystem::HwSignalsInterface)?
        .is_empty());
    Ok(())
}

#[test]
fn test_type_and_subdetector_groupings() -> TestResult {
    let mut file = three_records()?;
    let rid = RecordId::new(2, 1);

    assert_eq!(
        file.get_source_ids_for_fragment_type(rid, FragmentType::WIB_ETH)?,
        BTreeSet::from([DR_100, DR_101])
    );
    assert_eq!(
        file.get_source_ids_for_fragment_type(rid, FragmentType::TRIGGER_CANDIDATE)?,
        BTreeSet::from([TRIGGER_2])
    );
    assert!(file
        .get_source_ids_for_fragment_type(rid, FragmentType::DAPHNE)?
        .is_empty());
    assert_eq!(
        file.get_source_ids_for_subdetector(rid, Subdetector::HD_TPC)?,
        BTreeSet::from([DR_100, DR_101])
    );
    assert_eq!(
        file.get_record_fragment_dataset_paths_for_fragment_type(rid, FragmentType::TRIGGER_CANDIDATE)?,
        vec!["/TriggerRecord000002.0001/RawData/Trigger_0x00000002_TC".to_string()]
    );
    assert_eq!(
        file.get_record_fragment_dataset_paths_for_subdetector(rid, Subdetector::HD_TPC)?
            .len(),
        2
    );
    Ok(())
}

#[test]
fn test_geo_id_queries() -> TestResult {
    let mut file = three_records()?;
    let rid = RecordId::new(1, 0);

    assert_eq!(
        file.get_all_geo_ids(),
        BTreeSet::from([65539, 131075, 262146])
    );
    assert_eq!(
        file.get_geo_ids(rid)?,
        BTreeSet::from([65539, 131075, 196611, 262146])
    );
    assert_eq!(
        file.get_geo_ids_for_subdetector(rid, Subdetector::HD_TPC)?,
        BTreeSet::from([65539, 131075, 196611])
    );
    assert_eq!(
        file.get_geo_ids_for_subdetector(rid, Subdetector::HD_PDS)?,
        BTreeSet::from([262146])
    );
    assert_eq!(
        file.get_geo_ids_for_source_id(rid, DR_101)?,
        BTreeSet::from([131075, 196611])
    );
    assert!(file.get_geo_ids_for_source_id(rid, TRIGGER_2)?.is_empty());
    assert_eq!(file.get_source_id_for_geo_id(rid, 196611)?, DR_101);
    assert!(file.get_source_id_for_geo_id(rid, 999)?.is_empty());

    // record-level additions stay out of the file-level map
    assert_eq!(file.file_level_geo_ids()[&DR_101], BTreeSet::from([131075]));
    Ok(())
}

#[test]
fn test_geo_round_trip_with_and_without_reverse_index() -> TestResult {
    for reverse_geo_index in [true, false] {
        let c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0)])?;
        let config = IndexConfig {
            reverse_geo_index,
            ..IndexConfig::default()
        };
        let mut file = RawDataFile::with_config(c, config)?;
        let rid = RecordId::new(1, 0);

        for source_id in file.get_source_ids(rid)? {
            for geo_id in file.get_geo_ids_for_source_id(rid, source_id)? {
                assert_eq!(file.get_source_id_for_geo_id(rid, geo_id)?, source_id);
            }
        }
    }
    Ok(())
}

#[test]
fn test_cache_population_is_idempotent() -> TestResult {
    let mut file = three_records()?;
    let rid = RecordId::new(2, 0);

    assert!(file.cached_entry(rid).is_none());
    let first = file.get_source_ids(rid)?;
    let snapshot = file.cached_entry(rid).cloned().ok_or("entry not cached")?;

    file.add_record_level_info_to_caches_if_needed(rid)?;
    file.get_geo_ids(rid)?;
    file.get_fragment_dataset_paths(rid)?;

    assert_eq!(file.get_source_ids(rid)?, first);
    assert_eq!(file.cached_entry(rid), Some(&snapshot));
    assert_eq!(file.cached_record_count(), 1);
    Ok(())
}

#[test]
fn test_cache_entries_partition_source_ids() -> TestResult {
    let mut file = three_records()?;

    for rid in file.get_all_record_ids()? {
        file.add_record_level_info_to_caches_if_needed(rid)?;
        let entry = file.cached_entry(rid).ok_or("entry not cached")?;

        let mut seen = BTreeSet::new();
        for (subsystem, members) in &entry.by_subsystem {
            for sid in members {
                assert_eq!(sid.subsystem, *subsystem);
                assert!(seen.insert(*sid), "{} listed twice", sid);
            }
        }
        assert_eq!(seen, entry.source_ids);

        let mut rebuilt = entry.fragment_source_ids.clone();
        assert!(rebuilt.insert(entry.record_header_source_id));
        assert_eq!(rebuilt, entry.source_ids);
    }
    Ok(())
}

#[test]
fn test_missing_record_group_leaves_cache_untouched() -> TestResult {
    let mut c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0)])?;
    c.add_dataset("/TriggerRecord000009.0000", vec![0])?;
    let mut file = RawDataFile::new(c)?;

    file.get_source_ids(RecordId::new(1, 0))?;
    let err = file.get_source_ids(RecordId::new(9, 0)).err();
    assert!(matches!(err, Some(IndexError::InvalidGroup(_))));

    assert_eq!(file.cached_record_count(), 1);
    assert!(file.cached_entry(RecordId::new(9, 0)).is_none());
    assert_eq!(file.get_fragment_source_ids(RecordId::new(1, 0))?.len(), 3);
    Ok(())
}

#[test]
fn test_indexed_dataset_paths() -> TestResult {
    let mut file = three_records()?;
    let rid = RecordId::new(2, 1);

    assert_eq!(
        file.get_record_header_dataset_path(rid)?,
        "/TriggerRecord000002.0001/TriggerRecordHeader"
    );
    assert_eq!(
        file.get_fragment_dataset_paths(rid)?,
        vec![
            "/TriggerRecord000002.0001/RawData/Detector_Readout_0x00000064_WIBEth".to_string(),
            "/TriggerRecord000002.0001/RawData/Detector_Readout_0x00000065_WIBEth".to_string(),
            "/TriggerRecord000002.0001/RawData/Trigger_0x00000002_TC".to_string(),
        ]
    );
    assert_eq!(file.get_record_header_dataset_paths()?.len(), 3);
    assert_eq!(file.get_trigger_record_header_dataset_paths()?.len(), 3);
    assert_eq!(file.get_all_fragment_dataset_paths()?.len(), 9);
    assert_eq!(file.get_dataset_paths(None)?.len(), 12);
    assert_eq!(
        file.get_record_fragment_dataset_paths_for_subsystem(rid, Subsystem::Trigger)?,
        vec!["/TriggerRecord000002.0001/RawData/Trigger_0x00000002_TC".to_string()]
    );
    assert_eq!(
        file.get_fragment_dataset_paths_for_subsystem(Subsystem::DetectorReadout)?
            .len(),
        6
    );
    let by_name = file.get_fragment_dataset_paths_for_subsystem_name("Trigger")?;
    assert_eq!(by_name, file.get_fragment_dataset_paths_for_subsystem(Subsystem::Trigger)?);
    assert!(matches!(
        file.get_fragment_dataset_paths_for_subsystem_name("Calorimeter"),
        Err(IndexError::UnknownSubsystem(_))
    ));
    assert!(matches!(
        file.get_dataset_paths(Some("/Nowhere")),
        Err(IndexError::InvalidGroup(_))
    ));
    Ok(())
}

#[test]
fn test_legacy_dataset_paths() -> TestResult {
    let mut file = RawDataFile::new(legacy_file(2, &[1, 3])?)?;
    let rid = RecordId::new(3, 0);

    assert_eq!(file.era(), SchemaEra::LegacyPaths);
    assert_eq!(
        file.get_record_header_dataset_paths()?,
        vec![
            "/TriggerRecord000001/TriggerRecordHeader".to_string(),
            "/TriggerRecord000003/TriggerRecordHeader".to_string(),
        ]
    );
    assert_eq!(
        file.get_record_header_dataset_path(rid)?,
        "/TriggerRecord000003/TriggerRecordHeader"
    );
    assert_eq!(
        file.get_fragment_dataset_paths(rid)?,
        vec![
            "/TriggerRecord000003/TPC/Link00005".to_string(),
            "/TriggerRecord000003/TPC/Link00007".to_string(),
            "/TriggerRecord000003/Trigger/Element00001".to_string(),
        ]
    );
    assert_eq!(
        file.get_record_fragment_dataset_paths_for_subsystem(rid, Subsystem::Trigger)?,
        vec!["/TriggerRecord000003/Trigger/Element00001".to_string()]
    );
    assert!(file
        .get_record_fragment_dataset_paths_for_subsystem(rid, Subsystem::HwSignalsInterface)?
        .is_empty());

    assert_eq!(file.get_record_header_source_id(rid)?, HEADER);
    assert_eq!(
        file.get_fragment_source_ids(rid)?,
        BTreeSet::from([
            SourceId::new(Subsystem::DetectorReadout, 5),
            SourceId::new(Subsystem::DetectorReadout, 7),
            SourceId::new(Subsystem::Trigger, 1),
        ])
    );
    assert!(file.get_geo_ids(rid)?.is_empty());
    Ok(())
}

#[test]
fn test_source_id_lookups_need_version_2() -> TestResult {
    let mut old = RawDataFile::new(legacy_file(1, &[1])?)?;
    let dr_5 = SourceId::new(Subsystem::DetectorReadout, 5);
    match old.get_frag_ptr_for_source_id(RecordId::new(1, 0), dr_5) {
        Err(IndexError::IncompatibleVersion { version, min, .. }) => {
            assert_eq!(version, 1);
            assert_eq!(min, 2);
        }
        other => panic!("expected IncompatibleVersion, got {:?}", other),
    }
    assert!(matches!(
        old.get_trh_ptr_for_record(RecordId::new(1, 0)),
        Err(IndexError::IncompatibleVersion { .. })
    ));

    // reading by path is not version gated
    let fragment = old.get_frag_ptr("/TriggerRecord000001/TPC/Link00005")?;
    assert_eq!(fragment.bytes().as_ref(), &[1, 1]);

    let c = indexed_file(RecordKind::TriggerRecord, 3, &[(1, 0)])?;
    let mut new = RawDataFile::new(c)?;
    let fragment = new.get_frag_ptr_for_source_id(RecordId::new(1, 0), DR_100)?;
    assert_eq!(fragment.bytes().as_ref(), &[1, 1]);
    Ok(())
}

#[test]
fn test_fragment_lookups() -> TestResult {
    let mut file = three_records()?;
    let rid = RecordId::new(2, 0);

    let by_id = file.get_frag_ptr_for_subsystem_id(rid, Subsystem::DetectorReadout, 0x65)?;
    assert_eq!(by_id.bytes().as_ref(), &[2, 2]);

    let by_geo = file.get_frag_ptr_for_geo_id(rid, 65539)?;
    assert_eq!(by_geo.bytes().as_ref(), &[1, 2]);

    assert!(matches!(
        file.get_frag_ptr_for_source_id(rid, SourceId::new(Subsystem::Trigger, 77)),
        Err(IndexError::SourceIdNotFound { .. })
    ));
    assert!(matches!(
        file.get_frag_ptr_for_geo_id(rid, 12345),
        Err(IndexError::SourceIdNotFound { .. })
    ));

    let raw = file.get_dataset_raw_data("/TriggerRecord000002.0000/RawData/Trigger_0x00000002_TC")?;
    assert_eq!(raw.as_ref(), &[3, 2]);
    assert!(matches!(
        file.get_dataset_raw_data("/TriggerRecord000002.0000/RawData"),
        Err(IndexError::InvalidDataset { .. })
    ));
    Ok(())
}

#[test]
fn test_assemble_trigger_record() -> TestResult {
    let mut file = three_records()?;

    let record = file.get_trigger_record(RecordId::new(2, 1))?;
    assert_eq!(record.header.bytes().as_ref(), &[0xAA, 2]);
    let first_bytes: Vec<u8> = record
        .fragments
        .iter()
        .map(|fragment| fragment.bytes()[0])
        .collect();
    assert_eq!(first_bytes, vec![1, 2, 3]);

    assert!(matches!(
        file.get_timeslice(RecordId::new(2, 1)),
        Err(IndexError::WrongRecordTypeRequested { .. })
    ));
    Ok(())
}

#[test]
fn test_assemble_legacy_trigger_record() -> TestResult {
    let mut file = RawDataFile::new(legacy_file(2, &[4])?)?;

    let record = file.get_trigger_record(RecordId::new(4, 0))?;
    assert_eq!(record.header.bytes().as_ref(), &[0xAA, 4]);
    assert_eq!(record.fragments.len(), 3);
    Ok(())
}

#[test]
fn test_timeslice_file() -> TestResult {
    let c = indexed_file(RecordKind::TimeSlice, 4, &[(10, 0), (11, 0)])?;
    let mut file = RawDataFile::new(c)?;
    let rid = RecordId::new(11, 0);

    assert_eq!(file.record_type(), "TimeSlice");
    assert_eq!(file.get_all_timeslice_ids()?.len(), 2);
    assert_eq!(file.get_all_timeslice_numbers()?, BTreeSet::from([10, 11]));
    assert_eq!(
        file.get_timeslice_header_dataset_path(rid)?,
        "/TimeSlice000011.0000/TimeSliceHeader"
    );
    assert_eq!(file.get_timeslice_header_dataset_paths()?.len(), 2);

    let slice = file.get_timeslice(rid)?;
    assert_eq!(slice.header.bytes().as_ref(), &[0xAA, 11]);
    assert_eq!(slice.fragments.len(), 3);

    match file.get_all_trigger_record_ids() {
        Err(IndexError::WrongRecordTypeRequested { requested, actual }) => {
            assert_eq!(requested, RecordKind::TriggerRecord);
            assert_eq!(actual, "TimeSlice");
        }
        other => panic!("expected WrongRecordTypeRequested, got {:?}", other),
    }
    assert!(file.get_trigger_record_header_dataset_path(rid).is_err());
    assert!(file.get_trh_ptr_for_record(rid).is_err());
    Ok(())
}

#[test]
fn test_summary() -> TestResult {
    let mut file = three_records()?;
    file.get_source_ids(RecordId::new(1, 0))?;

    let summary = file.summary()?;
    assert_eq!(summary.num_records, 3);
    assert_eq!(summary.num_cached_records, 1);
    assert_eq!(summary.num_file_level_geo_ids, 3);
    assert_eq!(summary.version, 4);

    let text = summary.to_string();
    assert!(text.contains("Records: 3"));
    assert!(text.contains("Record type: TriggerRecord"));
    assert!(text.contains("Recorded size: 4096 bytes"));
    Ok(())
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn enumeration_matches_written_records(
            records in prop::collection::btree_set((0u64..1_000_000, 0u32..10_000), 0..24)
        ) {
            let written: Vec<(u64, u32)> = records.iter().copied().collect();
            let c = indexed_file(RecordKind::TriggerRecord, 4, &written).unwrap();
            let mut file = RawDataFile::new(c).unwrap();

            let expected: BTreeSet<RecordId> = records.into_iter().map(RecordId::from).collect();
            prop_assert_eq!(file.get_all_record_ids().unwrap(), expected.clone());

            for rid in expected {
                prop_assert_eq!(file.get_fragment_source_ids(rid).unwrap().len(), 3);
            }
        }

        #[test]
        fn reverse_geo_lookup_agrees_with_forward_map(
            assignments in prop::collection::btree_map(0u32..50, prop::collection::btree_set(0u64..200, 0..8), 0..10),
            probe in 0u64..200,
        ) {
            let geo_json: Vec<serde_json::Value> = assignments
                .iter()
                .map(|(id, geo_ids)| serde_json::json!({"subsys": 1, "id": id, "geoids": geo_ids}))
                .collect();

            let mut answers = Vec::new();
            for reverse_geo_index in [true, false] {
                let mut c = indexed_file(RecordKind::TriggerRecord, 4, &[(1, 0)]).unwrap();
                c.set_attribute(
                    "/",
                    wire::SOURCE_ID_GEO_ID_MAP,
                    serde_json::Value::Array(geo_json.clone()).to_string(),
                )
                .unwrap();
                let config = IndexConfig { reverse_geo_index, ..IndexConfig::default() };
                let mut file = RawDataFile::with_config(c, config).unwrap();
                answers.push(file.get_source_id_for_geo_id(RecordId::new(1, 0), probe).unwrap());
            }
            prop_assert_eq!(answers[0], answers[1]);

            let expected = assignments
                .iter()
                .find(|(_, geo_ids)| geo_ids.contains(&probe))
                .map(|(id, _)| SourceId::new(Subsystem::DetectorReadout, *id))
                .unwrap_or_default();
            prop_assert_eq!(answers[0], expected);
        }
    }
}
